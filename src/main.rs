use clap::Parser;
use salesboard::args::{Args, Command};
use salesboard::{commands, Config, Error, ErrorType, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for running the program without a remote document store. When
    // SALESBOARD_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Remote.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.store_url(),
            init_args.token_url(),
            init_args.client_id(),
        )
        .await?
        .print(),

        Command::Login(login_args) => {
            let config = load_config(home).await?;
            commands::login(&config, mode, login_args.user(), login_args.password())
                .await?
                .print()
        }

        Command::Logout => commands::logout(&load_config(home).await?).await?.print(),

        Command::Categories => commands::categories(&load_config(home).await?, mode)
            .await?
            .print(),

        Command::Report(report_args) => {
            let config = load_config(home).await?;
            commands::report(&config, mode, report_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

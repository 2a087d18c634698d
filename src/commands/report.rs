use crate::api::Mode;
use crate::args::ReportArgs;
use crate::commands::{record_source, require_session, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{CategoryFilter, FilterState, RecordKind};
use crate::report::{self, Applied, Dashboard, HtmlRenderer, Report};
use crate::{utils, Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What `salesboard report` produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub path: PathBuf,
    pub report: Report,
}

/// Handles the `salesboard report` command.
///
/// Checks the session, discovers the categories, fetches and filters the records, draws the
/// charts and writes the page to `--output` or `$SALESBOARD_HOME/reports/report.html`.
///
/// # Errors
/// - `Request` if the start date is after the end date.
/// - `Session` if nobody is signed in.
/// - `Fetch` if the records cannot be read.
/// - `Render` if the page cannot be written.
pub async fn report(config: &Config, mode: Mode, args: ReportArgs) -> Result<Out<ReportOutput>> {
    let filter = FilterState::new(
        args.start(),
        args.end(),
        args.sales_category().clone(),
        args.expense_category().clone(),
    )
    .pub_result(ErrorType::Request)?;

    let session = require_session(config, mode).await?;
    let source = record_source(config, &session, mode)?;

    let options = report::discover(&source)
        .await
        .pub_result(ErrorType::Fetch)?;
    for kind in [RecordKind::Sale, RecordKind::Expense] {
        if let CategoryFilter::Only(category) = filter.category(kind) {
            if !options.contains(kind, category) {
                warn!("There is no {kind} category named '{category}', the report will be empty");
            }
        }
    }

    let dashboard = Dashboard::new(
        HtmlRenderer::new(format!("Sales report for {}", session.user())),
        config.currency_symbol(),
    );
    let report = match dashboard
        .apply(&source, &filter)
        .await
        .pub_result(ErrorType::Fetch)?
    {
        Applied::Rendered(report) => report,
        Applied::Superseded => {
            return Err(Error::new(
                ErrorType::Internal,
                anyhow!("The report was superseded by another request"),
            ))
        }
    };

    let page = dashboard
        .into_renderer()
        .page()
        .pub_result(ErrorType::Render)?;
    let path = args
        .output()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.report_path());
    utils::write(&path, page)
        .await
        .pub_result(ErrorType::Render)?;
    debug!("Wrote {}", path.display());

    let mut message = format!("Wrote the report to {}", path.display());
    for line in report.lines(config.currency_symbol()) {
        message.push('\n');
        message.push_str(&line);
    }
    Ok(Out::new(message, ReportOutput { path, report }))
}

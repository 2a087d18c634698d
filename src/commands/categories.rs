use crate::api::Mode;
use crate::commands::{record_source, require_session, Out};
use crate::error::{ErrorType, IntoResult};
use crate::report::{self, CategoryOptions};
use crate::{Config, Result};

/// Handles the `salesboard categories` command: lists the values accepted by
/// `--sales-category` and `--expense-category`.
///
/// # Errors
/// - `Session` if nobody is signed in.
/// - `Fetch` if the records cannot be read.
pub async fn categories(config: &Config, mode: Mode) -> Result<Out<CategoryOptions>> {
    let session = require_session(config, mode).await?;
    let source = record_source(config, &session, mode)?;
    let options = report::discover(&source)
        .await
        .pub_result(ErrorType::Fetch)?;
    let message = format!(
        "Sales categories: {}\nExpense categories: {}",
        options.sales.join(", "),
        options.expenses.join(", ")
    );
    Ok(Out::new(message, options))
}

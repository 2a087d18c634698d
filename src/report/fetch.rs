use crate::error::Res;
use crate::model::{FilterState, Record, RecordKind};
use crate::report::RecordSource;
use tracing::debug;

/// The records that passed the filter.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Filtered {
    pub sales: Vec<Record>,
    pub expenses: Vec<Record>,
    /// Documents that could not be decoded or belonged to another user.
    pub skipped: usize,
}

/// Fetches all sales and expenses of the user and keeps the ones that match `filter`.
pub(crate) async fn filter_and_fetch(source: &RecordSource, filter: &FilterState) -> Res<Filtered> {
    let (sales, expenses) = source.fetch_both().await?;
    let fetched = (sales.records.len(), expenses.records.len());
    let filtered = Filtered {
        sales: filter.apply(RecordKind::Sale, sales.records),
        expenses: filter.apply(RecordKind::Expense, expenses.records),
        skipped: sales.skipped + expenses.skipped,
    };
    debug!(
        "Kept {} of {} sales and {} of {} expenses",
        filtered.sales.len(),
        fetched.0,
        filtered.expenses.len(),
        fetched.1
    );
    Ok(filtered)
}

//! The reporting pipeline: category discovery, filter and fetch, aggregation and presentation.

mod aggregate;
mod dashboard;
mod discovery;
mod fetch;
mod render;
mod source;

pub use aggregate::{
    CategoryTotal, CategoryTotals, Report, ReportStatus, Summary, WeekdaySeries, WEEKDAY_LABELS,
};
pub use dashboard::{Applied, Dashboard};
pub use discovery::CategoryOptions;
pub(crate) use discovery::discover;
pub(crate) use fetch::filter_and_fetch;
pub use fetch::Filtered;
pub use render::{ChartData, ChartHandle, ChartKind, ChartRenderer, ChartSpec, Dataset, HtmlRenderer, Slot};
pub(crate) use source::RecordSource;

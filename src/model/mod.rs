//! Types that represent the core data model, such as `Record` and `FilterState`.
mod amount;
mod filter;
mod record;

pub use amount::{Amount, AmountError};
pub use filter::{CategoryFilter, FilterState, ALL};
pub(crate) use record::parse_date;
pub use record::{Document, Record, RecordKind, OTHER};

use crate::error::Res;
use crate::model::{Record, RecordKind};
use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The sentinel option that matches every category.
pub const ALL: &str = "all";

/// A category selection: either every category or exactly one.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => selected == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s.to_string())
        })
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Only(c) => f.write_str(c),
        }
    }
}

/// The date range and category selections applied to a report.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    sales_category: CategoryFilter,
    expense_category: CategoryFilter,
}

impl FilterState {
    /// Creates a filter. Both date bounds are inclusive.
    ///
    /// # Errors
    /// Returns an error when `start` is after `end`.
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        sales_category: CategoryFilter,
        expense_category: CategoryFilter,
    ) -> Res<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                bail!("The start date {s} is after the end date {e}");
            }
        }
        Ok(Self {
            start,
            end,
            sales_category,
            expense_category,
        })
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn category(&self, kind: RecordKind) -> &CategoryFilter {
        match kind {
            RecordKind::Sale => &self.sales_category,
            RecordKind::Expense => &self.expense_category,
        }
    }

    pub fn matches(&self, kind: RecordKind, record: &Record) -> bool {
        let date = record.date();
        self.start.map_or(true, |start| start <= date)
            && self.end.map_or(true, |end| date <= end)
            && self.category(kind).matches(record.category())
    }

    /// Keeps the records that pass this filter, preserving their order.
    pub fn apply(&self, kind: RecordKind, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|r| self.matches(kind, r))
            .collect()
    }
}

//! Turns filtered records into the series and figures shown on the dashboard.

use crate::model::{Amount, Record};
use crate::report::Filtered;
use serde::{Deserialize, Serialize};

/// Chart labels for the weekday series, starting on Sunday.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Seven totals indexed by day of the week, 0 = Sunday.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySeries([Amount; 7]);

impl WeekdaySeries {
    pub fn from_records(records: &[Record]) -> Self {
        let mut series = Self::default();
        for record in records {
            series.add(record.weekday_index(), record.amount());
        }
        series
    }

    /// Adds `amount` to the day at `index`. Indexes past Saturday are ignored.
    pub fn add(&mut self, index: usize, amount: Amount) {
        if let Some(total) = self.0.get_mut(index) {
            *total += amount;
        }
    }

    pub fn get(&self, index: usize) -> Amount {
        self.0.get(index).copied().unwrap_or_default()
    }

    pub fn values(&self) -> &[Amount; 7] {
        &self.0
    }

    pub fn total(&self) -> Amount {
        self.0.iter().sum()
    }
}

/// The summed expense amount of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// Expense totals per category, in the order each category first appears.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals(Vec<CategoryTotal>);

impl CategoryTotals {
    pub fn from_records(records: &[Record]) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(record.category(), record.amount());
        }
        totals
    }

    pub fn add(&mut self, category: &str, amount: Amount) {
        match self.0.iter_mut().find(|t| t.category == category) {
            Some(t) => t.total += amount,
            None => self.0.push(CategoryTotal {
                category: category.to_string(),
                total: amount,
            }),
        }
    }

    pub fn get(&self, category: &str) -> Option<Amount> {
        self.0
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.total)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_sales: Amount,
    pub total_expenses: Amount,
    pub net: Amount,
    pub average_sale: Amount,
    pub average_expense: Amount,
    pub sales_count: usize,
    pub expense_count: usize,
}

impl Summary {
    pub fn from_records(sales: &[Record], expenses: &[Record]) -> Self {
        let total_sales: Amount = sales.iter().map(Record::amount).sum();
        let total_expenses: Amount = expenses.iter().map(Record::amount).sum();
        Self {
            total_sales,
            total_expenses,
            net: total_sales - total_expenses,
            average_sale: total_sales.average(sales.len()),
            average_expense: total_expenses.average(expenses.len()),
            sales_count: sales.len(),
            expense_count: expenses.len(),
        }
    }

    /// The summary block, one line per figure.
    pub fn lines(&self, currency: &str) -> Vec<String> {
        vec![
            format!(
                "Sales: {} ({} records)",
                self.total_sales.with_symbol(currency),
                self.sales_count
            ),
            format!(
                "Expenses: {} ({} records)",
                self.total_expenses.with_symbol(currency),
                self.expense_count
            ),
            format!("Net profit: {}", self.net.with_symbol(currency)),
            format!("Average ticket: {}", self.average_sale.with_symbol(currency)),
            format!(
                "Average expense: {}",
                self.average_expense.with_symbol(currency)
            ),
        ]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Ready,
    /// Nothing matched the filter.
    Empty,
}

serde_plain::derive_display_from_serialize!(ReportStatus);

/// Everything the presentation needs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub weekday_sales: WeekdaySeries,
    pub weekday_expenses: WeekdaySeries,
    pub category_totals: CategoryTotals,
    pub summary: Summary,
    pub status: ReportStatus,
    pub skipped: usize,
}

impl Report {
    pub fn build(filtered: &Filtered) -> Self {
        let status = if filtered.sales.is_empty() && filtered.expenses.is_empty() {
            ReportStatus::Empty
        } else {
            ReportStatus::Ready
        };
        Self {
            weekday_sales: WeekdaySeries::from_records(&filtered.sales),
            weekday_expenses: WeekdaySeries::from_records(&filtered.expenses),
            category_totals: CategoryTotals::from_records(&filtered.expenses),
            summary: Summary::from_records(&filtered.sales, &filtered.expenses),
            status,
            skipped: filtered.skipped,
        }
    }

    /// Summary lines followed by a note about the status and any skipped documents.
    pub fn lines(&self, currency: &str) -> Vec<String> {
        let mut lines = self.summary.lines(currency);
        if self.status == ReportStatus::Empty {
            lines.push("No records match the current filters.".to_string());
        }
        if self.skipped > 0 {
            lines.push(format!(
                "{} documents could not be read and were left out.",
                self.skipped
            ));
        }
        lines
    }
}

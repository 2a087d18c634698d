use crate::error::Res;
use crate::model::{Record, RecordKind, ALL};
use crate::report::RecordSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The choices offered for each category filter. Each list starts with `all`, followed by the
/// distinct categories found in that collection, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOptions {
    pub sales: Vec<String>,
    pub expenses: Vec<String>,
}

impl CategoryOptions {
    pub fn from_records(sales: &[Record], expenses: &[Record]) -> Self {
        Self {
            sales: options(RecordKind::Sale, sales),
            expenses: options(RecordKind::Expense, expenses),
        }
    }

    pub fn get(&self, kind: RecordKind) -> &[String] {
        match kind {
            RecordKind::Sale => &self.sales,
            RecordKind::Expense => &self.expenses,
        }
    }

    /// True if `category` is one of the options for `kind`, including `all`.
    pub fn contains(&self, kind: RecordKind, category: &str) -> bool {
        self.get(kind).iter().any(|c| c == category)
    }
}

/// A stored category spelled like the `all` sentinel cannot be selected on its own, so it is
/// left out of the options.
fn options(kind: RecordKind, records: &[Record]) -> Vec<String> {
    let mut distinct: BTreeSet<&str> = records.iter().map(Record::category).collect();
    if distinct.remove(ALL) {
        warn!(
            "Some {kind} records use the reserved category name '{ALL}', they are only shown \
            when every category is selected"
        );
    }
    std::iter::once(ALL)
        .chain(distinct)
        .map(str::to_string)
        .collect()
}

/// Fetches every sale and expense of the user and lists the categories found in each.
pub(crate) async fn discover(source: &RecordSource) -> Res<CategoryOptions> {
    let (sales, expenses) = source.fetch_both().await?;
    let options = CategoryOptions::from_records(&sales.records, &expenses.records);
    debug!(
        "Discovered {} sales and {} expense categories for {}",
        options.sales.len() - 1,
        options.expenses.len() - 1,
        source.user()
    );
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TEST_USER;
    use crate::model::OTHER;
    use crate::test::{record, seeded_source, ymd};

    #[test]
    fn test_options_are_sorted_and_distinct() {
        let d = ymd(2024, 1, 7);
        let sales = vec![
            record("1", d, Some("Pastry")),
            record("1", d, Some("Coffee")),
            record("1", d, Some("Pastry")),
            record("1", d, None),
        ];
        let options = CategoryOptions::from_records(&sales, &[]);
        assert_eq!(options.sales, vec!["all", "Coffee", OTHER, "Pastry"]);
        assert_eq!(options.expenses, vec!["all"]);
    }

    #[test]
    fn test_category_named_all_is_not_listed_twice() {
        let d = ymd(2024, 1, 7);
        let expenses = vec![record("1", d, Some(ALL)), record("1", d, Some("Rent"))];
        let options = CategoryOptions::from_records(&[], &expenses);
        assert_eq!(options.expenses, vec![ALL, "Rent"]);
    }

    #[tokio::test]
    async fn test_discover_seed_data() {
        let options = discover(&seeded_source(TEST_USER)).await.unwrap();
        assert_eq!(
            options.sales,
            vec!["all", "Catering", "Coffee", "Other", "Pastry"]
        );
        assert_eq!(
            options.expenses,
            vec!["all", "Other", "Rent", "Supplies", "Utilities"]
        );
        assert!(options.contains(RecordKind::Expense, "Rent"));
        assert!(!options.contains(RecordKind::Sale, "Rent"));
    }

    #[tokio::test]
    async fn test_discover_unknown_user_has_only_all() {
        let options = discover(&seeded_source("nobody")).await.unwrap();
        assert_eq!(options.sales, vec![ALL]);
        assert_eq!(options.expenses, vec![ALL]);
    }
}

use crate::config::{Collections, FieldNames};
use crate::error::Res;
use crate::model::Amount;
use anyhow::{bail, Context};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The category given to records that do not have one.
pub const OTHER: &str = "Other";

/// Which collection a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sale,
    Expense,
}

serde_plain::derive_display_from_serialize!(RecordKind);
serde_plain::derive_fromstr_from_deserialize!(RecordKind);

impl RecordKind {
    /// The name of the collection holding this kind of record.
    pub fn collection(self, collections: &Collections) -> &str {
        match self {
            RecordKind::Sale => &collections.sales,
            RecordKind::Expense => &collections.expenses,
        }
    }
}

/// A document as returned by the store: an identifier and a map of plain JSON field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub(crate) id: String,
    pub(crate) fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A single sale or expense owned by a user. Records are read-only snapshots of what the store
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    amount: Amount,
    date: NaiveDate,
    category: String,
    owner: String,
}

impl Record {
    /// Creates a record. A missing or blank `category` becomes `"Other"`.
    pub fn new(
        amount: impl Into<Amount>,
        date: NaiveDate,
        category: Option<&str>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            date,
            category: normalize_category(category),
            owner: owner.into(),
        }
    }

    /// Decodes a record from a store document using the configured field names.
    pub fn from_document(doc: &Document, fields: &FieldNames) -> Res<Self> {
        let amount = doc
            .get(&fields.amount)
            .with_context(|| format!("Document '{}' has no '{}' field", doc.id, fields.amount))?;
        let amount = Amount::from_json(amount)
            .with_context(|| format!("Document '{}' has a bad '{}'", doc.id, fields.amount))?;

        let date = doc
            .get(&fields.date)
            .with_context(|| format!("Document '{}' has no '{}' field", doc.id, fields.date))?;
        let date = parse_date(date)
            .with_context(|| format!("Document '{}' has a bad '{}'", doc.id, fields.date))?;

        let category = doc.get(&fields.category).and_then(Value::as_str);

        let owner = doc
            .get(&fields.owner)
            .and_then(Value::as_str)
            .with_context(|| format!("Document '{}' has no '{}' field", doc.id, fields.owner))?;

        Ok(Self::new(amount, date, category, owner))
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Day of the week as an index, 0 = Sunday .. 6 = Saturday.
    pub fn weekday_index(&self) -> usize {
        self.date.weekday().num_days_from_sunday() as usize
    }
}

fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => OTHER.to_string(),
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date in the timestamp's own offset is used) and
/// `MM/DD/YYYY`.
pub(crate) fn parse_date(value: &Value) -> Res<NaiveDate> {
    let s = match value {
        Value::String(s) => s.trim(),
        other => bail!("Expected a date string but found {other}"),
    };
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Ok(d);
    }
    bail!("Unable to read '{s}' as a date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(pairs: Value) -> Document {
        let fields = pairs
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Document::new("doc-1", fields)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_document() {
        let d = doc(json!({
            "amount": 100,
            "date": "2024-01-07",
            "category": "Drinks",
            "uid": "alice"
        }));
        let r = Record::from_document(&d, &FieldNames::default()).unwrap();
        assert_eq!(r.amount().to_string(), "100.00");
        assert_eq!(r.date(), ymd(2024, 1, 7));
        assert_eq!(r.category(), "Drinks");
        assert_eq!(r.owner(), "alice");
        assert_eq!(r.weekday_index(), 0);
    }

    #[test]
    fn test_missing_category_is_other() {
        let d = doc(json!({"amount": "5", "date": "2024-01-08", "uid": "alice"}));
        let r = Record::from_document(&d, &FieldNames::default()).unwrap();
        assert_eq!(r.category(), OTHER);

        let d = doc(json!({"amount": "5", "date": "2024-01-08", "category": null, "uid": "a"}));
        let r = Record::from_document(&d, &FieldNames::default()).unwrap();
        assert_eq!(r.category(), OTHER);

        let r = Record::new(Amount::ZERO, ymd(2024, 1, 8), Some("  "), "a");
        assert_eq!(r.category(), OTHER);
    }

    #[test]
    fn test_custom_field_names() {
        let fields = FieldNames {
            amount: "valor".to_string(),
            date: "data".to_string(),
            category: "categoria".to_string(),
            owner: "uid".to_string(),
        };
        let d = doc(json!({"valor": 12.5, "data": "2024-03-01", "categoria": "Pix", "uid": "b"}));
        let r = Record::from_document(&d, &fields).unwrap();
        assert_eq!(r.category(), "Pix");
        assert_eq!(r.amount().to_string(), "12.50");
    }

    #[test]
    fn test_missing_amount_is_error() {
        let d = doc(json!({"date": "2024-01-08", "uid": "alice"}));
        let message = format!(
            "{:#}",
            Record::from_document(&d, &FieldNames::default()).unwrap_err()
        );
        assert!(message.contains("doc-1"));
        assert!(message.contains("amount"));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(&json!("2024-01-07")).unwrap(), ymd(2024, 1, 7));
        assert_eq!(
            parse_date(&json!("2024-01-07T23:30:00-03:00")).unwrap(),
            ymd(2024, 1, 7)
        );
        assert_eq!(
            parse_date(&json!("2024-01-07T10:00:00.250Z")).unwrap(),
            ymd(2024, 1, 7)
        );
        assert_eq!(parse_date(&json!("10/20/2025")).unwrap(), ymd(2025, 10, 20));
        assert!(parse_date(&json!("yesterday")).is_err());
        assert!(parse_date(&json!(20240107)).is_err());
    }

    #[test]
    fn test_record_kind_collection() {
        let c = Collections::default();
        assert_eq!(RecordKind::Sale.collection(&c), "sales");
        assert_eq!(RecordKind::Expense.collection(&c), "expenses");
        assert_eq!(RecordKind::Expense.to_string(), "expense");
    }
}

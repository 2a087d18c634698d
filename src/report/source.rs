use crate::api::Store;
use crate::error::Res;
use crate::model::{Record, RecordKind};
use crate::{Collections, FieldNames};
use anyhow::Context;
use tracing::{debug, warn};

/// Fetches and decodes the records of one user from a `Store`.
pub(crate) struct RecordSource {
    store: Box<dyn Store>,
    collections: Collections,
    fields: FieldNames,
    user: String,
}

/// The records decoded from one or more fetches, plus how many documents were dropped.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Fetched {
    pub(crate) records: Vec<Record>,
    pub(crate) skipped: usize,
}

impl RecordSource {
    pub(crate) fn new(
        store: Box<dyn Store>,
        collections: Collections,
        fields: FieldNames,
        user: impl Into<String>,
    ) -> Self {
        Self {
            store,
            collections,
            fields,
            user: user.into(),
        }
    }

    pub(crate) fn user(&self) -> &str {
        &self.user
    }

    /// Fetches every record of `kind` owned by the user. Documents that cannot be decoded, or that
    /// belong to someone else, are skipped and counted.
    pub(crate) async fn fetch(&self, kind: RecordKind) -> Res<Fetched> {
        let collection = kind.collection(&self.collections);
        let documents = self
            .store
            .query(collection, &self.fields.owner, &self.user)
            .await
            .with_context(|| format!("Unable to fetch the {collection} collection"))?;
        debug!("Fetched {} documents from {collection}", documents.len());

        let mut fetched = Fetched::default();
        for doc in &documents {
            match Record::from_document(doc, &self.fields) {
                Ok(record) if record.owner() == self.user => fetched.records.push(record),
                Ok(record) => {
                    warn!(
                        "Skipping document '{}' in {collection}: it belongs to '{}'",
                        doc.id(),
                        record.owner()
                    );
                    fetched.skipped += 1;
                }
                Err(e) => {
                    warn!("Skipping document in {collection}: {e:#}");
                    fetched.skipped += 1;
                }
            }
        }
        Ok(fetched)
    }

    /// Fetches sales and expenses concurrently.
    pub(crate) async fn fetch_both(&self) -> Res<(Fetched, Fetched)> {
        tokio::try_join!(self.fetch(RecordKind::Sale), self.fetch(RecordKind::Expense))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestStore, TEST_USER};
    use crate::model::{Document, OTHER};
    use crate::test::seeded_source;
    use serde_json::{json, Value};
    use std::collections::{BTreeMap, HashMap};

    fn doc(id: &str, fields: Value) -> Document {
        let fields: BTreeMap<String, Value> = serde_json::from_value(fields).unwrap();
        Document::new(id, fields)
    }

    #[tokio::test]
    async fn test_fetch_seed_data() {
        let source = seeded_source(TEST_USER);
        let (sales, expenses) = source.fetch_both().await.unwrap();
        assert_eq!(sales.records.len(), 7);
        assert_eq!(expenses.records.len(), 6);
        assert_eq!(sales.skipped, 0);
        assert!(sales.records.iter().all(|r| r.owner() == TEST_USER));
        assert!(sales.records.iter().any(|r| r.category() == OTHER));
    }

    #[tokio::test]
    async fn test_bad_documents_are_skipped() {
        let mut collections = HashMap::new();
        collections.insert(
            "sales".to_string(),
            vec![
                doc("ok", json!({"uid": "u", "amount": 5, "date": "2024-01-07"})),
                doc("no-amount", json!({"uid": "u", "date": "2024-01-07"})),
                doc("bad-date", json!({"uid": "u", "amount": 5, "date": "someday"})),
            ],
        );
        collections.insert("expenses".to_string(), Vec::new());
        let source = RecordSource::new(
            Box::new(TestStore::new(collections)),
            Collections::default(),
            FieldNames::default(),
            "u",
        );
        let (sales, expenses) = source.fetch_both().await.unwrap();
        assert_eq!(sales.records.len(), 1);
        assert_eq!(sales.skipped, 2);
        assert!(expenses.records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_collection_fails_the_join() {
        let mut collections = HashMap::new();
        collections.insert("sales".to_string(), Vec::new());
        let source = RecordSource::new(
            Box::new(TestStore::new(collections)),
            Collections::default(),
            FieldNames::default(),
            "u",
        );
        let e = source.fetch_both().await.unwrap_err();
        assert!(format!("{e:#}").contains("expenses"));
    }
}

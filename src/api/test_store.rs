//! Implements the `Store` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a remote document store.

use crate::api::Store;
use crate::error::Res;
use crate::model::Document;
use anyhow::Context;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use tracing::error;

/// The user that owns most of the seed data.
pub(crate) const TEST_USER: &str = "demo@example.com";

/// An implementation of the `Store` trait that holds documents in memory, keyed by collection
/// name. By default it is seeded with some sales and expenses.
#[derive(Debug, Clone)]
pub(crate) struct TestStore {
    collections: HashMap<String, Vec<Document>>,
}

impl TestStore {
    pub(crate) fn new(collections: HashMap<String, Vec<Document>>) -> Self {
        Self { collections }
    }

    /// Loads documents from CSV with the header `collection,id,uid,amount,date,category`. An empty
    /// cell leaves that field out of the document.
    pub(crate) fn from_csv(csv_data: &str) -> Res<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(Cursor::new(csv_data.as_bytes()));
        let headers = rdr.headers().context("Seed data has no header row")?.clone();

        let mut collections: HashMap<String, Vec<Document>> = HashMap::new();
        for result in rdr.records() {
            let record = result.context("Unable to read a seed data row")?;
            let mut collection = String::new();
            let mut id = String::new();
            let mut fields = BTreeMap::new();
            for (header, value) in headers.iter().zip(record.iter()) {
                match header {
                    "collection" => collection = value.to_string(),
                    "id" => id = value.to_string(),
                    _ if value.is_empty() => {}
                    field => {
                        let _ = fields.insert(field.to_string(), Value::from(value));
                    }
                }
            }
            collections
                .entry(collection)
                .or_default()
                .push(Document::new(id, fields));
        }
        Ok(Self::new(collections))
    }
}

#[async_trait::async_trait]
impl Store for TestStore {
    async fn query(
        &self,
        collection: &str,
        owner_field: &str,
        owner: &str,
    ) -> Res<Vec<Document>> {
        let documents = self
            .collections
            .get(collection)
            .with_context(|| format!("Collection '{collection}' not found"))?;
        Ok(documents
            .iter()
            .filter(|d| d.get(owner_field).and_then(Value::as_str) == Some(owner))
            .cloned()
            .collect())
    }
}

impl Default for TestStore {
    /// Loads seed data from this module.
    fn default() -> Self {
        match Self::from_csv(SEED_DATA) {
            Ok(store) => store,
            Err(e) => {
                error!("The built-in seed data is invalid: {e:#}");
                Self::new(HashMap::new())
            }
        }
    }
}

/// Seed data. 2024-01-07 is a Sunday.
const SEED_DATA: &str = r##"collection,id,uid,amount,date,category
sales,s01,demo@example.com,100,2024-01-07,Coffee
sales,s02,demo@example.com,"$1,250.50",2024-01-08,Catering
sales,s03,demo@example.com,42.75,2024-01-09,Coffee
sales,s04,demo@example.com,18,2024-01-10,
sales,s05,demo@example.com,63.20,2024-01-12,Pastry
sales,s06,demo@example.com,87.10,2024-01-13,Coffee
sales,s07,demo@example.com,55,2024-01-14,Pastry
sales,s08,someone@example.com,999,2024-01-08,Coffee
expenses,e01,demo@example.com,40,2024-01-07,Supplies
expenses,e02,demo@example.com,320.00,2024-01-08,Rent
expenses,e03,demo@example.com,12.35,2024-01-09,Supplies
expenses,e04,demo@example.com,75.60,2024-01-11,Utilities
expenses,e05,demo@example.com,9.90,2024-01-12,
expenses,e06,demo@example.com,28.45,2024-01-13,Supplies
expenses,e07,someone@example.com,500,2024-01-08,Rent
"##;

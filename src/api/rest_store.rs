//! Implements the `Store` trait against a Firestore-style REST API.

use crate::api::{Session, Store};
use crate::error::Res;
use crate::model::Document;
use crate::Config;
use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs structured queries with `POST {store_url}:runQuery`, authenticated with the session's
/// bearer token.
pub(super) struct RestStore {
    client: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl RestStore {
    pub(super) fn new(config: &Config, session: &Session) -> Res<Self> {
        let base = config.store_url().as_str().trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}:runQuery"))
            .with_context(|| format!("Unable to build the query URL from '{base}'"))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            access_token: session.access_token().to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Store for RestStore {
    async fn query(
        &self,
        collection: &str,
        owner_field: &str,
        owner: &str,
    ) -> Res<Vec<Document>> {
        trace!("query {collection} where {owner_field} == {owner}");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.access_token)
            .json(&owner_query(collection, owner_field, owner))
            .send()
            .await
            .with_context(|| format!("Failed to send the query for '{collection}'"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("The query for '{collection}' failed with status {status}: {body}");
        }

        let rows: Vec<QueryRow> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse the query response for '{collection}'"))?;

        let documents: Vec<Document> = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(RawDocument::decode)
            .collect();
        debug!("Fetched {} documents from '{collection}'", documents.len());
        Ok(documents)
    }
}

/// Builds the structured query `from collection where owner_field == owner`.
fn owner_query(collection: &str, owner_field: &str, owner: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": owner_field },
                    "op": "EQUAL",
                    "value": { "stringValue": owner }
                }
            }
        }
    })
}

/// One element of the `runQuery` response array. Elements without a document only carry
/// progress information.
#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    /// Full resource name, e.g. `projects/p/databases/(default)/documents/sales/abc123`
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl RawDocument {
    fn decode(self) -> Document {
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), decode_value(v)))
            .collect();
        Document::new(id, fields)
    }
}

/// Converts a typed value such as `{"integerValue": "100"}` into plain JSON.
fn decode_value(typed: &Value) -> Value {
    let Some(obj) = typed.as_object() else {
        return Value::Null;
    };
    if let Some(v) = obj.get("stringValue") {
        return v.clone();
    }
    if let Some(v) = obj.get("integerValue") {
        // 64-bit integers are sent as strings
        return match v {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        };
    }
    if let Some(v) = obj.get("doubleValue") {
        return v.clone();
    }
    if let Some(v) = obj.get("timestampValue") {
        return v.clone();
    }
    if let Some(v) = obj.get("booleanValue") {
        return v.clone();
    }
    if let Some(v) = obj.get("mapValue") {
        let fields: Map<String, Value> = v
            .get("fields")
            .and_then(Value::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect())
            .unwrap_or_default();
        return Value::Object(fields);
    }
    if let Some(v) = obj.get("arrayValue") {
        let values = v
            .get("values")
            .and_then(Value::as_array)
            .map(|a| a.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    Value::Null
}

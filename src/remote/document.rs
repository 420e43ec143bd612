//! Document model and the query transport contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Database and collection holding the config documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionScope {
    pub database_id: String,
    pub collection_id: String,
}

impl CollectionScope {
    pub fn new(database_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            collection_id: collection_id.into(),
        }
    }

    /// Realtime channel carrying document events for this collection.
    pub fn channel(&self) -> String {
        format!(
            "databases.{}.collections.{}.documents",
            self.database_id, self.collection_id
        )
    }
}

impl Default for CollectionScope {
    fn default() -> Self {
        Self::new("remote_config", "release")
    }
}

/// Names of the document fields carrying each config entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMapping {
    pub key: String,
    pub value: String,
}

impl Default for AttributeMapping {
    fn default() -> Self {
        Self {
            key: "key".to_string(),
            value: "value".to_string(),
        }
    }
}

/// One record from the remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Record identifier, used as the pagination cursor.
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Field coerced to text; `None` when absent or null.
    pub fn text(&self, attribute: &str) -> Option<String> {
        self.fields.get(attribute).and_then(value_to_text)
    }
}

/// Canonical text form of a schema-less field value.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Paginated listing over a document collection.
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// List up to `limit` documents, starting after the document with id `after`.
    ///
    /// An empty collection is `Ok(vec![])`; failures are `Err`.
    async fn list(
        &self,
        scope: &CollectionScope,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Vec<Document>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_coercion() {
        assert_eq!(value_to_text(&json!("text")), Some("text".to_string()));
        assert_eq!(value_to_text(&json!(42)), Some("42".to_string()));
        assert_eq!(value_to_text(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(value_to_text(&json!(true)), Some("true".to_string()));
        assert_eq!(value_to_text(&json!(["a", 1])), Some("[\"a\",1]".to_string()));
        assert_eq!(value_to_text(&Value::Null), None);
    }

    #[test]
    fn test_default_scope_and_channel() {
        let scope = CollectionScope::default();
        assert_eq!(scope.database_id, "remote_config");
        assert_eq!(scope.collection_id, "release");
        assert_eq!(scope.channel(), "databases.remote_config.collections.release.documents");
    }
}

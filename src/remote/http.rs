//! REST document transport.
//!
//! # Wire Format
//! ```text
//! GET {endpoint}/databases/{db}/collections/{col}/documents
//!     ?queries[]={"method":"limit","values":[25]}
//!     &queries[]={"method":"cursorAfter","values":["<last $id>"]}
//! X-Appwrite-Project: <project>
//! X-Appwrite-Key: <key>            (optional)
//!
//! 200 → { "total": 60, "documents": [ { "$id": "...", "key": "...", "value": ... } ] }
//! ```

use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::{RemoteConfigError, Result};
use crate::remote::document::{CollectionScope, Document, DocumentTransport};

const ID_FIELD: &str = "$id";

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    documents: Vec<Map<String, Value>>,
}

/// `DocumentTransport` over the database REST API.
#[derive(Clone)]
pub struct HttpDocumentTransport {
    client: reqwest::Client,
    endpoint: Url,
    project_id: String,
    api_key: Option<String>,
}

impl HttpDocumentTransport {
    pub fn new(
        endpoint: &str,
        project_id: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint: Url = endpoint.parse().map_err(|e| {
            RemoteConfigError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            project_id: project_id.into(),
            api_key,
        })
    }

    fn documents_url(&self, scope: &CollectionScope, limit: usize, after: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteConfigError::Configuration(format!("Endpoint '{}' cannot be a base URL", self.endpoint)))?
            .pop_if_empty()
            .extend([
                "databases",
                scope.database_id.as_str(),
                "collections",
                scope.collection_id.as_str(),
                "documents",
            ]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("queries[]", &json!({ "method": "limit", "values": [limit] }).to_string());
            if let Some(cursor) = after {
                query.append_pair(
                    "queries[]",
                    &json!({ "method": "cursorAfter", "values": [cursor] }).to_string(),
                );
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl DocumentTransport for HttpDocumentTransport {
    async fn list(
        &self,
        scope: &CollectionScope,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Vec<Document>> {
        let url = self.documents_url(scope, limit, after)?;
        let mut request = self
            .client
            .get(url)
            .header("X-Appwrite-Project", &self.project_id);
        if let Some(key) = &self.api_key {
            request = request.header("X-Appwrite-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteConfigError::Transport(format!(
                "Document list returned status {}: {}",
                status, body
            )));
        }

        let list: DocumentList = response
            .json()
            .await
            .map_err(|e| RemoteConfigError::Transport(format!("Invalid document list: {}", e)))?;
        tracing::trace!(total = list.total, page = list.documents.len(), "Document page received");

        list.documents
            .into_iter()
            .map(|fields| {
                let id = fields
                    .get(ID_FIELD)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| RemoteConfigError::Transport("Document without $id".to_string()))?;
                Ok(Document::new(id, fields))
            })
            .collect()
    }
}

impl std::fmt::Debug for HttpDocumentTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpDocumentTransport {
        HttpDocumentTransport::new("https://cloud.example.com/v1", "proj", None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_documents_url() {
        let url = transport()
            .documents_url(&CollectionScope::default(), 25, None)
            .unwrap();
        assert_eq!(url.path(), "/v1/databases/remote_config/collections/release/documents");

        let queries: Vec<String> = url.query_pairs().map(|(_, v)| v.into_owned()).collect();
        assert_eq!(queries, vec![r#"{"method":"limit","values":[25]}"#.to_string()]);
    }

    #[test]
    fn test_documents_url_with_cursor() {
        let url = transport()
            .documents_url(&CollectionScope::new("db", "col"), 25, Some("doc_24"))
            .unwrap();
        let queries: Vec<String> = url.query_pairs().map(|(_, v)| v.into_owned()).collect();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1], r#"{"method":"cursorAfter","values":["doc_24"]}"#);
    }

    #[test]
    fn test_invalid_endpoint_is_configuration_error() {
        let err = HttpDocumentTransport::new("not a url", "p", None, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }
}

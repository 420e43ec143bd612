//! Paginated bulk fetch reduced into a flat snapshot.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{RemoteConfigError, Result};
use crate::observability::metrics;
use crate::remote::document::{AttributeMapping, CollectionScope, Document, DocumentTransport};
use crate::store::Snapshot;

/// Documents requested per page.
pub const PAGE_SIZE: usize = 25;

/// Pulls the whole collection page by page and flattens it to key → value.
#[derive(Clone)]
pub struct RemoteFetchReducer {
    transport: Arc<dyn DocumentTransport>,
    scope: CollectionScope,
    attributes: AttributeMapping,
}

impl RemoteFetchReducer {
    pub fn new(
        transport: Arc<dyn DocumentTransport>,
        scope: CollectionScope,
        attributes: AttributeMapping,
    ) -> Self {
        Self {
            transport,
            scope,
            attributes,
        }
    }

    /// Fetch every document. Stops on an empty page or a short page; a full
    /// final page costs one extra empty request.
    pub async fn fetch_all(&self) -> Result<Snapshot> {
        let started = Instant::now();
        let mut snapshot = Snapshot::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .transport
                .list(&self.scope, PAGE_SIZE, cursor.as_deref())
                .await?;
            pages += 1;
            metrics::record_page_fetched();

            let Some(last) = page.last() else {
                break;
            };
            let next_cursor = last.id.clone();

            for document in &page {
                let (key, value) = self.reduce(document)?;
                snapshot.insert(key, value);
            }

            if page.len() < PAGE_SIZE {
                break;
            }
            cursor = Some(next_cursor);
        }

        tracing::debug!(
            pages,
            keys = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Remote collection fetched"
        );
        Ok(snapshot)
    }

    fn reduce(&self, document: &Document) -> Result<(String, String)> {
        let key = document.text(&self.attributes.key).ok_or_else(|| RemoteConfigError::Schema {
            document: document.id.clone(),
            attribute: self.attributes.key.clone(),
        })?;
        let value = document.text(&self.attributes.value).ok_or_else(|| RemoteConfigError::Schema {
            document: document.id.clone(),
            attribute: self.attributes.value.clone(),
        })?;
        Ok((key, value))
    }
}

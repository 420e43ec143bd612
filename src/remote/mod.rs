//! Remote collection access.
//!
//! # Data Flow
//! ```text
//! fetch.rs (page loop, cursor = last $id)
//!     → DocumentTransport::list (http.rs in production)
//!     → document.rs (attribute → text coercion)
//!     → Snapshot
//! ```

pub mod document;
pub mod fetch;
pub mod http;

pub use document::{AttributeMapping, CollectionScope, Document, DocumentTransport};
pub use fetch::{RemoteFetchReducer, PAGE_SIZE};
pub use http::HttpDocumentTransport;

//! Ports for the document database.
//!
//! The database is reached through three seams: a source that acquires an
//! authenticated container handle, the container that starts queries, and the
//! pager that walks the result pages of one query.

use crate::domain::query::DocumentQuery;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No usable credential could be obtained.
    #[error("credential unavailable: {0}")]
    Credential(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The service answered with a body or header that could not be read.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// `next_page` was called after the last page.
    #[error("query pager is exhausted")]
    Exhausted,
}

/// One batch of raw documents, in service order.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<JsonValue>,
}

/// Lazily pulled, finite sequence of result pages. Not restartable.
#[async_trait]
pub trait QueryPager: Send {
    /// Whether another page may be requested.
    fn has_more(&self) -> bool;

    /// Fetches the next page. Each call depends on the previous response, so
    /// pages must be requested one at a time.
    async fn next_page(&mut self) -> Result<Page, StoreError>;
}

/// Handle to a single collection.
pub trait DocumentContainer: Send + Sync {
    fn query(&self, query: &DocumentQuery, partition_key: &str) -> Box<dyn QueryPager>;
}

/// Constructs authenticated container handles.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Acquires a container handle. May perform a credential round trip.
    async fn open(&self) -> Result<Box<dyn DocumentContainer>, StoreError>;
}

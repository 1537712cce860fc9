//! The certification query service.
//!
//! This module sits between the HTTP handlers and the document database.
//! For each request it:
//! 1.  Validates the untrusted path/query input.
//! 2.  Builds a parameterized query for the validated input.
//! 3.  Opens an authenticated container handle.
//! 4.  Drains the query's pages into typed records.
//!
//! Nothing is shared between requests besides the (stateless) source.

use crate::domain::collect::collect_records;
use crate::domain::error::{CertError, CertResult};
use crate::domain::model::Certification;
use crate::domain::query::{
    listing_query, lookup_query, parse_limit, validate_lookup, DocumentQuery, ResultLimit,
};
use crate::storage::documents::{DocumentContainer, DocumentSource};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CertificationService {
    source: Arc<dyn DocumentSource>,
    partition_key: String,
}

impl CertificationService {
    pub fn new(source: Arc<dyn DocumentSource>, partition_key: impl Into<String>) -> Self {
        Self {
            source,
            partition_key: partition_key.into(),
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Records whose `key` field equals `value`.
    pub async fn lookup(&self, key: &str, value: &str) -> CertResult<Vec<Certification>> {
        let request = validate_lookup(key, value)?;
        let query = lookup_query(&request);
        self.run(&query).await
    }

    /// The certification listing, optionally capped by `top`.
    pub async fn list(&self, top: Option<&str>) -> CertResult<Vec<Certification>> {
        let limit = parse_limit(top)?;
        let query = listing_query(limit);
        self.run(&query).await
    }

    /// Round trip to the container: opens a handle and fetches the first
    /// page of a `TOP 1` listing. Records are not decoded.
    pub async fn ping(&self) -> CertResult<()> {
        let container = self.open().await?;
        let query = listing_query(ResultLimit::new(1));
        let mut pager = container.query(&query, &self.partition_key);
        if pager.has_more() {
            pager.next_page().await.map_err(CertError::from_store)?;
        }
        Ok(())
    }

    async fn open(&self) -> CertResult<Box<dyn DocumentContainer>> {
        self.source.open().await.map_err(|e| {
            warn!(error = %e, "could not open document container");
            CertError::ClientAuth(e.to_string())
        })
    }

    async fn run(&self, query: &DocumentQuery) -> CertResult<Vec<Certification>> {
        let container = self.open().await?;
        debug!(query = query.text(), partition = %self.partition_key, "executing query");

        let mut pager = container.query(query, &self.partition_key);
        collect_records(pager.as_mut()).await
    }
}

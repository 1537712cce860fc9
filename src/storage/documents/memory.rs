//! In-memory document source.
//!
//! Evaluates the structured side of a [`DocumentQuery`] (field, bound value,
//! limit) over a fixed set of documents and serves the matches in pages of a
//! configurable size. Used by tests and local runs without a database.

use crate::domain::query::builder::VALUE_PLACEHOLDER;
use crate::domain::query::DocumentQuery;
use crate::storage::documents::store::{
    DocumentContainer, DocumentSource, Page, QueryPager, StoreError,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Fixture {
    partition_key: String,
    documents: Vec<JsonValue>,
    page_size: usize,
    fail_on_page: Option<usize>,
    open_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InMemorySource {
    fixture: Arc<Fixture>,
}

impl InMemorySource {
    /// All documents live in `partition_key`, in insertion order.
    pub fn new(partition_key: impl Into<String>, documents: Vec<JsonValue>) -> Self {
        Self {
            fixture: Arc::new(Fixture {
                partition_key: partition_key.into(),
                documents,
                page_size: 100,
                fail_on_page: None,
                open_error: None,
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        Arc::make_mut(&mut self.fixture).page_size = page_size.max(1);
        self
    }

    /// Makes the fetch of the given 1-based page fail with a 503.
    pub fn failing_on_page(mut self, page: usize) -> Self {
        Arc::make_mut(&mut self.fixture).fail_on_page = Some(page);
        self
    }

    /// Makes `open` fail as if no credential were available.
    pub fn failing_open(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.fixture).open_error = Some(message.into());
        self
    }
}

#[async_trait]
impl DocumentSource for InMemorySource {
    async fn open(&self) -> Result<Box<dyn DocumentContainer>, StoreError> {
        if let Some(msg) = &self.fixture.open_error {
            return Err(StoreError::Credential(msg.clone()));
        }
        Ok(Box::new(InMemoryContainer {
            fixture: self.fixture.clone(),
        }))
    }
}

struct InMemoryContainer {
    fixture: Arc<Fixture>,
}

impl DocumentContainer for InMemoryContainer {
    fn query(&self, query: &DocumentQuery, partition_key: &str) -> Box<dyn QueryPager> {
        let fixture = &self.fixture;
        let wanted = query.parameter(VALUE_PLACEHOLDER).cloned();
        let field = query.field().as_str();

        let mut matches: Vec<JsonValue> = if partition_key == fixture.partition_key {
            fixture
                .documents
                .iter()
                .filter(|doc| wanted.is_some() && doc.get(field) == wanted.as_ref())
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        if let Some(limit) = query.limit() {
            let limit = usize::try_from(limit.get()).unwrap_or(usize::MAX);
            matches.truncate(limit);
        }

        let pages: VecDeque<Vec<JsonValue>> = matches
            .chunks(fixture.page_size)
            .map(<[JsonValue]>::to_vec)
            .collect();

        Box::new(InMemoryPager {
            pages,
            fetched: 0,
            fail_on_page: fixture.fail_on_page,
        })
    }
}

struct InMemoryPager {
    pages: VecDeque<Vec<JsonValue>>,
    fetched: usize,
    fail_on_page: Option<usize>,
}

#[async_trait]
impl QueryPager for InMemoryPager {
    fn has_more(&self) -> bool {
        !self.pages.is_empty()
    }

    async fn next_page(&mut self) -> Result<Page, StoreError> {
        let items = self.pages.pop_front().ok_or(StoreError::Exhausted)?;
        self.fetched += 1;
        if self.fail_on_page == Some(self.fetched) {
            self.pages.clear();
            return Err(StoreError::Service {
                status: 503,
                code: Some("ServiceUnavailable".to_string()),
                message: format!("page {} unavailable", self.fetched),
            });
        }
        Ok(Page { items })
    }
}

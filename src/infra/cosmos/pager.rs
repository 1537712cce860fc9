//! Continuation-token driven query pager.
//!
//! How Cosmos DB pages: one query may span any number of pages, each with any
//! number of items. The service returns `x-ms-continuation` while more
//! results remain, and that token must accompany the next request.

use crate::domain::query::DocumentQuery;
use crate::infra::cosmos::API_VERSION;
use crate::storage::documents::{Page, QueryPager, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::debug;
use url::Url;

pub const CONTINUATION_HEADER: &str = "x-ms-continuation";
const REQUEST_CHARGE_HEADER: &str = "x-ms-request-charge";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "Documents", default)]
    documents: Vec<JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
struct CosmosErrorBody {
    code: Option<String>,
    #[serde(default)]
    message: String,
}

pub struct CosmosQueryPager {
    http: reqwest::Client,
    docs_url: Url,
    authorization: String,
    /// JSON array form, e.g. `["certification"]`.
    partition_key: String,
    body: JsonValue,
    page_size: Option<u32>,
    continuation: Option<String>,
    done: bool,
    pages: usize,
}

impl CosmosQueryPager {
    pub fn new(
        http: reqwest::Client,
        docs_url: Url,
        authorization: String,
        query: &DocumentQuery,
        partition_key: &str,
        page_size: Option<u32>,
    ) -> Self {
        Self {
            http,
            docs_url,
            authorization,
            partition_key: json!([partition_key]).to_string(),
            body: json!({
                "query": query.text(),
                "parameters": query.parameters(),
            }),
            page_size,
            continuation: None,
            done: false,
            pages: 0,
        }
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .post(self.docs_url.clone())
            .header(AUTHORIZATION, self.authorization.as_str())
            .header("x-ms-date", rfc1123_now())
            .header("x-ms-version", API_VERSION)
            .header("x-ms-documentdb-isquery", "True")
            .header("x-ms-documentdb-partitionkey", self.partition_key.as_str())
            .header(CONTENT_TYPE, "application/query+json");

        if let Some(n) = self.page_size {
            request = request.header("x-ms-max-item-count", n.to_string());
        }
        if let Some(token) = &self.continuation {
            request = request.header(CONTINUATION_HEADER, token.as_str());
        }

        request.json(&self.body)
    }

    async fn fetch(&mut self) -> Result<Page, StoreError> {
        let response = self.request().send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: CosmosErrorBody = serde_json::from_str(&text).unwrap_or_default();
            let message = if body.message.is_empty() { text } else { body.message };
            return Err(StoreError::Service {
                status: status.as_u16(),
                code: body.code,
                message,
            });
        }

        let continuation = header_str(response.headers(), CONTINUATION_HEADER)?
            .filter(|token| !token.is_empty());
        let charge = header_str(response.headers(), REQUEST_CHARGE_HEADER)?;

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("query response body: {}", e)))?;

        self.pages += 1;
        debug!(
            page = self.pages,
            items = body.documents.len(),
            request_charge = charge.as_deref().unwrap_or("-"),
            has_continuation = continuation.is_some(),
            "Cosmos query page received"
        );

        self.done = continuation.is_none();
        self.continuation = continuation;
        Ok(Page {
            items: body.documents,
        })
    }
}

#[async_trait]
impl QueryPager for CosmosQueryPager {
    fn has_more(&self) -> bool {
        !self.done
    }

    async fn next_page(&mut self) -> Result<Page, StoreError> {
        if self.done {
            return Err(StoreError::Exhausted);
        }
        let result = self.fetch().await;
        if result.is_err() {
            // No retries: a failed page ends the sequence.
            self.done = true;
        }
        result
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Result<Option<String>, StoreError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| StoreError::Malformed(format!("non-ASCII {} header", name)))
        })
        .transpose()
}

fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{build_query, LookupField, ResultLimit};

    fn pager(page_size: Option<u32>) -> CosmosQueryPager {
        let query = build_query(LookupField::Company, "Microsoft", ResultLimit::new(5));
        CosmosQueryPager::new(
            reqwest::Client::new(),
            Url::parse("https://acct.documents.azure.com/dbs/db/colls/c/docs").unwrap(),
            "type%3Daad%26ver%3D1.0%26sig%3Dtok".into(),
            &query,
            "certification",
            page_size,
        )
    }

    #[test]
    fn first_request_carries_query_headers_and_bound_parameters() {
        let request = pager(Some(10)).request().build().unwrap();
        let headers = request.headers();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(headers["x-ms-documentdb-isquery"], "True");
        assert_eq!(headers["x-ms-documentdb-partitionkey"], "[\"certification\"]");
        assert_eq!(headers["content-type"], "application/query+json");
        assert_eq!(headers["x-ms-version"], API_VERSION);
        assert_eq!(headers["x-ms-max-item-count"], "10");
        assert!(headers["x-ms-date"].to_str().unwrap().ends_with(" GMT"));
        assert!(headers.get(CONTINUATION_HEADER).is_none());

        let body: JsonValue =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "SELECT TOP @top * FROM certifications c WHERE c.company = @value",
                "parameters": [
                    { "name": "@value", "value": "Microsoft" },
                    { "name": "@top", "value": 5 }
                ]
            })
        );
    }

    #[test]
    fn continuation_is_forwarded() {
        let mut p = pager(None);
        p.continuation = Some("+RID:~abc#RT:1".into());
        let request = p.request().build().unwrap();
        assert_eq!(request.headers()[CONTINUATION_HEADER], "+RID:~abc#RT:1");
        assert!(request.headers().get("x-ms-max-item-count").is_none());
    }

    #[tokio::test]
    async fn exhausted_pager_refuses_further_pages() {
        let mut p = pager(None);
        p.done = true;
        assert!(!p.has_more());
        assert!(matches!(p.next_page().await, Err(StoreError::Exhausted)));
    }

    #[test]
    fn date_header_is_rfc1123() {
        let date = rfc1123_now();
        assert!(chrono::DateTime::parse_from_rfc2822(&date.replace("GMT", "+0000")).is_ok());
    }
}

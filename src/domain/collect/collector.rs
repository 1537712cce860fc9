//! Drains a query pager into an ordered list of certifications.

use crate::domain::error::{CertError, CertResult};
use crate::domain::model::Certification;
use crate::storage::documents::QueryPager;
use tracing::debug;

/// Pulls every page, in order, and decodes every item.
///
/// All-or-nothing: the first fetch or decode failure discards whatever was
/// collected so far. Dropping the returned future cancels the in-flight fetch.
pub async fn collect_records(pager: &mut dyn QueryPager) -> CertResult<Vec<Certification>> {
    let mut records = Vec::new();
    let mut pages = 0usize;

    while pager.has_more() {
        let page = pager.next_page().await.map_err(CertError::from_store)?;
        pages += 1;
        debug!(page = pages, items = page.items.len(), "fetched result page");

        records.reserve(page.items.len());
        for item in page.items {
            records.push(Certification::from_document(item)?);
        }
    }

    debug!(pages, records = records.len(), "query drained");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::documents::{Page, StoreError};
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};
    use std::collections::VecDeque;

    /// Scripted pager: each entry is the outcome of one `next_page` call.
    struct ScriptedPager {
        script: VecDeque<Result<Vec<JsonValue>, StoreError>>,
        calls: usize,
    }

    impl ScriptedPager {
        fn new(script: Vec<Result<Vec<JsonValue>, StoreError>>) -> Self {
            Self {
                script: script.into(),
                calls: 0,
            }
        }
    }

    #[async_trait]
    impl QueryPager for ScriptedPager {
        fn has_more(&self) -> bool {
            !self.script.is_empty()
        }

        async fn next_page(&mut self) -> Result<Page, StoreError> {
            self.calls += 1;
            let items = self.script.pop_front().ok_or(StoreError::Exhausted)??;
            Ok(Page { items })
        }
    }

    fn cert(id: &str) -> JsonValue {
        json!({ "id": id, "category": "Cloud", "company": "Microsoft" })
    }

    #[tokio::test]
    async fn keeps_page_and_item_order() {
        let mut pager = ScriptedPager::new(vec![
            Ok(vec![cert("a"), cert("b")]),
            Ok(vec![]),
            Ok(vec![cert("c")]),
        ]);

        let records = collect_records(&mut pager).await.unwrap();
        let ids: Vec<_> = records.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(pager.calls, 3);
    }

    #[tokio::test]
    async fn no_pages_yields_empty_list() {
        let mut pager = ScriptedPager::new(vec![]);
        assert!(collect_records(&mut pager).await.unwrap().is_empty());
        assert_eq!(pager.calls, 0);
    }

    #[tokio::test]
    async fn duplicates_are_preserved() {
        let mut pager = ScriptedPager::new(vec![Ok(vec![cert("a")]), Ok(vec![cert("a")])]);
        assert_eq!(collect_records(&mut pager).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_mid_stream_discards_everything() {
        let mut pager = ScriptedPager::new(vec![
            Ok(vec![cert("a"), cert("b")]),
            Err(StoreError::Service {
                status: 503,
                code: None,
                message: "busy".into(),
            }),
            Ok(vec![cert("c")]),
        ]);

        let err = collect_records(&mut pager).await.unwrap_err();
        assert!(matches!(err, CertError::Fetch(StoreError::Service { status: 503, .. })));
        assert_eq!(pager.calls, 2, "stopped at the failing page");
    }

    #[tokio::test]
    async fn credential_failure_mid_stream_is_client_auth() {
        let mut pager = ScriptedPager::new(vec![
            Ok(vec![cert("a")]),
            Err(StoreError::Credential("token refresh failed".into())),
        ]);
        let err = collect_records(&mut pager).await.unwrap_err();
        assert!(matches!(err, CertError::ClientAuth(_)));
    }

    #[tokio::test]
    async fn one_bad_item_fails_the_whole_result() {
        let mut pager = ScriptedPager::new(vec![
            Ok(vec![cert("a")]),
            Ok(vec![cert("b"), json!({ "category": "no id" })]),
        ]);
        let err = collect_records(&mut pager).await.unwrap_err();
        assert!(matches!(err, CertError::Decode(_)));
    }
}

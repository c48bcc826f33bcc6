//! Trait definition for pluggable Retrieval Source back-ends.
//!
//! A Retrieval Source turns a query into an ordered list of
//! [`SourceCandidate`] values. Back-end failures are reported as
//! [`SearchError`] and absorbed by [`fetch_sources`], so the grounding
//! pipeline only ever sees "some sources" or "no sources".

use crate::error::SearchError;
use crate::filters::FilterSet;
use crate::types::SourceCandidate;

/// A pluggable web-search back-end.
///
/// All implementations must be `Send + Sync` so a single instance can serve
/// concurrent requests.
pub trait RetrievalSource: Send + Sync {
    /// Search for `query` and return at most `num_results` candidates.
    ///
    /// `query` already carries the composed filter modifiers
    /// ([`FilterSet::apply_to_query`]); `filters` is passed for back-ends that
    /// also take the date or file type as request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the back-end is unreachable, times out,
    /// refuses service, or answers with something unparseable.
    fn search(
        &self,
        query: &str,
        num_results: usize,
        filters: &FilterSet,
    ) -> impl std::future::Future<Output = Result<Vec<SourceCandidate>, SearchError>> + Send;

    /// Short name for logs.
    fn name(&self) -> &str {
        "retrieval"
    }
}

/// A Retrieval Source that always answers with the same candidates.
///
/// Useful for replaying recorded searches and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRetrieval {
    sources: Vec<SourceCandidate>,
}

impl StaticRetrieval {
    /// Serve `sources` for every query.
    pub fn new(sources: Vec<SourceCandidate>) -> Self {
        Self { sources }
    }
}

impl RetrievalSource for StaticRetrieval {
    async fn search(
        &self,
        _query: &str,
        num_results: usize,
        _filters: &FilterSet,
    ) -> Result<Vec<SourceCandidate>, SearchError> {
        Ok(self.sources.iter().take(num_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Query a Retrieval Source, translating any failure into an empty list.
///
/// The filter modifiers are appended to `query` before the call. Failures
/// are logged at warn level and never propagated.
pub async fn fetch_sources<R: RetrievalSource>(
    retrieval: &R,
    query: &str,
    num_results: usize,
    filters: &FilterSet,
) -> Vec<SourceCandidate> {
    let search_query = filters.apply_to_query(query);
    tracing::trace!(query = %search_query, "retrieval query");

    match retrieval.search(&search_query, num_results, filters).await {
        Ok(sources) => {
            tracing::debug!(backend = retrieval.name(), count = sources.len(), "retrieval returned sources");
            sources
        }
        Err(err) => {
            tracing::warn!(backend = retrieval.name(), error = %err, "retrieval failed, continuing without sources");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the query it was asked and fails on demand.
    struct MockRetrieval {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl MockRetrieval {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RetrievalSource for MockRetrieval {
        async fn search(
            &self,
            query: &str,
            _num_results: usize,
            _filters: &FilterSet,
        ) -> Result<Vec<SourceCandidate>, SearchError> {
            self.seen.lock().expect("lock").push(query.to_string());
            if self.fail {
                return Err(SearchError::Http("connection refused".into()));
            }
            Ok(vec![SourceCandidate::new("A", "https://a.com", "a")])
        }
    }

    #[test]
    fn mock_retrieval_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockRetrieval>();
        assert_send_sync::<StaticRetrieval>();
    }

    #[tokio::test]
    async fn static_retrieval_respects_num_results() {
        let retrieval = StaticRetrieval::new(vec![
            SourceCandidate::new("A", "https://a.com", ""),
            SourceCandidate::new("B", "https://b.com", ""),
        ]);
        let sources = retrieval
            .search("q", 1, &FilterSet::default())
            .await
            .expect("static never fails");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "A");
    }

    #[tokio::test]
    async fn failures_become_empty_list() {
        let retrieval = MockRetrieval::new(true);
        let sources = fetch_sources(&retrieval, "rust", 10, &FilterSet::default()).await;
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn filters_appended_to_query() {
        let retrieval = MockRetrieval::new(false);
        let filters = FilterSet {
            include_domains: vec!["docs.rs".into()],
            ..Default::default()
        };
        let sources = fetch_sources(&retrieval, "serde", 10, &filters).await;
        assert_eq!(sources.len(), 1);
        let seen = retrieval.seen.lock().expect("lock");
        assert_eq!(seen.as_slice(), ["serde site:docs.rs"]);
    }
}

//! Evidence-retrieval capabilities.
//!
//! Two search collaborators back the reasoning loop: general web search
//! and recent-news search. Dispatch is over the closed
//! [`Capability`] enum: an unknown capability cannot exist past the
//! parser, so there is no runtime lookup to miss.
//!
//! The invoker never raises transport failures to the controller: a
//! timeout or HTTP error becomes a textual error observation the model
//! can read and react to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use claimcheck_core::Capability;

mod cache;
mod news;
mod web;

pub use cache::SearchCache;
pub use news::{NewsApiSearch, NEWSAPI_API_KEY_ENV};
pub use web::{SerperWebSearch, SERPER_API_KEY_ENV};

/// Errors from search collaborators.
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("capability not configured: {0}")]
    NotConfigured(String),
}

/// One raw search result from a collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,

    /// Web results carry a snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// News results carry the outlet name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// News results carry a publication stamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl SearchHit {
    /// A bare title/url hit.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: None,
            source: None,
            published_at: None,
        }
    }
}

/// A search collaborator reached over request/response calls.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute one search.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CapabilityError>;

    /// Backend name for logs and observations.
    fn name(&self) -> &str;
}

/// Outcome of one capability invocation.
///
/// The observation text always exists; errors are embedded, not raised.
/// `succeeded` gates whether the invocation counts toward the
/// mandatory-usage policy.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub observation: String,
    pub succeeded: bool,
}

/// The registered capabilities of a run, resolved at construction time.
pub struct CapabilitySet {
    web: Arc<dyn SearchBackend>,
    news: Arc<dyn SearchBackend>,
    timeout: Duration,
    cache: Option<SearchCache>,
}

impl CapabilitySet {
    /// Create a capability set over concrete backends.
    pub fn new(web: Arc<dyn SearchBackend>, news: Arc<dyn SearchBackend>, timeout: Duration) -> Self {
        Self {
            web,
            news,
            timeout,
            cache: None,
        }
    }

    /// Attach a search-result cache.
    pub fn with_cache(mut self, cache: SearchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn backend(&self, capability: Capability) -> &dyn SearchBackend {
        match capability {
            Capability::Web => self.web.as_ref(),
            Capability::News => self.news.as_ref(),
        }
    }

    /// Invoke a capability, bounded by the configured timeout.
    ///
    /// Transport failures and timeouts come back as error observations
    /// so the reasoning loop can see and adapt to them.
    pub async fn invoke(&self, capability: Capability, query: &str) -> Invocation {
        if let Some(cache) = &self.cache {
            if let Some(hits) = cache.get(capability, query).await {
                tracing::debug!(capability = %capability, query, "search cache hit");
                return Invocation {
                    observation: render_observation(query, &hits),
                    succeeded: true,
                };
            }
        }

        let backend = self.backend(capability);
        let outcome = tokio::time::timeout(self.timeout, backend.search(query)).await;

        match outcome {
            Ok(Ok(hits)) => {
                if let Some(cache) = &self.cache {
                    cache.insert(capability, query, hits.clone()).await;
                }
                tracing::debug!(
                    capability = %capability,
                    query,
                    hits = hits.len(),
                    "capability invocation succeeded"
                );
                Invocation {
                    observation: render_observation(query, &hits),
                    succeeded: true,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(capability = %capability, query, error = %e, "capability invocation failed");
                Invocation {
                    observation: render_error_observation(capability, &e.to_string()),
                    succeeded: false,
                }
            }
            Err(_) => {
                tracing::warn!(
                    capability = %capability,
                    query,
                    timeout = ?self.timeout,
                    "capability invocation timed out"
                );
                let e = CapabilityError::Timeout(self.timeout);
                Invocation {
                    observation: render_error_observation(capability, &e.to_string()),
                    succeeded: false,
                }
            }
        }
    }
}

/// Observation text for a successful search.
fn render_observation(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return json!({
            "results": [],
            "query": query,
            "count": 0,
            "note": "No results found"
        })
        .to_string();
    }
    json!({
        "results": hits,
        "query": query,
        "count": hits.len()
    })
    .to_string()
}

/// Observation text for a failed search.
fn render_error_observation(capability: Capability, message: &str) -> String {
    json!({
        "error": format!("{} error: {}", capability.action_name(), message),
        "results": [],
        "count": 0
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl SearchBackend for FixedBackend {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, CapabilityError> {
            Ok(self.hits.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl SearchBackend for FailingBackend {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, CapabilityError> {
            Err(CapabilityError::HttpError("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct HangingBackend;

    #[async_trait]
    impl SearchBackend for HangingBackend {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, CapabilityError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    fn set_with(web: Arc<dyn SearchBackend>, news: Arc<dyn SearchBackend>) -> CapabilitySet {
        CapabilitySet::new(web, news, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_successful_invocation_renders_results() {
        let set = set_with(
            Arc::new(FixedBackend {
                hits: vec![SearchHit::new("A", "https://example.com/a")],
            }),
            Arc::new(FixedBackend { hits: vec![] }),
        );

        let invocation = set.invoke(Capability::Web, "acme").await;
        assert!(invocation.succeeded);
        assert!(invocation.observation.contains("https://example.com/a"));
        assert!(invocation.observation.contains("\"count\":1"));
    }

    #[tokio::test]
    async fn test_empty_results_still_succeed() {
        let set = set_with(
            Arc::new(FixedBackend { hits: vec![] }),
            Arc::new(FixedBackend { hits: vec![] }),
        );

        let invocation = set.invoke(Capability::News, "nothing").await;
        assert!(invocation.succeeded);
        assert!(invocation.observation.contains("No results found"));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_observation() {
        let set = set_with(Arc::new(FailingBackend), Arc::new(FixedBackend { hits: vec![] }));

        let invocation = set.invoke(Capability::Web, "acme").await;
        assert!(!invocation.succeeded);
        assert!(invocation.observation.contains("web_search error:"));
        assert!(invocation.observation.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_observation() {
        let set = set_with(Arc::new(HangingBackend), Arc::new(FixedBackend { hits: vec![] }));

        let invocation = set.invoke(Capability::Web, "acme").await;
        assert!(!invocation.succeeded);
        assert!(invocation.observation.contains("timed out"));
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_queries() {
        struct CountingBackend {
            calls: std::sync::atomic::AtomicU32,
        }

        #[async_trait]
        impl SearchBackend for CountingBackend {
            async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, CapabilityError> {
                self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![SearchHit::new("A", "https://example.com/a")])
            }

            fn name(&self) -> &str {
                "counting"
            }
        }

        let counting = Arc::new(CountingBackend {
            calls: std::sync::atomic::AtomicU32::new(0),
        });
        let set = CapabilitySet::new(
            counting.clone(),
            Arc::new(FixedBackend { hits: vec![] }),
            Duration::from_millis(100),
        )
        .with_cache(SearchCache::new(100, Duration::from_secs(60)));

        let first = set.invoke(Capability::Web, "acme").await;
        let second = set.invoke(Capability::Web, "acme").await;
        assert!(first.succeeded && second.succeeded);
        assert_eq!(first.observation, second.observation);
        assert_eq!(counting.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}

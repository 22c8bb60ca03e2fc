//! Recent-news search via NewsAPI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::providers::secrets::{ApiCredential, CredentialSource};
use crate::providers::ProviderError;

use super::{CapabilityError, SearchBackend, SearchHit};

/// Environment variable name for the NewsAPI key.
pub const NEWSAPI_API_KEY_ENV: &str = "NEWSAPI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Articles requested per query.
const PAGE_SIZE: u32 = 10;

/// News-search collaborator backed by NewsAPI.
pub struct NewsApiSearch {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for NewsApiSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiSearch")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NewsApiSearch {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(api_key, CredentialSource::Programmatic, "NewsAPI key"),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client(),
        }
    }

    /// Create a client from the `NEWSAPI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, CapabilityError> {
        let credential = ApiCredential::from_env(NEWSAPI_API_KEY_ENV, "NewsAPI key")
            .map_err(not_configured)?;
        Ok(Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client(),
        })
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client")
}

fn not_configured(e: ProviderError) -> CapabilityError {
    CapabilityError::NotConfigured(e.to_string())
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl SearchBackend for NewsApiSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CapabilityError> {
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(format!("{}/everything", self.base_url))
            .header("X-Api-Key", self.credential.expose())
            .query(&[
                ("q", query),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("sortBy", "relevancy"),
            ])
            .send()
            .await
            .map_err(|e| CapabilityError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<NewsApiError>().await {
                Ok(body) => format!(
                    "{}: {}",
                    body.code.unwrap_or_else(|| "unknown".to_string()),
                    body.message.unwrap_or_default()
                ),
                Err(e) => format!("unparseable error body: {}", e),
            };
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::ParseError(e.to_string()))?;

        Ok(body
            .articles
            .into_iter()
            .map(|article| SearchHit {
                title: article.title.unwrap_or_default(),
                url: article.url,
                snippet: None,
                source: article.source.and_then(|s| s.name),
                published_at: article.published_at,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "news_search"
    }
}

//! General web search via the Serper API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::providers::secrets::{ApiCredential, CredentialSource};
use crate::providers::ProviderError;

use super::{CapabilityError, SearchBackend, SearchHit};

/// Environment variable name for the Serper API key.
pub const SERPER_API_KEY_ENV: &str = "SERPAPI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// Results requested per query.
const RESULT_COUNT: u32 = 5;

/// Web-search collaborator backed by Serper.
pub struct SerperWebSearch {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SerperWebSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerperWebSearch")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SerperWebSearch {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(api_key, CredentialSource::Programmatic, "Serper API key"),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client(),
        }
    }

    /// Create a client from the `SERPAPI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, CapabilityError> {
        let credential = ApiCredential::from_env(SERPER_API_KEY_ENV, "Serper API key")
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

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

#[async_trait]
impl SearchBackend for SerperWebSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CapabilityError> {
        let request = SerperRequest {
            q: query,
            num: RESULT_COUNT,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", self.credential.expose())
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CapabilityError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::ParseError(e.to_string()))?;

        Ok(body
            .organic
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
                source: None,
                published_at: None,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "web_search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_mapping() {
        let raw = r#"{"organic": [
            {"title": "Flat Earth - Wikipedia", "link": "https://en.wikipedia.org/wiki/Flat_Earth", "snippet": "...", "position": 1},
            {"link": "https://example.com/untitled"}
        ], "searchParameters": {"q": "is the earth flat"}}"#;

        let body: SerperResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.organic.len(), 2);
        assert_eq!(body.organic[0].title, "Flat Earth - Wikipedia");
        assert_eq!(body.organic[1].title, "");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let client = SerperWebSearch::new("serper-secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("serper-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

//! News search client.
//!
//! A plain GET against the news search endpoint, authorized with the access
//! key header. The service hands out a client id on the first search; sending
//! it back on later searches keeps a user's results consistent.
//!
//! Failures use the same kinds as translation calls: transport, upstream
//! (non-success status) and protocol (unparseable body).

use crate::config::Config;
use crate::credential::ACCESS_KEY_HEADER;
use crate::error::TranslatorError;
use crate::metrics::TranslationMetrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the service-assigned client id, in both directions
pub const CLIENT_ID_HEADER: &str = "X-MSEdge-ClientID";

const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

// ==================== Response Types ====================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub content_url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleImage {
    pub thumbnail: Thumbnail,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Organization {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<ArticleImage>,
    /// RFC 3339 timestamp as sent by the service
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub provider: Vec<Organization>,
}

impl NewsArticle {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .map(|image| image.thumbnail.content_url.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsSearchResponse {
    #[serde(default)]
    total_estimated_matches: u64,
    #[serde(default)]
    value: Vec<NewsArticle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsSearchResult {
    pub total_estimated_matches: u64,
    pub articles: Vec<NewsArticle>,
    /// Client id returned by the service, if any
    pub client_id: Option<String>,
}

/// Optional query parameters of a news search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsSearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mkt: Option<String>,
}

pub fn parse_news_response(body: &str) -> Result<(u64, Vec<NewsArticle>), TranslatorError> {
    let response: NewsSearchResponse = serde_json::from_str(body)
        .map_err(|e| TranslatorError::Protocol(format!("unparseable search response: {}", e)))?;
    Ok((response.total_estimated_matches, response.value))
}

// ==================== Client ====================

#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search_news(
        &self,
        query: &str,
        client_id: Option<&str>,
        options: &NewsSearchOptions,
    ) -> Result<NewsSearchResult, TranslatorError>;
}

pub struct SearchClient {
    http: reqwest::Client,
    api_url: String,
    access_key: String,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(http: reqwest::Client, api_url: &str, access_key: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            access_key: access_key.to_string(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    /// `None` when no search access key is configured.
    pub fn from_config(http: reqwest::Client, config: &Config) -> Option<Self> {
        let access_key = config.search_access_key.as_deref()?;
        Some(Self::new(http, &config.search_api_url, access_key).with_timeout(config.request_timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(
        &self,
        query: &str,
        client_id: Option<&str>,
        options: &NewsSearchOptions,
    ) -> Result<NewsSearchResult, TranslatorError> {
        let mut request = self
            .http
            .get(&self.api_url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .query(options)
            .query(&[("q", query)])
            .timeout(self.timeout);
        if let Some(client_id) = client_id {
            request = request.header(CLIENT_ID_HEADER, client_id);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TranslatorError::Transport(format!("search request timed out after {:?}", self.timeout))
            } else {
                TranslatorError::Transport(format!("search request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslatorError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let returned_client_id = response
            .headers()
            .get(CLIENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let body = response
            .text()
            .await
            .map_err(|e| TranslatorError::Transport(format!("failed to read response: {}", e)))?;

        let (total_estimated_matches, articles) = parse_news_response(&body)?;
        debug!("News search returned {} articles", articles.len());

        Ok(NewsSearchResult {
            total_estimated_matches,
            articles,
            client_id: returned_client_id,
        })
    }
}

#[async_trait]
impl NewsSearch for SearchClient {
    async fn search_news(
        &self,
        query: &str,
        client_id: Option<&str>,
        options: &NewsSearchOptions,
    ) -> Result<NewsSearchResult, TranslatorError> {
        let metrics = TranslationMetrics::global();
        metrics.record_search_call();

        let result = self.send(query, client_id, options).await;
        if let Err(e) = &result {
            metrics.record_search_failure();
            warn!("News search failed ({}): {}", e.kind(), e);
        }
        result
    }
}

use crate::config::Config;
use crate::credential::CredentialCache;
use crate::error::TranslatorError;
use crate::metrics::TranslationMetrics;
use async_trait::async_trait;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const ARRAYS_NAMESPACE: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";

/// One text translated into one target language.
///
/// `source_language` is the language the service detected (or was told) for
/// the source text; it can equal `target_language`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub source_language: String,
    pub target_language: String,
    pub source_text: String,
    pub translated_text: String,
}

impl TranslationResult {
    /// Source and target are the same language, so the "translation" is the
    /// input echoed back.
    pub fn is_same_language(&self) -> bool {
        self.source_language.eq_ignore_ascii_case(&self.target_language)
    }
}

/// Single-text, single-target translation.
///
/// Implemented by [`TranslationClient`] against the live service; the
/// fan-out layer only depends on this trait.
#[async_trait]
pub trait Translate: Send + Sync {
    /// Make sure calls can be authorized before fanning out. A failure here is
    /// systemic and is reported once instead of once per target.
    async fn ensure_ready(&self) -> Result<(), TranslatorError> {
        Ok(())
    }

    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<TranslationResult, TranslatorError>;
}

#[async_trait]
impl<T: Translate + ?Sized> Translate for Arc<T> {
    async fn ensure_ready(&self) -> Result<(), TranslatorError> {
        (**self).ensure_ready().await
    }

    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<TranslationResult, TranslatorError> {
        (**self)
            .translate_one(text, target_language, source_language)
            .await
    }
}

// ==================== Wire Format ====================

#[derive(Debug, Deserialize)]
struct TranslateArrayResponseList {
    #[serde(rename = "TranslateArrayResponse", default)]
    responses: Vec<TranslateArrayResponse>,
}

#[derive(Debug, Deserialize)]
struct TranslateArrayResponse {
    #[serde(rename = "From", default)]
    from: String,
    #[serde(rename = "TranslatedText", default)]
    translated_text: String,
}

/// Build the TranslateArray payload for one text. Every value is untrusted
/// and XML-escaped.
fn build_translate_request_body(
    text: &str,
    target_language: &str,
    source_language: Option<&str>,
) -> String {
    format!(
        r#"<TranslateArrayRequest>
  <AppId />
  <From>{from}</From>
  <Texts>
    <string xmlns="{ns}">{text}</string>
  </Texts>
  <To>{to}</To>
</TranslateArrayRequest>"#,
        from = escape(source_language.unwrap_or("")),
        ns = ARRAYS_NAMESPACE,
        text = escape(text),
        to = escape(target_language),
    )
}

/// Extract `(from, translated text)` for the first (and only) submitted text.
fn parse_translate_response(body: &str) -> Result<(String, String), TranslatorError> {
    let list: TranslateArrayResponseList = quick_xml::de::from_str(body)
        .map_err(|e| TranslatorError::Protocol(format!("unparseable response body: {}", e)))?;

    let first = list.responses.into_iter().next().ok_or_else(|| {
        TranslatorError::Protocol("response contained no translations".to_string())
    })?;

    Ok((first.from, first.translated_text))
}

// ==================== Client ====================

/// Client for the TranslateArray endpoint, authorized through a shared
/// [`CredentialCache`].
pub struct TranslationClient {
    http: reqwest::Client,
    credentials: Arc<CredentialCache>,
    api_url: String,
    timeout: Duration,
}

impl TranslationClient {
    pub fn new(http: reqwest::Client, credentials: Arc<CredentialCache>, api_url: &str) -> Self {
        Self {
            http,
            credentials,
            api_url: api_url.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(
        http: reqwest::Client,
        credentials: Arc<CredentialCache>,
        config: &Config,
    ) -> Self {
        Self::new(http, credentials, &config.translator_api_url).with_timeout(config.request_timeout)
    }

    /// Set the per-call timeout; expiry is reported as a transport error
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<TranslationResult, TranslatorError> {
        let token = self.credentials.get_valid_token().await?;
        let body = build_translate_request_body(text, target_language, source_language);

        let response = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/xml")
            .header("Authorization", format!("Bearer {}", token))
            .body(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslatorError::Transport(format!(
                        "translation request timed out after {:?}",
                        self.timeout
                    ))
                } else {
                    TranslatorError::Transport(format!("translation request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslatorError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslatorError::Transport(format!("failed to read response: {}", e)))?;

        let (from, translated_text) = parse_translate_response(&body)?;
        debug!("Translated {} -> {}", from, target_language);

        Ok(TranslationResult {
            source_language: from,
            target_language: target_language.to_string(),
            source_text: text.to_string(),
            translated_text,
        })
    }
}

#[async_trait]
impl Translate for TranslationClient {
    async fn ensure_ready(&self) -> Result<(), TranslatorError> {
        self.credentials.get_valid_token().await.map(|_| ())
    }

    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<TranslationResult, TranslatorError> {
        let metrics = TranslationMetrics::global();
        metrics.record_api_call();

        let result = self.send(text, target_language, source_language).await;
        if let Err(e) = &result {
            metrics.record_api_failure();
            warn!(
                "Translation to {} failed ({}): {}",
                target_language,
                e.kind(),
                e
            );
        }
        result
    }
}

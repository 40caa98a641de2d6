//! Bearer credential cache for the translation service.
//!
//! The identity endpoint trades the long-lived access key for a short-lived
//! bearer token. [`CredentialCache`] keeps the current token and refreshes it
//! once a configurable share of its nominal lifetime has elapsed, well before
//! the service starts rejecting it.
//!
//! Refreshes are single-flight: the first caller that finds the token stale
//! starts one exchange and publishes it as a shared future; every caller that
//! arrives while it is in flight awaits that same future and observes the same
//! token or the same [`TranslatorError::Credential`].

use crate::config::Config;
use crate::error::TranslatorError;
use crate::metrics::TranslationMetrics;
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Header carrying the access key on the identity exchange
pub const ACCESS_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Tokens are issued for ten minutes
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 60);

/// Refresh once 90% of the lifetime has elapsed (nine minutes by default)
pub const DEFAULT_REFRESH_RATIO: f64 = 0.9;

pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// An issued bearer token. Never mutated; a refresh replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    refresh_at: Instant,
    expires_at: Instant,
}

impl Credential {
    pub fn new(token: String, issued_at: Instant, lifetime: Duration, refresh_ratio: f64) -> Self {
        Self {
            token,
            refresh_at: issued_at + lifetime.mul_f64(refresh_ratio),
            expires_at: issued_at + lifetime,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// The service still accepts the token at `now`.
    pub fn is_usable(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// The token must not be handed out again at `now`.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        now >= self.refresh_at || !self.is_usable(now)
    }
}

type PendingExchange = Shared<BoxFuture<'static, Result<Arc<Credential>, TranslatorError>>>;

#[derive(Default)]
struct CacheState {
    current: Option<Arc<Credential>>,
    pending: Option<PendingExchange>,
}

/// Process-wide holder of the bearer token for one access key.
pub struct CredentialCache {
    http: reqwest::Client,
    token_url: String,
    access_key: String,
    lifetime: Duration,
    refresh_ratio: f64,
    timeout: Duration,
    state: Mutex<CacheState>,
}

impl CredentialCache {
    pub fn new(http: reqwest::Client, token_url: &str, access_key: &str) -> Self {
        Self {
            http,
            token_url: token_url.to_string(),
            access_key: access_key.to_string(),
            lifetime: DEFAULT_TOKEN_LIFETIME,
            refresh_ratio: DEFAULT_REFRESH_RATIO,
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(http, &config.translator_token_url, &config.translator_access_key)
            .with_lifetime(config.token_lifetime, config.token_refresh_ratio)
            .with_timeout(config.request_timeout)
    }

    /// Set the nominal token lifetime and the share of it after which the
    /// token is refreshed. `refresh_ratio` is clamped to (0, 1].
    pub fn with_lifetime(mut self, lifetime: Duration, refresh_ratio: f64) -> Self {
        self.lifetime = lifetime;
        self.refresh_ratio = refresh_ratio.clamp(f64::EPSILON, 1.0);
        self
    }

    /// Set the timeout for the exchange request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return a token that is valid for reuse now, exchanging the access key
    /// for a new one when there is none or it is due for refresh.
    ///
    /// No retry is attempted here; an exchange failure leaves the cache empty
    /// and the next call starts a fresh exchange.
    pub async fn get_valid_token(&self) -> Result<String, TranslatorError> {
        let exchange = {
            let mut state = self.state.lock().await;

            if let Some(credential) = &state.current {
                if !credential.needs_refresh(Instant::now()) {
                    return Ok(credential.token.clone());
                }
                debug!("Bearer token is due for refresh");
                state.current = None;
            }

            match &state.pending {
                Some(pending) => pending.clone(),
                None => {
                    let pending = self.start_exchange();
                    state.pending = Some(pending.clone());
                    pending
                }
            }
        };

        let result = exchange.clone().await;

        // Only the first waiter to get here publishes the outcome
        let mut state = self.state.lock().await;
        if state
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ptr_eq(&exchange))
        {
            state.pending = None;
            if let Ok(credential) = &result {
                state.current = Some(Arc::clone(credential));
            }
        }

        result.map(|credential| credential.token.clone())
    }

    /// Build the shared exchange future. It owns everything it needs so it
    /// can outlive the caller that started it.
    fn start_exchange(&self) -> PendingExchange {
        let http = self.http.clone();
        let token_url = self.token_url.clone();
        let access_key = self.access_key.clone();
        let lifetime = self.lifetime;
        let refresh_ratio = self.refresh_ratio;
        let timeout = self.timeout;

        async move {
            let metrics = TranslationMetrics::global();
            metrics.record_token_exchange();
            info!("Exchanging access key for a bearer token");

            match exchange_token(&http, &token_url, &access_key, timeout).await {
                Ok(token) => {
                    info!("✓ Bearer token issued");
                    Ok(Arc::new(Credential::new(
                        token,
                        Instant::now(),
                        lifetime,
                        refresh_ratio,
                    )))
                }
                Err(e) => {
                    metrics.record_token_exchange_failure();
                    warn!("Bearer token exchange failed: {}", e);
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// POST the access key to the identity endpoint; the raw body is the token.
async fn exchange_token(
    http: &reqwest::Client,
    token_url: &str,
    access_key: &str,
    timeout: Duration,
) -> Result<String, TranslatorError> {
    let response = http
        .post(token_url)
        .header(ACCESS_KEY_HEADER, access_key)
        .body("")
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| TranslatorError::Credential(format!("identity endpoint unreachable: {}", e)))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(TranslatorError::Credential(format!(
            "identity endpoint returned {}",
            status
        )));
    }

    let body = response.text().await.map_err(|e| {
        TranslatorError::Credential(format!("failed to read identity response: {}", e))
    })?;

    let token = body.trim();
    if token.is_empty() {
        return Err(TranslatorError::Credential(
            "identity endpoint returned an empty token".to_string(),
        ));
    }

    Ok(token.to_string())
}

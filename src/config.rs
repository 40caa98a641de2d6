use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str = "https://api.cognitive.microsoft.com/sts/v1.0/issueToken";
pub const DEFAULT_TRANSLATOR_API_URL: &str =
    "https://api.microsofttranslator.com/v2/http.svc/TranslateArray";
pub const DEFAULT_NEWS_SEARCH_URL: &str = "https://api.cognitive.microsoft.com/bing/v5.0/news/search";

#[derive(Debug, Clone)]
pub struct Config {
    // Translator service
    pub translator_access_key: String,
    pub translator_token_url: String,
    pub translator_api_url: String,

    // Credential lifetime: tokens last `token_lifetime`, refreshed once
    // `token_refresh_ratio` of it has elapsed
    pub token_lifetime: Duration,
    pub token_refresh_ratio: f64,

    // Per network call
    pub request_timeout: Duration,

    // News search, enabled when an access key is set
    pub search_access_key: Option<String>,
    pub search_api_url: String,

    // Bot behaviour
    pub max_translation_history: usize,
    pub allow_configuration_via_query: bool,

    /// Public base URI of the app, used to build settings page links
    pub app_base_uri: String,

    // HTTP API
    pub api_key: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token_refresh_ratio = env_parse("TOKEN_REFRESH_RATIO", 0.9_f64);
        if !(token_refresh_ratio > 0.0 && token_refresh_ratio <= 1.0) {
            bail!(
                "TOKEN_REFRESH_RATIO must be in (0, 1], got {}",
                token_refresh_ratio
            );
        }

        let token_lifetime_secs: u64 = env_parse("TOKEN_LIFETIME_SECS", 600);
        if token_lifetime_secs == 0 {
            bail!("TOKEN_LIFETIME_SECS must be greater than 0");
        }

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 10);
        if request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        let port: u16 = env_parse("PORT", 8080);

        Ok(Self {
            translator_access_key: std::env::var("TRANSLATOR_ACCESS_KEY")
                .context("TRANSLATOR_ACCESS_KEY not set")?,
            translator_token_url: std::env::var("TRANSLATOR_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            translator_api_url: std::env::var("TRANSLATOR_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATOR_API_URL.to_string()),

            token_lifetime: Duration::from_secs(token_lifetime_secs),
            token_refresh_ratio,

            request_timeout: Duration::from_secs(request_timeout_secs),

            search_access_key: std::env::var("SEARCH_ACCESS_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            search_api_url: std::env::var("SEARCH_API_URL")
                .unwrap_or_else(|_| DEFAULT_NEWS_SEARCH_URL.to_string()),

            max_translation_history: env_parse("MAX_TRANSLATION_HISTORY", 5),
            allow_configuration_via_query: env_parse("ALLOW_CONFIGURATION_VIA_QUERY", false),
            app_base_uri: std::env::var("APP_BASE_URI")
                .ok()
                .filter(|uri| !uri.is_empty())
                .map(|uri| uri.trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{}", port)),

            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            port,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset or invalid.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

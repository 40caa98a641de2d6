//! Query handling for the news search compose extension.
//!
//! Searches the news for the typed text and renders each article as a card.
//! The user's settings page sets the market results come from.

use crate::bot::{message, Card, QueryRequest, QueryResponse};
use crate::i18n::LanguageRegistry;
use crate::search::{NewsArticle, NewsSearch, NewsSearchOptions};
use crate::session::{SessionStore, UserData};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::escape::escape;
use std::sync::Arc;
use tracing::{error, info};

/// Settings page served next to the app
pub const SETTINGS_PAGE: &str = "html/search-settings.html";

pub struct NewsSearchBot {
    search: Arc<dyn NewsSearch>,
    sessions: Arc<dyn SessionStore>,
    settings_url: String,
}

impl NewsSearchBot {
    /// `app_base_uri` is the public root of the app, without a trailing slash.
    pub fn new(
        search: Arc<dyn NewsSearch>,
        sessions: Arc<dyn SessionStore>,
        app_base_uri: &str,
    ) -> Self {
        Self {
            search,
            sessions,
            settings_url: format!("{}/{}", app_base_uri.trim_end_matches('/'), SETTINGS_PAGE),
        }
    }

    pub async fn handle_query(&self, user_id: &str, query: QueryRequest) -> Result<QueryResponse> {
        let strings = LanguageRegistry::get().strings_for_locale(query.locale.as_deref());
        let mut data = self.load(user_id).await?;

        let mut text = query.text.unwrap_or_default().trim().to_string();

        // Settings arrive as part of a query after a configuration response
        if let Some(state) = query.state.as_deref() {
            apply_settings(&mut data, state);
            self.save(user_id, data.clone()).await?;
            text.clear();
        }

        if text.is_empty() {
            return Ok(message(strings.search_notext));
        }

        let options = NewsSearchOptions {
            mkt: data.search_market.clone(),
            ..Default::default()
        };
        let result = match self
            .search
            .search_news(&text, data.search_client_id.as_deref(), &options)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to search news ({}): {}", e.kind(), e);
                return Ok(message(strings.error_search));
            }
        };

        if let Some(client_id) = result.client_id {
            if data.search_client_id.as_deref() != Some(client_id.as_str()) {
                data.search_client_id = Some(client_id);
                self.save(user_id, data).await?;
            }
        }

        let now = Utc::now();
        let cards = result
            .articles
            .iter()
            .map(|article| article_card(article, now))
            .collect();
        Ok(QueryResponse::Results { cards })
    }

    /// Where the client should send the user to change their search settings.
    pub fn settings_url(&self) -> QueryResponse {
        QueryResponse::ConfigurationUrl {
            url: self.settings_url.clone(),
        }
    }

    /// Apply the settings page result. The client ignores the response, so it
    /// is an empty message.
    pub async fn handle_settings_update(&self, user_id: &str, state: &str) -> Result<QueryResponse> {
        let mut data = self.load(user_id).await?;
        apply_settings(&mut data, state);
        info!(
            "Updated news market for {}: {}",
            user_id,
            data.search_market.as_deref().unwrap_or("(service default)")
        );
        self.save(user_id, data).await?;

        Ok(message(""))
    }

    async fn load(&self, user_id: &str) -> Result<UserData> {
        self.sessions
            .load(user_id)
            .await
            .with_context(|| format!("Failed to load session for {}", user_id))
    }

    async fn save(&self, user_id: &str, data: UserData) -> Result<()> {
        self.sessions
            .save(user_id, data)
            .await
            .with_context(|| format!("Failed to save session for {}", user_id))
    }
}

/// The settings page sends a market code such as `en-us`; anything else
/// clears the market.
fn apply_settings(data: &mut UserData, state: &str) {
    data.search_market = parse_market(state);
}

fn parse_market(state: &str) -> Option<String> {
    let (language, region) = state.trim().split_once('-')?;
    let valid = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic());
    if !valid(language) || !valid(region) {
        return None;
    }
    Some(format!(
        "{}-{}",
        language.to_ascii_lowercase(),
        region.to_ascii_uppercase()
    ))
}

fn parse_published(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|date| date.and_utc())
        })
}

/// Rough relative age of `then`, e.g. "3 hours ago".
fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = (seconds + 30) / 60;
    let hours = (minutes + 30) / 60;
    let days = (hours + 12) / 24;

    match seconds {
        0..=44 => "a few seconds ago".to_string(),
        45..=89 => "a minute ago".to_string(),
        _ if minutes < 45 => format!("{} minutes ago", minutes),
        _ if minutes < 90 => "an hour ago".to_string(),
        _ if hours < 22 => format!("{} hours ago", hours),
        _ if hours < 36 => "a day ago".to_string(),
        _ => format!("{} days ago", days),
    }
}

/// "Provider A, Provider B | 3 hours ago"
fn attribution_line(article: &NewsArticle, now: DateTime<Utc>) -> String {
    let mut parts = Vec::new();
    if !article.provider.is_empty() {
        parts.push(
            article
                .provider
                .iter()
                .map(|provider| provider.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    if let Some(published) = article.date_published.as_deref().and_then(parse_published) {
        parts.push(time_ago(published, now));
    }
    parts.join(" | ")
}

fn article_card(article: &NewsArticle, now: DateTime<Utc>) -> Card {
    let attributions = attribution_line(article, now);
    Card {
        title: article.name.clone(),
        body: format!(
            r#"<a href="{url}">{name}</a><p>{description}</p><p>{attributions}</p>"#,
            url = escape(article.url.as_str()),
            name = escape(article.name.as_str()),
            description = escape(article.description.as_str()),
            attributions = escape(attributions.as_str()),
        ),
        subtitle: attributions,
        image_url: article.thumbnail_url().map(String::from),
        value: None,
    }
}

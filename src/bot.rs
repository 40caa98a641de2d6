//! Query handling for the translate compose extension.
//!
//! Turns a user's query into cards: live translations into the user's
//! languages, or their recent history on the initial run. Also applies
//! language settings and records selected translations into the history.

use crate::fan_out::FanOutTranslator;
use crate::history::{HistoryEntry, HistoryStore};
use crate::i18n::{Language, LanguageRegistry, LanguageStrings};
use crate::session::{SessionStore, UserData};
use crate::translation::{Translate, TranslationResult};
use anyhow::{Context, Result};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Query text that opens the settings when configuration via query is allowed
const SETTINGS_QUERY: &str = "settings";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub text: Option<String>,

    /// The compose box was just opened and nothing has been typed yet
    #[serde(default)]
    pub initial_run: bool,

    /// Comma-separated language codes coming back from the settings page
    #[serde(default)]
    pub state: Option<String>,

    /// UI locale of the user, e.g. `fr-FR`
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResponse {
    Results { cards: Vec<Card> },
    Message { text: String },
    Configuration { languages: Vec<String> },
    /// Settings live on a page the client opens
    ConfigurationUrl { url: String },
}

/// A result card. `body` is HTML with every user-supplied value escaped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Sent back by the client when the user picks a translation card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TranslationResult>,
}

pub struct TranslatorBot {
    translator: FanOutTranslator<Arc<dyn Translate>>,
    sessions: Arc<dyn SessionStore>,
    history: HistoryStore,
    allow_configuration_via_query: bool,
}

impl TranslatorBot {
    pub fn new(translator: Arc<dyn Translate>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            translator: FanOutTranslator::new(translator),
            sessions,
            history: HistoryStore::default(),
            allow_configuration_via_query: false,
        }
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn with_configuration_via_query(mut self, allow: bool) -> Self {
        self.allow_configuration_via_query = allow;
        self
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

        let languages = translation_languages(&data);

        if text == SETTINGS_QUERY && self.allow_configuration_via_query {
            return Ok(configuration_response(&languages));
        }

        if !text.is_empty() {
            return Ok(self.translate_query(&text, &languages, strings).await);
        }

        if query.initial_run && !data.translation_history.is_empty() {
            let cards = HistoryStore::list_recent(&data.translation_history)
                .iter()
                .filter(|entry| !entry.translation.is_same_language())
                .map(|entry| history_card(entry, strings))
                .collect();
            return Ok(QueryResponse::Results { cards });
        }

        Ok(message(strings.error_notext))
    }

    /// Record a picked translation in the user's history and return the card
    /// to drop into the conversation.
    pub async fn handle_select_item(
        &self,
        user_id: &str,
        translation: TranslationResult,
        locale: Option<&str>,
    ) -> Result<Card> {
        let strings = LanguageRegistry::get().strings_for_locale(locale);
        let mut data = self.load(user_id).await?;

        let history = std::mem::take(&mut data.translation_history);
        data.translation_history = self.history.record_and_get(history, translation.clone());
        self.save(user_id, data).await?;

        Ok(result_card(translation, strings))
    }

    pub async fn handle_settings_update(&self, user_id: &str, state: &str) -> Result<Vec<String>> {
        let mut data = self.load(user_id).await?;
        apply_settings(&mut data, state);
        let languages = data.languages.clone().unwrap_or_default();
        self.save(user_id, data).await?;

        info!("Updated languages for {}: {}", user_id, languages.join(","));
        Ok(languages)
    }

    async fn translate_query(
        &self,
        text: &str,
        languages: &[Language],
        strings: &LanguageStrings,
    ) -> QueryResponse {
        let outcomes = match self.translator.translate(text, languages, None).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!("Failed to get translations ({}): {}", e.kind(), e);
                return message(strings.error_translation);
            }
        };

        if !outcomes.iter().any(|slot| slot.is_success()) {
            error!("Every target language failed for this query");
            return message(strings.error_translation);
        }

        let mut cards = Vec::with_capacity(outcomes.len());
        for slot in outcomes {
            match slot.outcome {
                Ok(translation) if translation.is_same_language() => {}
                Ok(translation) => cards.push(result_card(translation, strings)),
                Err(e) => warn!(
                    "Omitting {} from results ({}): {}",
                    slot.target_language,
                    e.kind(),
                    e
                ),
            }
        }

        QueryResponse::Results { cards }
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

/// Replace the user's languages with the supported codes of a comma-separated
/// list, or the defaults when none is supported.
fn apply_settings(data: &mut UserData, state: &str) {
    let languages = Language::from_preferences(state.split(','));
    data.languages = Some(languages.iter().map(|l| l.code().to_string()).collect());
}

/// The user's languages, re-validated since sessions may predate catalog changes.
fn translation_languages(data: &UserData) -> Vec<Language> {
    match &data.languages {
        Some(codes) => Language::from_preferences(codes.iter().map(String::as_str)),
        None => Language::defaults(),
    }
}

fn configuration_response(languages: &[Language]) -> QueryResponse {
    QueryResponse::Configuration {
        languages: languages.iter().map(|l| l.code().to_string()).collect(),
    }
}

pub(crate) fn message(text: &str) -> QueryResponse {
    QueryResponse::Message {
        text: text.to_string(),
    }
}

/// Display name for a language code; unknown codes are shown as-is.
fn language_name(code: &str) -> String {
    LanguageRegistry::get()
        .get_by_code(code)
        .map(|config| config.name.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn card_body(translation: &TranslationResult, strings: &LanguageStrings) -> String {
    format!(
        r#"<div style="font-size:1.6rem;font-weight:600;">{translated}</div>
<div style="margin-top:1.4rem;"><span style="text-decoration:underline;">{label} ({from})</span><br/>{original}</div>"#,
        translated = escape(translation.translated_text.as_str()),
        label = escape(strings.original_label),
        from = escape(language_name(&translation.source_language)),
        original = escape(translation.source_text.as_str()),
    )
}

/// Card for a live result: subtitled with the target language.
fn result_card(translation: TranslationResult, strings: &LanguageStrings) -> Card {
    Card {
        title: translation.translated_text.clone(),
        subtitle: language_name(&translation.target_language),
        body: card_body(&translation, strings),
        image_url: None,
        value: Some(translation),
    }
}

/// Card for a history entry: subtitled with the source text.
fn history_card(entry: &HistoryEntry, strings: &LanguageStrings) -> Card {
    let translation = entry.translation.clone();
    Card {
        title: translation.translated_text.clone(),
        subtitle: translation.source_text.clone(),
        body: card_body(&translation, strings),
        image_url: None,
        value: Some(translation),
    }
}

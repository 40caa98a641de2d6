//! Fan one text out to several target languages.
//!
//! Every target gets its own slot in the output, in the order the targets were
//! supplied. A target whose call fails carries its error in its slot; the other
//! targets are unaffected. Only systemic failures (no usable credential, an
//! invalid request) fail the whole call.

use crate::error::TranslatorError;
use crate::i18n::Language;
use crate::translation::{Translate, TranslationResult};
use futures::future::join_all;
use tracing::{debug, warn};

/// Outcome of one target language in a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub target_language: Language,
    pub outcome: Result<TranslationResult, TranslatorError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct FanOutTranslator<T> {
    client: T,
}

impl<T: Translate> FanOutTranslator<T> {
    pub fn new(client: T) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &T {
        &self.client
    }

    /// Translate `text` into every language of `target_languages` concurrently.
    ///
    /// Duplicate targets are collapsed to their first occurrence. All calls are
    /// issued before any of them is awaited, and results are returned in input
    /// order regardless of completion order.
    pub async fn translate(
        &self,
        text: &str,
        target_languages: &[Language],
        source_language: Option<&str>,
    ) -> Result<Vec<TargetOutcome>, TranslatorError> {
        if text.trim().is_empty() {
            return Err(TranslatorError::InvalidRequest(
                "text must not be empty".to_string(),
            ));
        }

        let mut targets: Vec<Language> = Vec::with_capacity(target_languages.len());
        for language in target_languages {
            if !targets.contains(language) {
                targets.push(*language);
            }
        }
        if targets.is_empty() {
            return Err(TranslatorError::InvalidRequest(
                "at least one target language is required".to_string(),
            ));
        }

        // Authorize once up front so a credential failure is reported once
        self.client.ensure_ready().await?;

        debug!("Fanning out translation to {} languages", targets.len());

        let calls = targets.iter().map(|language| async move {
            TargetOutcome {
                target_language: *language,
                outcome: self
                    .client
                    .translate_one(text, language.code(), source_language)
                    .await,
            }
        });
        let outcomes = join_all(calls).await;

        // The token can still lapse between the up-front check and a call
        if let Some(systemic) = outcomes
            .iter()
            .filter_map(|slot| slot.outcome.as_ref().err())
            .find(|error| error.is_systemic())
        {
            return Err(systemic.clone());
        }

        let failed = outcomes.iter().filter(|slot| !slot.is_success()).count();
        if failed > 0 {
            warn!(
                "{} of {} target languages failed to translate",
                failed,
                outcomes.len()
            );
        }

        Ok(outcomes)
    }
}

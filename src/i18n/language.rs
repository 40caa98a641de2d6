//! Language type: a language code validated against the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A supported language.
///
/// Only constructible from a code present in the registry, so a `Language`
/// handed to the translator is always one the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const FRENCH: Language = Language { code: "fr" };

    /// Create a Language from a service language code.
    ///
    /// # Example
    /// ```ignore
    /// let serbian = Language::from_code("sr-Latn")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unsupported language code: '{}'", code),
        }
    }

    /// The languages offered when a user has no preference recorded.
    pub fn defaults() -> Vec<Language> {
        LanguageRegistry::get()
            .defaults()
            .into_iter()
            .map(Language::from)
            .collect()
    }

    /// Validate a preference list, falling back to the defaults when none of
    /// its codes is supported.
    pub fn from_preferences<'a, I>(codes: I) -> Vec<Language>
    where
        I: IntoIterator<Item = &'a str>,
    {
        LanguageRegistry::get()
            .filter_supported(codes)
            .into_iter()
            .map(Language::from)
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Never for a `Language` built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}

impl From<&LanguageConfig> for Language {
    fn from(config: &LanguageConfig) -> Self {
        Language { code: config.code }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

//! Internationalization (i18n): the supported-language catalog and the bot's
//! localized strings.
//!
//! - `registry`: single source of truth for the languages the translation
//!   service accepts, and the default subset
//! - `language`: validated `Language` handle used by the translator
//! - `strings`: localized UI strings with English fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use translator_bot::i18n::{Language, LanguageRegistry};
//!
//! let french = Language::from_code("fr")?;
//! let targets = Language::from_preferences("de,ja,xx".split(','));
//! let strings = LanguageRegistry::get().strings_for_locale(Some("fr-FR"));
//! ```

mod language;
mod registry;
mod strings;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry, DEFAULT_LANGUAGE_CODES};
pub use strings::LanguageStrings;

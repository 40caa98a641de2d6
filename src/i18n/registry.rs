//! Language registry: the fixed catalog of languages the translation service
//! supports.
//!
//! Initialized once with `OnceLock`. Language preference lists coming from
//! users are validated against it, and a small default subset is used when a
//! user has no preference recorded yet.

use crate::i18n::strings::{
    LanguageStrings, ENGLISH_STRINGS, FRENCH_STRINGS, GERMAN_STRINGS, ITALIAN_STRINGS,
    SPANISH_STRINGS,
};
use std::sync::OnceLock;

/// Languages offered before a user picks their own, in display order
pub const DEFAULT_LANGUAGE_CODES: [&str; 5] = ["en", "es", "fr", "it", "ar"];

/// Metadata for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Service language code (e.g., "en", "zh-CHS", "sr-Latn")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Name of the language in the language itself
    pub native_name: &'static str,

    /// Bot UI strings when this language is the user's locale
    pub strings: &'static LanguageStrings,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: supported_languages(),
        })
    }

    /// Exact, case-sensitive lookup: the service codes are case-sensitive
    /// (`zh-CHS`, `sr-Latn`).
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The default subset, in display order.
    pub fn defaults(&self) -> Vec<&LanguageConfig> {
        DEFAULT_LANGUAGE_CODES
            .iter()
            .filter_map(|code| self.get_by_code(code))
            .collect()
    }

    /// Keep the supported codes of an externally supplied preference list, in
    /// order and without duplicates. Falls back to the defaults when nothing
    /// usable remains.
    pub fn filter_supported<'a, I>(&self, codes: I) -> Vec<&LanguageConfig>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut kept: Vec<&LanguageConfig> = Vec::new();
        for code in codes {
            if let Some(config) = self.get_by_code(code.trim()) {
                if !kept.iter().any(|k| k.code == config.code) {
                    kept.push(config);
                }
            }
        }

        if kept.is_empty() {
            self.defaults()
        } else {
            kept
        }
    }

    /// UI strings for a locale such as `fr`, `fr-FR` or `es_MX`, falling back
    /// to English.
    pub fn strings_for_locale(&self, locale: Option<&str>) -> &'static LanguageStrings {
        let Some(locale) = locale else {
            return &ENGLISH_STRINGS;
        };

        let primary = locale.split(['-', '_']).next().unwrap_or(locale);
        self.get_by_code(locale)
            .or_else(|| self.get_by_code(&primary.to_lowercase()))
            .map(|config| config.strings)
            .unwrap_or(&ENGLISH_STRINGS)
    }
}

fn lang(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageConfig {
    let strings = match code {
        "es" => &SPANISH_STRINGS,
        "fr" => &FRENCH_STRINGS,
        "it" => &ITALIAN_STRINGS,
        "de" => &GERMAN_STRINGS,
        _ => &ENGLISH_STRINGS,
    };

    LanguageConfig {
        code,
        name,
        native_name,
        strings,
    }
}

/// Every language the translation service accepts.
fn supported_languages() -> Vec<LanguageConfig> {
    vec![
        lang("af", "Afrikaans", "Afrikaans"),
        lang("ar", "Arabic", "العربية"),
        lang("bn", "Bangla", "বাংলা"),
        lang("bs-Latn", "Bosnian (Latin)", "bosanski"),
        lang("bg", "Bulgarian", "български"),
        lang("ca", "Catalan", "català"),
        lang("zh-CHS", "Chinese Simplified", "简体中文"),
        lang("zh-CHT", "Chinese Traditional", "繁體中文"),
        lang("hr", "Croatian", "hrvatski"),
        lang("cs", "Czech", "čeština"),
        lang("da", "Danish", "dansk"),
        lang("nl", "Dutch", "Nederlands"),
        lang("en", "English", "English"),
        lang("et", "Estonian", "eesti"),
        lang("fj", "Fijian", "Na Vosa Vakaviti"),
        lang("fil", "Filipino", "Filipino"),
        lang("fi", "Finnish", "suomi"),
        lang("fr", "French", "français"),
        lang("de", "German", "Deutsch"),
        lang("el", "Greek", "Ελληνικά"),
        lang("ht", "Haitian Creole", "Kreyòl ayisyen"),
        lang("he", "Hebrew", "עברית"),
        lang("hi", "Hindi", "हिन्दी"),
        lang("hu", "Hungarian", "magyar"),
        lang("id", "Indonesian", "Indonesia"),
        lang("it", "Italian", "italiano"),
        lang("ja", "Japanese", "日本語"),
        lang("tlh", "Klingon", "tlhIngan Hol"),
        lang("ko", "Korean", "한국어"),
        lang("lv", "Latvian", "latviešu"),
        lang("lt", "Lithuanian", "lietuvių"),
        lang("mg", "Malagasy", "Malagasy"),
        lang("ms", "Malay", "Melayu"),
        lang("mt", "Maltese", "Malti"),
        lang("no", "Norwegian", "norsk"),
        lang("fa", "Persian", "فارسی"),
        lang("pl", "Polish", "polski"),
        lang("pt", "Portuguese", "português"),
        lang("ro", "Romanian", "română"),
        lang("ru", "Russian", "русский"),
        lang("sm", "Samoan", "Gagana Samoa"),
        lang("sr-Cyrl", "Serbian (Cyrillic)", "српски"),
        lang("sr-Latn", "Serbian (Latin)", "srpski"),
        lang("sk", "Slovak", "slovenčina"),
        lang("sl", "Slovenian", "slovenščina"),
        lang("es", "Spanish", "español"),
        lang("sv", "Swedish", "svenska"),
        lang("ty", "Tahitian", "Reo Tahiti"),
        lang("th", "Thai", "ไทย"),
        lang("to", "Tongan", "lea fakatonga"),
        lang("tr", "Turkish", "Türkçe"),
        lang("uk", "Ukrainian", "українська"),
        lang("ur", "Urdu", "اردو"),
        lang("vi", "Vietnamese", "Tiếng Việt"),
        lang("cy", "Welsh", "Cymraeg"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_catalog_has_all_service_languages() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.list_all().len(), 55);
    }

    #[test]
    fn test_catalog_codes_are_unique() {
        let mut codes: Vec<_> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|lang| lang.code)
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 55);
    }

    #[test]
    fn test_get_by_code_is_case_sensitive() {
        let registry = LanguageRegistry::get();

        let config = registry.get_by_code("zh-CHS").expect("Should exist");
        assert_eq!(config.name, "Chinese Simplified");
        assert!(registry.get_by_code("zh-chs").is_none());
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("xx").is_none());
        assert!(!registry.is_supported(""));
    }

    #[test]
    fn test_defaults_in_display_order() {
        let codes: Vec<_> = LanguageRegistry::get()
            .defaults()
            .iter()
            .map(|lang| lang.code)
            .collect();
        assert_eq!(codes, vec!["en", "es", "fr", "it", "ar"]);
    }

    // ==================== Filtering Tests ====================

    #[test]
    fn test_filter_supported_keeps_order_and_drops_unknown() {
        let registry = LanguageRegistry::get();
        let kept: Vec<_> = registry
            .filter_supported(["de", "xx", "ja", " fr ", "de"])
            .iter()
            .map(|lang| lang.code)
            .collect();

        assert_eq!(kept, vec!["de", "ja", "fr"]);
    }

    #[test]
    fn test_filter_supported_falls_back_to_defaults() {
        let registry = LanguageRegistry::get();
        let kept: Vec<_> = registry
            .filter_supported(["klingon", ""])
            .iter()
            .map(|lang| lang.code)
            .collect();

        assert_eq!(kept, DEFAULT_LANGUAGE_CODES.to_vec());
    }

    // ==================== Locale Strings Tests ====================

    #[test]
    fn test_strings_for_locale() {
        let registry = LanguageRegistry::get();

        assert_eq!(
            registry.strings_for_locale(Some("fr-FR")).original_label,
            "Texte d'origine"
        );
        assert_eq!(
            registry.strings_for_locale(Some("es_MX")).error_notext,
            SPANISH_STRINGS.error_notext
        );
        assert_eq!(
            registry.strings_for_locale(Some("ja")).error_notext,
            ENGLISH_STRINGS.error_notext
        );
        assert_eq!(
            registry.strings_for_locale(None).error_notext,
            ENGLISH_STRINGS.error_notext
        );
    }
}

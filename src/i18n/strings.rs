/// Localized user-facing strings of the bot.
///
/// Strings are plain text; card builders HTML-escape them where needed.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Shown instead of results when the whole translation request failed
    pub error_translation: &'static str,

    /// Shown when there is no text to translate and no history to replay
    pub error_notext: &'static str,

    /// Label above the source text on a translation card
    pub original_label: &'static str,

    /// Shown when a news search query is empty
    pub search_notext: &'static str,

    /// Shown instead of results when the news search failed
    pub error_search: &'static str,
}

// ==================== English Strings ====================

/// English strings, also the fallback for every locale without its own set
pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    error_translation: "Sorry, something went wrong while translating. Please try again.",
    error_notext: "Type the text you want to translate.",
    original_label: "Original",
    search_notext: "Type what you want to search the news for.",
    error_search: "Sorry, the news search failed. Please try again.",
};

// ==================== Spanish Strings ====================

pub const SPANISH_STRINGS: LanguageStrings = LanguageStrings {
    error_translation: "Lo sentimos, algo salió mal al traducir. Inténtalo de nuevo.",
    error_notext: "Escribe el texto que quieres traducir.",
    original_label: "Original",
    search_notext: "Escribe lo que quieres buscar en las noticias.",
    error_search: "Lo sentimos, la búsqueda de noticias falló. Inténtalo de nuevo.",
};

// ==================== French Strings ====================

pub const FRENCH_STRINGS: LanguageStrings = LanguageStrings {
    error_translation: "Désolé, une erreur s'est produite pendant la traduction. Veuillez réessayer.",
    error_notext: "Saisissez le texte à traduire.",
    original_label: "Texte d'origine",
    search_notext: "Saisissez ce que vous voulez rechercher dans l'actualité.",
    error_search: "Désolé, la recherche d'actualités a échoué. Veuillez réessayer.",
};

// ==================== Italian Strings ====================

pub const ITALIAN_STRINGS: LanguageStrings = LanguageStrings {
    error_translation: "Si è verificato un errore durante la traduzione. Riprova.",
    error_notext: "Digita il testo da tradurre.",
    original_label: "Originale",
    search_notext: "Digita cosa vuoi cercare nelle notizie.",
    error_search: "La ricerca di notizie non è riuscita. Riprova.",
};

// ==================== German Strings ====================

pub const GERMAN_STRINGS: LanguageStrings = LanguageStrings {
    error_translation: "Beim Übersetzen ist ein Fehler aufgetreten. Bitte versuche es erneut.",
    error_notext: "Gib den Text ein, den du übersetzen möchtest.",
    original_label: "Original",
    search_notext: "Gib ein, wonach du in den Nachrichten suchen möchtest.",
    error_search: "Die Nachrichtensuche ist fehlgeschlagen. Bitte versuche es erneut.",
};

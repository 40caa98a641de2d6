use thiserror::Error;

/// Failures surfaced by the translation core.
///
/// `Transport`, `Upstream` and `Protocol` are the per-call failure kinds of a
/// single translation request and never overlap: the network failed, the
/// service answered with a non-success status, or the service answered with a
/// body that could not be parsed. `Credential` is systemic and affects every
/// target of a fan-out identically.
///
/// The type is `Clone` so that one credential exchange result can be handed to
/// every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslatorError {
    /// The bearer token exchange failed (network error, timeout or non-200 status)
    #[error("credential exchange failed: {0}")]
    Credential(String),

    /// Network failure or timeout while calling the translation endpoint
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status from the translation endpoint
    #[error("translation service error ({status}): {reason}")]
    Upstream { status: u16, reason: String },

    /// Response body could not be parsed into the expected structure
    #[error("malformed translation response: {0}")]
    Protocol(String),

    /// Caller violated a precondition (empty text, no target languages)
    #[error("invalid translation request: {0}")]
    InvalidRequest(String),
}

impl TranslatorError {
    /// Short stable label, used in logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslatorError::Credential(_) => "credential",
            TranslatorError::Transport(_) => "transport",
            TranslatorError::Upstream { .. } => "upstream",
            TranslatorError::Protocol(_) => "protocol",
            TranslatorError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Whether this failure affects every target of a fan-out identically.
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            TranslatorError::Credential(_) | TranslatorError::InvalidRequest(_)
        )
    }
}

//! Translator bot: fans user text out to a translation service in several
//! languages at once and keeps a short per-user history of picked results.
//! A companion news search extension shares its sessions and HTTP API.
//!
//! - `credential`: single-flight bearer token cache
//! - `translation`: single-target translation client
//! - `fan_out`: concurrent multi-target translation with per-target outcomes
//! - `history`: bounded, deduplicated most-recent-first history
//! - `bot` / `server`: query handling and its HTTP API
//! - `search` / `news_bot`: news search client and its query handling

pub mod bot;
pub mod config;
pub mod credential;
pub mod error;
pub mod fan_out;
pub mod history;
pub mod i18n;
pub mod metrics;
pub mod news_bot;
pub mod search;
pub mod security;
pub mod server;
pub mod session;
pub mod translation;

pub use error::TranslatorError;
pub use fan_out::{FanOutTranslator, TargetOutcome};
pub use history::{HistoryEntry, HistoryStore};
pub use translation::{Translate, TranslationClient, TranslationResult};

//! One-shot translation against the live service.
//!
//! Usage:
//!   cargo run --bin translate -- "bonjour tout le monde"           # default languages
//!   cargo run --bin translate -- "bonjour tout le monde" en,de,ja  # chosen languages
//!
//! Required environment variables:
//! - TRANSLATOR_ACCESS_KEY
//!
//! Optional:
//! - TRANSLATOR_TOKEN_URL, TRANSLATOR_API_URL
//! - REQUEST_TIMEOUT_SECS (defaults to 10)

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::info;
use translator_bot::config::Config;
use translator_bot::credential::CredentialCache;
use translator_bot::i18n::Language;
use translator_bot::{FanOutTranslator, TranslationClient};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translator_bot=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(text) = args.first() else {
        bail!("Usage: translate <text> [lang,lang,...]");
    };

    let languages = match args.get(1) {
        Some(list) => Language::from_preferences(list.split(',')),
        None => Language::defaults(),
    };

    let config = Config::from_env()?;
    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let credentials = Arc::new(CredentialCache::from_config(http.clone(), &config));
    let translator =
        FanOutTranslator::new(TranslationClient::from_config(http, credentials, &config));

    info!(
        "Translating into {}",
        languages
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let outcomes = translator.translate(text, &languages, None).await?;

    for slot in outcomes {
        match slot.outcome {
            Ok(result) => println!(
                "{} -> {} ({}): {}",
                result.source_language,
                result.target_language,
                slot.target_language.name(),
                result.translated_text
            ),
            Err(e) => println!("{} ({}): failed: {}", slot.target_language, e.kind(), e),
        }
    }

    Ok(())
}

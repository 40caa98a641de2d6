//! HTTP API in front of the bot.
//!
//! The chat connector posts compose-extension queries, item selections and
//! settings updates here; responses are the cards or messages to render.
//! News search routes live under `/api/search` and answer 404 when search is
//! not configured.

use crate::bot::{Card, QueryRequest, QueryResponse, TranslatorBot};
use crate::config::Config;
use crate::credential::CredentialCache;
use crate::history::HistoryStore;
use crate::metrics::{MetricsReport, TranslationMetrics};
use crate::news_bot::NewsSearchBot;
use crate::search::SearchClient;
use crate::security::{is_authorized, API_KEY_HEADER};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::translation::{TranslationClient, TranslationResult};
use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub struct AppState {
    pub bot: TranslatorBot,
    pub search: Option<NewsSearchBot>,
    pub api_key: Option<String>,
}

impl AppState {
    /// Wire the translator core, the session store and the bot from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

        let credentials = Arc::new(CredentialCache::from_config(http.clone(), config));
        let client = TranslationClient::from_config(http.clone(), credentials, config);

        let bot = TranslatorBot::new(Arc::new(client), Arc::clone(&sessions))
            .with_history(HistoryStore::new(config.max_translation_history))
            .with_configuration_via_query(config.allow_configuration_via_query);

        let search = match SearchClient::from_config(http, config) {
            Some(client) => Some(NewsSearchBot::new(
                Arc::new(client),
                sessions,
                &config.app_base_uri,
            )),
            None => {
                info!("SEARCH_ACCESS_KEY not set, news search disabled");
                None
            }
        };

        Ok(Self {
            bot,
            search,
            api_key: config.api_key.clone(),
        })
    }
}

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub user_id: String,
    #[serde(flatten)]
    pub query: QueryRequest,
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
    pub user_id: String,
    pub translation: TranslationResult,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsBody {
    pub user_id: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub languages: Vec<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

fn require_user(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }
    Ok(())
}

fn require_search(state: &AppState) -> Result<&NewsSearchBot, ApiError> {
    state
        .search
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("news search is not configured".to_string()))
}

// ==================== Router ====================

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/query", post(handle_query))
        .route("/api/select", post(handle_select))
        .route("/api/settings", post(handle_settings))
        .route("/api/search/query", post(handle_search_query))
        .route("/api/search/settings-url", get(handle_search_settings_url))
        .route("/api/search/settings", post(handle_search_settings))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if !is_authorized(state.api_key.as_deref(), presented) {
        warn!("Rejected request to {} with missing or invalid API key", request.uri().path());
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "invalid API key".to_string(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}

// ==================== Handlers ====================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics() -> Json<MetricsReport> {
    Json(TranslationMetrics::global().report())
}

async fn handle_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> Result<Json<QueryResponse>, ApiError> {
    require_user(&body.user_id)?;
    let response = state.bot.handle_query(&body.user_id, body.query).await?;
    Ok(Json(response))
}

async fn handle_select(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectBody>,
) -> Result<Json<Card>, ApiError> {
    require_user(&body.user_id)?;
    let card = state
        .bot
        .handle_select_item(&body.user_id, body.translation, body.locale.as_deref())
        .await?;
    Ok(Json(card))
}

async fn handle_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingsBody>,
) -> Result<Json<SettingsResponse>, ApiError> {
    require_user(&body.user_id)?;
    let languages = state
        .bot
        .handle_settings_update(&body.user_id, &body.state)
        .await?;
    Ok(Json(SettingsResponse { languages }))
}

async fn handle_search_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> Result<Json<QueryResponse>, ApiError> {
    let search = require_search(&state)?;
    require_user(&body.user_id)?;
    let response = search.handle_query(&body.user_id, body.query).await?;
    Ok(Json(response))
}

async fn handle_search_settings_url(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QueryResponse>, ApiError> {
    let search = require_search(&state)?;
    Ok(Json(search.settings_url()))
}

async fn handle_search_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingsBody>,
) -> Result<Json<QueryResponse>, ApiError> {
    let search = require_search(&state)?;
    require_user(&body.user_id)?;
    let response = search
        .handle_settings_update(&body.user_id, &body.state)
        .await?;
    Ok(Json(response))
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use log::{debug, info, warn};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::error::{ApiError, FailurePolicy};
use crate::youtube::TranscriptProvider;
use crate::{TranscriptResponse, language_preference, output, resolve_video_id};

/// Resolved server settings (config file merged with CLI flags)
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub default_lang: String,
    pub fallback_langs: Vec<String>,
    pub allow_cross_origin: bool,
    pub failure_policy: FailurePolicy,
}

/// Read-only state shared by every request
pub struct AppState {
    pub provider: Arc<dyn TranscriptProvider>,
    pub default_lang: String,
    pub fallback_langs: Vec<String>,
    pub failure_policy: FailurePolicy,
}

impl AppState {
    pub fn new(settings: &Settings, provider: Arc<dyn TranscriptProvider>) -> Self {
        Self {
            provider,
            default_lang: settings.default_lang.clone(),
            fallback_langs: settings.fallback_langs.clone(),
            failure_policy: settings.failure_policy,
        }
    }
}

/// Query parameters of a transcript request. A repeated key keeps its first value.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TranscriptQuery {
    pub url: Option<String>,
    pub video_id: Option<String>,
    pub lang: Option<String>,
}

impl TranscriptQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "url" => &mut query.url,
                "video_id" => &mut query.video_id,
                "lang" => &mut query.lang,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// `url` wins unless empty, then `video_id`
    fn input(self) -> Option<String> {
        self.url
            .filter(|u| !u.is_empty())
            .or(self.video_id.filter(|v| !v.is_empty()))
    }
}

/// Build the router: every GET path serves transcripts
pub fn router(state: Arc<AppState>, allow_cross_origin: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(transcript))
        .route("/{*path}", get(transcript))
        .with_state(state);

    if allow_cross_origin {
        app = app.layer(cors_layer());
    }

    app
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any())
}

async fn transcript(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let mut params = TranscriptQuery::from_pairs(pairs);
    let lang = params.lang.take().unwrap_or_else(|| state.default_lang.clone());
    let input = params.input().ok_or(ApiError::MissingParameter)?;

    let video_id = resolve_video_id(&input);
    let languages = language_preference(&lang, &state.fallback_langs);
    debug!("Fetching transcript for {video_id} (languages: {languages:?})");

    match state.provider.fetch_transcript(&video_id, &languages).await {
        Ok(segments) => {
            debug!("Transcript for {video_id}: {} segments", segments.len());
            Ok(Json(output::build_response(video_id, segments)))
        }
        Err(e) => {
            debug!("Transcript for {video_id} failed: {e}");
            Err(ApiError::from_provider(&e, state.failure_policy))
        }
    }
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(settings: Settings, provider: Arc<dyn TranscriptProvider>) -> eyre::Result<()> {
    let state = Arc::new(AppState::new(&settings, provider));
    let app = router(state, settings.allow_cross_origin);

    let listener = tokio::net::TcpListener::bind(settings.listen).await?;
    info!(
        "Listening on {} (cors: {}, failure policy: {:?})",
        listener.local_addr()?,
        settings.allow_cross_origin,
        settings.failure_policy
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutting down");
}

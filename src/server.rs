//! HTTP server.
//!
//! | Route | Method | Response |
//! |-------|--------|----------|
//! | `/`, `/about`, `/portfolio`, `/contact` | GET | rendered page |
//! | `/api/contact` | POST | `{"success":true}` or 400 `{"error":"All fields required"}` |
//! | `/api/theme` | GET | `{"theme":"dark","isDark":true}` |
//! | `/api/theme/toggle` | POST | the visitor's new theme, same shape, plus `Set-Cookie` |
//! | `/api/hero/events` | GET | `hero` server-sent events, one per snapshot |
//! | `/images/*`, `/assets/*` | GET | files from the public directory |
//!
//! Anything else gets the 404 page.
//!
//! The theme is per visitor. A cookie named after `theme.storage_key`
//! carries the visitor's choice; without it pages use the site default from
//! the shared [`ThemePreference`]. Requests never write the preference store.
//!
//! Every hero event stream mounts its own [`AnimationSequencer`]: the first
//! event is the `preloading` snapshot, then one event per published change.
//! Closing the connection drops the stream and with it the sequencer, which
//! cancels its pending timers.

use crate::config::SiteConfig;
use crate::contact::{self, ContactReply};
use crate::sequencer::{AnimationSequencer, AssetLoader, Clock, FileAssetLoader, SequencerSnapshot, TokioClock};
use crate::site::{self, PageContext};
use crate::theme::{self, SystemTheme, ThemeMode, ThemePreference};
use crate::types::Route;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use futures_util::stream::{self, Stream};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bind address {0:?}: {1}")]
    Bind(String, std::net::AddrParseError),
    #[error("startup task failed: {0}")]
    Startup(#[from] tokio::task::JoinError),
}

/// A visitor's theme cookie lasts a year.
const THEME_COOKIE_MAX_AGE: u32 = 365 * 24 * 60 * 60;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub theme: Arc<ThemePreference>,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(config: SiteConfig, theme: ThemePreference, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            theme: Arc::new(theme),
            public_dir: public_dir.into(),
        }
    }

    /// The visitor's cookie if it names a theme, else the site default.
    fn visitor_dark(&self, headers: &HeaderMap) -> bool {
        visitor_theme(headers, &self.config.theme.storage_key)
            .map_or_else(|| self.theme.read(), ThemeMode::is_dark)
    }

    fn page_context(&self, headers: &HeaderMap) -> PageContext<'_> {
        PageContext::new(&self.config, self.visitor_dark(headers))
    }
}

fn visitor_theme(headers: &HeaderMap, key: &str) -> Option<ThemeMode> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == key)
        .and_then(|(_, value)| ThemeMode::from_stored(value.trim()))
}

fn theme_cookie(key: &str, mode: ThemeMode) -> String {
    format!(
        "{key}={}; Path=/; Max-Age={THEME_COOKIE_MAX_AGE}; SameSite=Lax",
        mode.as_str()
    )
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new();
    for route in Route::ALL {
        router = router.route(
            route.path(),
            get(move |State(state): State<AppState>, headers: HeaderMap| async move {
                Html(site::render(route, &state.page_context(&headers)).into_string())
            }),
        );
    }

    router
        .route(site::CONTACT_PATH, post(submit_contact))
        .route("/api/theme", get(theme_state))
        .route(site::THEME_TOGGLE_PATH, post(toggle_theme))
        .route(site::HERO_EVENTS_PATH, get(hero_events))
        .nest_service("/images", ServeDir::new(state.public_dir.join("images")))
        .nest_service("/assets", ServeDir::new(state.public_dir.join("assets")))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let page = site::render_not_found(&state.page_context(&headers));
    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}

async fn submit_contact(body: Bytes) -> (StatusCode, Json<ContactReply>) {
    let reply = contact::submit(&body);
    let status = StatusCode::from_u16(reply.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(reply))
}

#[derive(Debug, Serialize)]
struct ThemeResponse {
    theme: &'static str,
    #[serde(rename = "isDark")]
    is_dark: bool,
}

impl ThemeResponse {
    fn new(is_dark: bool) -> Self {
        Self {
            theme: ThemeMode::from_dark(is_dark).as_str(),
            is_dark,
        }
    }
}

async fn theme_state(State(state): State<AppState>, headers: HeaderMap) -> Json<ThemeResponse> {
    Json(ThemeResponse::new(state.visitor_dark(&headers)))
}

/// Flips this visitor's theme only. The shared preference is left alone.
async fn toggle_theme(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let is_dark = !state.visitor_dark(&headers);
    let mode = ThemeMode::from_dark(is_dark);
    tracing::debug!(theme = %mode, "visitor toggled theme");
    (
        [(header::SET_COOKIE, theme_cookie(&state.config.theme.storage_key, mode))],
        Json(ThemeResponse::new(is_dark)),
    )
}

async fn hero_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut sequencer = AnimationSequencer::new(
        state.config.hero.clone(),
        TokioClock,
        FileAssetLoader::new(&state.public_dir),
    );
    sequencer.start();
    let updates = sequencer.subscribe();
    tracing::debug!("hero stream opened");

    Sse::new(hero_stream(sequencer, updates)).keep_alive(KeepAlive::default())
}

/// One event for the current snapshot, then one per change. Owns the
/// sequencer so it lives exactly as long as the connection.
fn hero_stream<C: Clock, L: AssetLoader>(
    sequencer: AnimationSequencer<C, L>,
    updates: watch::Receiver<SequencerSnapshot>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(
        (sequencer, updates, true),
        |(sequencer, mut updates, first)| async move {
            if !first && updates.changed().await.is_err() {
                return None;
            }
            let snapshot = updates.borrow_and_update().clone();
            match Event::default().event("hero").json_data(&snapshot) {
                Ok(event) => Some((Ok(event), (sequencer, updates, false))),
                Err(e) => {
                    tracing::warn!(error = %e, "could not encode hero snapshot");
                    None
                }
            }
        },
    )
}

/// Bind, follow the desktop theme, and serve until Ctrl-C.
pub async fn serve(config: SiteConfig, site_dir: &Path, bind: Option<String>) -> Result<(), ServerError> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind.parse().map_err(|e| ServerError::Bind(bind.clone(), e))?;

    // Reading the store and the desktop setting blocks.
    let platform = SystemTheme::new(Duration::from_secs(config.theme.platform_poll_secs));
    let theme_config = config.theme.clone();
    let store_dir = site_dir.to_path_buf();
    let preference =
        tokio::task::spawn_blocking(move || theme::open(&theme_config, &store_dir, &platform)).await?;
    if preference.attach_platform(&platform) {
        tracing::debug!("following desktop theme changes");
    }

    let public_dir = config.public_dir(site_dir);
    if !public_dir.is_dir() {
        tracing::warn!(path = %public_dir.display(), "public directory missing, images will 404");
    }
    let state = AppState::new(config, preference, public_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "serving");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

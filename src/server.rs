//! HTTP host for the post-status hook and the admin settings page.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::admin::nonce::constant_time_eq;
use crate::admin::{AdminError, AdminFormHandler, INVALID_REQUEST};
use crate::notifier::{PostEvents, PostStatusTransition};
use crate::shutdown::shutdown_signal;

/// Header carrying the post-status hook's shared secret
pub const HOOK_SECRET_HEADER: &str = "x-hook-secret";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<PostEvents>,
    pub admin: Arc<AdminFormHandler>,
    /// When set, hook calls without a matching `X-Hook-Secret` are refused
    pub hook_secret: Option<Arc<str>>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/hooks/post-status", post(post_status_hook))
        .route("/admin", get(admin_page))
        .route("/admin/settings", post(store_settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until SIGINT/SIGTERM.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let address = listener.local_addr()?;
    info!("Listening on {}", address);
    if state.hook_secret.is_none() && !address.ip().is_loopback() {
        warn!("Post-status hook is reachable off-loopback without a hook secret");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Runs subscribers before answering, so a 202 means the workflow finished.
async fn post_status_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(transition): Json<PostStatusTransition>,
) -> StatusCode {
    if let Some(secret) = &state.hook_secret {
        let presented = headers
            .get(HOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !constant_time_eq(secret, presented) {
            warn!("Rejected post-status hook without a valid hook secret");
            return StatusCode::UNAUTHORIZED;
        }
    }

    state.events.emit(&transition).await;
    StatusCode::ACCEPTED
}

async fn admin_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    match state.admin.page().await {
        Ok(page) => Ok(Html(page.render_html())),
        Err(e) => {
            error!("Could not build admin page: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn store_settings(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> (StatusCode, &'static str) {
    let pairs = fields.iter().map(|(k, v)| (k.as_str(), v.as_str()));

    match state.admin.store(pairs).await {
        Ok(saved) => (StatusCode::OK, saved),
        Err(AdminError::InvalidRequest) => (StatusCode::FORBIDDEN, INVALID_REQUEST),
        Err(e) => {
            error!("Could not save settings: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Settings could not be saved")
        }
    }
}

//! Login flow handlers
//!
//! The flow is stateless: each route acts only on its own request.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::render;

use super::AppState;

/// Link to the login route
pub async fn root() -> Html<&'static str> {
    Html(r#"<a href="/login/github/">LOGIN</a>"#)
}

/// Redirect the browser to GitHub's consent page
pub async fn github_login(State(state): State<Arc<AppState>>) -> Response {
    let redirect_url = state.github.authorization_url();
    info!("[INFO] Redirecting to GitHub authorization for client {}", state.github.client_id());

    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, redirect_url)],
    )
        .into_response()
}

/// Send the bare login path to its canonical form with a trailing slash
pub async fn github_login_slash() -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, "/login/github/")],
    )
        .into_response()
}

/// Unmatched paths: anything under the login prefix starts the redirect,
/// everything else gets the login link.
pub async fn fallback(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    if uri.path().starts_with("/login/github/") {
        github_login(State(state)).await
    } else {
        root().await.into_response()
    }
}

/// OAuth callback query parameters
#[derive(Debug, Deserialize)]
pub struct GithubCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Exchange the code, fetch the profile and render it
pub async fn github_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GithubCallbackQuery>,
) -> Result<Response, (StatusCode, String)> {
    if let Some(error) = params.error {
        warn!(
            "[WARN] GitHub authorization denied: {} ({})",
            error,
            params.error_description.as_deref().unwrap_or("no description")
        );
        return Ok(render::unauthorized());
    }

    let code = match params.code {
        Some(code) if !code.is_empty() => code,
        _ => {
            warn!("[WARN] Callback received without an authorization code");
            return Ok(render::unauthorized());
        }
    };

    let access_token = state.github.exchange_code(&code).await.map_err(|e| {
        error!("[ERROR] Token exchange failed: {}", e);
        (StatusCode::BAD_GATEWAY, format!("Failed to exchange code: {}", e))
    })?;

    let profile = state.github.fetch_user(&access_token).await.map_err(|e| {
        error!("[ERROR] Profile fetch failed: {}", e);
        (StatusCode::BAD_GATEWAY, format!("Failed to fetch GitHub profile: {}", e))
    })?;
    debug!("GitHub profile: {}", profile);

    render::render_profile(&profile).map_err(|e| {
        error!("[ERROR] Profile rendering failed: {}", e);
        (StatusCode::BAD_GATEWAY, format!("Failed to render profile: {}", e))
    })
}

/// Landing page reached without a code; there is never a profile to show
pub async fn logged_in() -> Response {
    render::unauthorized()
}

//! GitHub login HTTP server
//!
//! Routes browser requests through the authorization-code flow:
//! login link, redirect to GitHub, callback, rendered profile.

pub mod handlers;

use crate::{GithubClient, Settings};
use axum::{routing::get, Router as AxumRouter};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct AppState {
    pub github: GithubClient,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self, crate::error::ConfigError> {
        let github = GithubClient::new(settings.credentials.clone(), settings.endpoints.clone())?;
        Ok(Self { github })
    }
}

/// Build the router with every login-flow route
///
/// - GET / - Login link
/// - GET /login/github/ - Redirect to GitHub for consent
/// - GET /login/github/callback - Exchange code, fetch and render profile
/// - GET /logged-in - Always unauthorized
///
/// `/login/github` redirects to `/login/github/`; other unmatched paths fall
/// through to the login link.
pub fn router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/", get(handlers::root))
        .route("/login/github", get(handlers::github_login_slash))
        .route("/login/github/", get(handlers::github_login))
        .route("/login/github/callback", get(handlers::github_callback))
        .route("/logged-in", get(handlers::logged_in))
        .fallback(handlers::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
///
/// # Errors
/// Returns error if the HTTP client cannot be built or the address cannot be bound
pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(&settings)?;
    let app = router(state);

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("[INFO] GitHub login server listening on {}", addr);
    info!("[INFO] Available endpoints:");
    info!("  GET    /                        - Login link");
    info!("  GET    /login/github/           - Redirect to GitHub");
    info!("  GET    /login/github/callback   - OAuth callback handler");
    info!("  GET    /logged-in               - Unauthenticated landing page");

    axum::serve(listener, app).await?;

    Ok(())
}

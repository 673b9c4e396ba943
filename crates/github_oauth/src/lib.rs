//! GitHub Login Service
//!
//! Minimal web server running the GitHub OAuth2 authorization-code flow.
//!
//! # Features
//! - Redirect to GitHub for user consent
//! - Code-for-token exchange and profile fetch
//! - Tab-indented JSON rendering of the user profile
//! - Upstream failures reported as 502 responses

pub mod auth;
pub mod config;
pub mod error;
pub mod render;
pub mod server;

pub use auth::GithubClient;
pub use config::{Credentials, GithubEndpoints, Settings};
pub use error::{ConfigError, OAuthError, Result};
pub use server::{router, start_server, AppState};

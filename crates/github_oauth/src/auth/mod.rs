//! GitHub OAuth2 authorization-code client

pub mod github;

pub use github::{GithubClient, TokenResponse};

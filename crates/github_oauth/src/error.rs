use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OAuthError>;

/// Startup configuration failures. Any of these keeps the server from starting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("env file not found: {0}")]
    EnvFileMissing(String),

    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("{0} not defined in .env file")]
    MissingVar(&'static str),

    #[error("invalid {name} URL '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failures while running the authorization-code exchange for one request.
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub returned {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("malformed token response: {0}")]
    MalformedTokenResponse(#[source] serde_json::Error),

    #[error("GitHub rejected the authorization code: {error} ({description})")]
    Provider { error: String, description: String },

    #[error("token response did not contain an access token")]
    MissingAccessToken,

    #[error("profile is not valid JSON: {0}")]
    InvalidProfileJson(#[source] serde_json::Error),
}

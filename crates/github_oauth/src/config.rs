//! Startup configuration
//!
//! Secrets come from the process environment, falling back to a local
//! `.env` file that must exist. Everything is loaded once and then handed to the server as an
//! immutable [`Settings`] value.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;
use url::Url;

use crate::error::ConfigError;

pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_USER_URL: &str = "https://api.github.com/user";
pub const CALLBACK_URI: &str = "http://localhost:3000/login/github/callback";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// OAuth app credentials registered with GitHub
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read `CLIENT_ID` and `CLIENT_SECRET` through `lookup`.
    /// An empty value counts as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        Ok(Self {
            client_id: required(CLIENT_ID_VAR)?,
            client_secret: required(CLIENT_SECRET_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Upstream GitHub locations
///
/// Production always uses [`GithubEndpoints::default`]; tests point these at
/// a mock server.
#[derive(Debug, Clone)]
pub struct GithubEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
    pub callback_uri: String,
}

impl Default for GithubEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            user_url: GITHUB_USER_URL.to_string(),
            callback_uri: CALLBACK_URI.to_string(),
        }
    }
}

impl GithubEndpoints {
    /// Check that every endpoint is an absolute URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("authorize", &self.authorize_url),
            ("token", &self.token_url),
            ("user", &self.user_url),
            ("callback", &self.callback_uri),
        ] {
            Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
                name,
                value: value.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Everything the server needs, loaded once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub endpoints: GithubEndpoints,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: GithubEndpoints::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Read `env_file`, then the credentials from the process environment
    /// with the file as fallback.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        Self::load_with(env_file, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::load`] with `env` standing in for the process
    /// environment. Variables found by `env` win over the file.
    pub fn load_with<F>(env_file: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_env_file(env_file)?;
        let credentials =
            Credentials::from_lookup(|key| env(key).or_else(|| file_vars.get(key).cloned()))?;

        let settings = Self::new(credentials);
        settings.endpoints.validate()?;
        Ok(settings)
    }

    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_endpoints(mut self, endpoints: GithubEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse the `KEY=VALUE` pairs of an env file.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_error = |source: dotenvy::Error| {
        if source.not_found() {
            ConfigError::EnvFileMissing(path.display().to_string())
        } else {
            ConfigError::EnvFile {
                path: path.display().to_string(),
                source,
            }
        }
    };

    let vars = dotenvy::from_path_iter(path)
        .map_err(env_file_error)?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(env_file_error)?;

    debug!("Loaded {} variables from {}", vars.len(), path.display());
    Ok(vars)
}

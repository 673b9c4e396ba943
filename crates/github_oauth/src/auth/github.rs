use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Credentials, GithubEndpoints};
use crate::error::{ConfigError, OAuthError, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Body of the code-for-token exchange
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Reply from the token endpoint
///
/// GitHub answers a bad or expired code with HTTP 200 and the `error`
/// fields set instead of a token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Turn the reply into the bearer token, or the reason there is none.
    pub fn into_access_token(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(OAuthError::Provider {
                error,
                description: self.error_description.unwrap_or_default(),
            });
        }

        match self.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(OAuthError::MissingAccessToken),
        }
    }
}

/// GitHub OAuth client for the authorization-code flow
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GithubClient {
    credentials: Credentials,
    endpoints: GithubEndpoints,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a new GitHub client
    pub fn new(
        credentials: Credentials,
        endpoints: GithubEndpoints,
    ) -> std::result::Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            credentials,
            endpoints,
            http_client,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// URL the browser is redirected to for user consent.
    ///
    /// The callback URI is appended verbatim, matching the redirect URI
    /// registered on the GitHub OAuth app.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}",
            self.endpoints.authorize_url, self.credentials.client_id, self.endpoints.callback_uri
        )
    }

    /// Exchange authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let request = TokenRequest {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            code,
        };

        debug!("Exchanging authorization code at {}", self.endpoints.token_url);

        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(OAuthError::UpstreamStatus {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let token_response: TokenResponse =
            serde_json::from_slice(&body).map_err(OAuthError::MalformedTokenResponse)?;

        if let Some(ref error) = token_response.error {
            warn!("Token exchange rejected by GitHub: {}", error);
        } else {
            debug!(
                "Received {} token with scope '{}'",
                token_response.token_type.as_deref().unwrap_or("unknown"),
                token_response.scope.as_deref().unwrap_or_default()
            );
        }

        token_response.into_access_token()
    }

    /// Fetch the authenticated user's profile as raw JSON text
    pub async fn fetch_user(&self, access_token: &str) -> Result<String> {
        let response = self
            .http_client
            .get(&self.endpoints.user_url)
            .header("Authorization", format!("token {}", access_token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OAuthError::UpstreamStatus { status, body });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> GithubClient {
        let endpoints = GithubEndpoints {
            token_url: format!("{}/login/oauth/access_token", server.url()),
            user_url: format!("{}/user", server.url()),
            ..GithubEndpoints::default()
        };
        GithubClient::new(Credentials::new("abc123", "shh"), endpoints).unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let client = GithubClient::new(
            Credentials::new("abc123", "shh"),
            GithubEndpoints::default(),
        )
        .unwrap();

        assert_eq!(
            client.authorization_url(),
            "https://github.com/login/oauth/authorize?client_id=abc123&redirect_uri=http://localhost:3000/login/github/callback"
        );
    }

    #[test]
    fn test_token_response_with_error() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap();

        match response.into_access_token() {
            Err(OAuthError::Provider { error, description }) => {
                assert_eq!(error, "bad_verification_code");
                assert_eq!(description, "The code passed is incorrect or expired.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_token_response_without_token() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(matches!(
            response.into_access_token(),
            Err(OAuthError::MissingAccessToken)
        ));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/login/oauth/access_token")
            .match_header("content-type", "application/json")
            .match_header("accept", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "client_id": "abc123",
                "client_secret": "shh",
                "code": "xyz",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok1","token_type":"bearer","scope":"read:user"}"#)
            .create_async()
            .await;

        let token = client_for(&server).exchange_code("xyz").await.unwrap();

        assert_eq!(token, "tok1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_code_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body("access_token=tok1&token_type=bearer")
            .create_async()
            .await;

        let result = client_for(&server).exchange_code("xyz").await;
        assert!(matches!(result, Err(OAuthError::MalformedTokenResponse(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        match client_for(&server).exchange_code("xyz").await {
            Err(OAuthError::UpstreamStatus { status, body }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/user")
            .match_header("authorization", "token tok1")
            .match_header("user-agent", Matcher::Regex("^github_oauth/".to_string()))
            .with_status(200)
            .with_body(r#"{"login":"alice","id":1}"#)
            .create_async()
            .await;

        let profile = client_for(&server).fetch_user("tok1").await.unwrap();

        assert_eq!(profile, r#"{"login":"alice","id":1}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_user_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/user")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        let result = client_for(&server).fetch_user("expired").await;
        assert!(matches!(result, Err(OAuthError::UpstreamStatus { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let endpoints = GithubEndpoints {
            token_url: "http://127.0.0.1:9/login/oauth/access_token".to_string(),
            ..GithubEndpoints::default()
        };
        let client = GithubClient::new(Credentials::new("abc123", "shh"), endpoints).unwrap();

        let result = client.exchange_code("xyz").await;
        assert!(matches!(result, Err(OAuthError::Transport(_))));
    }
}

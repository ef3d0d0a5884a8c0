//! OAuth client-credentials exchange.
//!
//! Trades the application's client id and secret for an app access token
//! at the identity provider's token endpoint. One request, no retry.

use loopcast_models::{AccessToken, ClientCredentials};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AuthCause, AuthError};

/// Twitch's OAuth token endpoint.
pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Body of a successful token response.
///
/// Every field is optional so that a response without a token is reported
/// as [`AuthError::MissingToken`] rather than as a parse failure.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

/// Performs the credential-to-token exchange.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    http: reqwest::Client,
    token_url: String,
}

impl TokenAcquirer {
    /// Acquirer talking to `token_url` with a fresh HTTP client.
    pub fn new(token_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), token_url)
    }

    /// Acquirer reusing an existing HTTP client.
    pub fn with_client(http: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
        }
    }

    /// The endpoint this acquirer posts to.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Exchange `credentials` for an access token.
    ///
    /// Sends a single form-encoded `POST` with a `client_credentials`
    /// grant and returns the issued token.
    ///
    /// # Errors
    ///
    /// * [`AuthError::Authentication`] if the endpoint is unreachable,
    ///   answers with a non-success status, or returns a body that is not
    ///   the expected JSON object.
    /// * [`AuthError::MissingToken`] if the response carries no
    ///   non-empty `access_token`.
    pub async fn acquire(&self, credentials: &ClientCredentials) -> Result<AccessToken, AuthError> {
        debug!(
            token_url = %self.token_url,
            client_id = credentials.client_id(),
            "requesting app access token"
        );

        let res = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", credentials.client_id()),
                ("client_secret", credentials.client_secret()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(AuthCause::Status { status, body }.into());
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;

        let token = parsed
            .access_token
            .and_then(|raw| AccessToken::new(raw).ok())
            .ok_or(AuthError::MissingToken)?;

        debug!(
            token_type = parsed.token_type.as_deref().unwrap_or("unknown"),
            expires_in = ?parsed.expires_in,
            "token response parsed"
        );
        info!(client_id = credentials.client_id(), "app access token acquired");

        Ok(token)
    }
}

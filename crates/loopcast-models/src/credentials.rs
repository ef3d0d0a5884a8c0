//! Application credentials and the access token they are exchanged for.

use std::fmt;

use crate::error::{non_empty, ModelError};
use crate::REDACTED;

// ---------------------------------------------------------------------------
// ClientCredentials
// ---------------------------------------------------------------------------

/// Client-credentials pair registered with the identity provider.
///
/// Read once from the environment at startup and never mutated.
///
/// # Examples
///
/// ```
/// use loopcast_models::ClientCredentials;
///
/// let creds = ClientCredentials::new("my-app", "s3cr3t").unwrap();
/// assert_eq!(creds.client_id(), "my-app");
/// assert!(!format!("{creds:?}").contains("s3cr3t"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Build a credentials pair, rejecting empty values.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            client_id: non_empty("client id", client_id.into())?,
            client_secret: non_empty("client secret", client_secret.into())?,
        })
    }

    /// The public client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret. Only the token request should read this.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AccessToken
// ---------------------------------------------------------------------------

/// Opaque bearer token returned by the identity provider.
///
/// Always non-empty: holding an `AccessToken` is proof that
/// authentication succeeded. It lives for a single run and is never
/// cached or refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token, rejecting empty strings.
    pub fn new(token: impl Into<String>) -> Result<Self, ModelError> {
        non_empty("access token", token.into()).map(Self)
    }

    /// The raw token value.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&REDACTED).finish()
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

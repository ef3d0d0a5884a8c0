//! Error types for the token exchange.
//!
//! Every way the exchange can fail before a response is parsed collapses
//! into [`AuthError::Authentication`], with the specific [`AuthCause`]
//! kept as its source. A well-formed response without a token is the
//! separate [`AuthError::MissingToken`].

use reqwest::StatusCode;

/// Errors returned by [`TokenAcquirer::acquire`](crate::TokenAcquirer::acquire).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity provider could not be reached or rejected the request.
    #[error("authentication failed: {cause}")]
    Authentication {
        /// What went wrong.
        #[source]
        cause: AuthCause,
    },

    /// The provider answered successfully but issued no usable token.
    #[error("access token not found in the token response")]
    MissingToken,
}

/// Underlying cause of an [`AuthError::Authentication`].
#[derive(Debug, thiserror::Error)]
pub enum AuthCause {
    /// The HTTP call failed at the transport level.
    #[error("failed to reach identity provider: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("identity provider returned {status}: {body}")]
    Status {
        /// HTTP status of the response.
        status: StatusCode,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The response body was not the expected JSON document.
    #[error("malformed token response: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl From<AuthCause> for AuthError {
    fn from(cause: AuthCause) -> Self {
        Self::Authentication { cause }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthCause::from(e).into()
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthCause::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err: AuthError = AuthCause::Status {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"status":400,"message":"invalid client secret"}"#.into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            r#"authentication failed: identity provider returned 400 Bad Request: {"status":400,"message":"invalid client secret"}"#
        );
    }

    #[test]
    fn json_error_becomes_authentication() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AuthError = json_err.into();
        assert!(matches!(
            err,
            AuthError::Authentication {
                cause: AuthCause::MalformedBody(_)
            }
        ));
    }

    #[test]
    fn missing_token_display() {
        assert_eq!(
            AuthError::MissingToken.to_string(),
            "access token not found in the token response"
        );
    }
}

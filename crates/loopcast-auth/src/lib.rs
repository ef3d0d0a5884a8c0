//! # loopcast auth
//!
//! The Token Acquirer: a single OAuth client-credentials exchange that
//! turns [`ClientCredentials`](loopcast_models::ClientCredentials) into an
//! [`AccessToken`](loopcast_models::AccessToken).
//!
//! ```rust,no_run
//! use loopcast_auth::{TokenAcquirer, TWITCH_TOKEN_URL};
//! use loopcast_models::ClientCredentials;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = ClientCredentials::new("client-id", "client-secret")?;
//! let token = TokenAcquirer::new(TWITCH_TOKEN_URL).acquire(&creds).await?;
//! println!("authenticated ({token})");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod oauth;

pub use error::{AuthCause, AuthError};
pub use oauth::{TokenAcquirer, TWITCH_TOKEN_URL};

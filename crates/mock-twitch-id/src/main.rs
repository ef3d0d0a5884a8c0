//! Mock of `id.twitch.tv` for local runs.
//!
//! Serves `POST /oauth2/token` with the client-credentials grant only.
//! Point loopcast at it with
//! `TWITCH_TOKEN_URL=http://localhost:4100/oauth2/token`.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// Lifetime reported for issued tokens, in seconds.
const TOKEN_TTL_SECS: u64 = 5_011_271;

/// Credentials the mock accepts.
#[derive(Debug, Clone)]
struct MockConfig {
    client_id: String,
    client_secret: String,
}

impl MockConfig {
    fn from_env() -> Self {
        Self {
            client_id: std::env::var("MOCK_CLIENT_ID")
                .unwrap_or_else(|_| "loopcast-dev".to_string()),
            client_secret: std::env::var("MOCK_CLIENT_SECRET")
                .unwrap_or_else(|_| "loopcast-dev-secret".to_string()),
        }
    }
}

#[derive(Deserialize)]
struct TokenRequest {
    client_id: Option<String>,
    client_secret: Option<String>,
    grant_type: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = MockConfig::from_env();
    let port: u16 = std::env::var("MOCK_TWITCH_ID_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4100);

    info!(client_id = %config.client_id, "accepting client credentials");

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(address = %listener.local_addr()?, "mock identity service listening");
    axum::serve(listener, app(config)).await?;
    Ok(())
}

fn app(config: MockConfig) -> Router {
    Router::new()
        .route("/oauth2/token", post(token))
        .with_state(Arc::new(config))
}

/// Twitch-style error body.
fn reject(status: StatusCode, message: &str) -> Response {
    warn!(%status, reason = message, "token request rejected");
    (
        status,
        Json(json!({ "status": status.as_u16(), "message": message })),
    )
        .into_response()
}

async fn token(State(config): State<Arc<MockConfig>>, Form(req): Form<TokenRequest>) -> Response {
    if req.grant_type.as_deref() != Some("client_credentials") {
        return reject(StatusCode::BAD_REQUEST, "unsupported grant type");
    }
    let Some(client_id) = req.client_id else {
        return reject(StatusCode::BAD_REQUEST, "missing client id");
    };
    if client_id != config.client_id {
        return reject(StatusCode::BAD_REQUEST, "invalid client");
    }
    if req.client_secret.as_deref() != Some(config.client_secret.as_str()) {
        return reject(StatusCode::FORBIDDEN, "invalid client secret");
    }

    info!(client_id = %client_id, "issuing app access token");

    Json(json!({
        "access_token": uuid::Uuid::new_v4().simple().to_string(),
        "expires_in": TOKEN_TTL_SECS,
        "token_type": "bearer",
    }))
    .into_response()
}

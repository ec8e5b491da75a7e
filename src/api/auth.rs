// =============================================================================
// Bearer Token Authentication — guards the mutating trade-log endpoint
// =============================================================================
//
// The expected token lives in `AppState::admin_token`, filled from
// `ADVISOR_ADMIN_TOKEN` at startup.  No token configured rejects every
// request.  Comparison runs in constant time.
//
//   async fn handler(_auth: AdminToken, ...) { ... }
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::app_state::AppState;

pub const TOKEN_ENV: &str = "ADVISOR_ADMIN_TOKEN";

/// Admin token from the environment, if set.
pub fn admin_token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV).ok()
}

/// Byte-wise equality that inspects every byte of equal-length inputs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor proving the request carried the admin token.
pub struct AdminToken;

pub struct AuthRejection {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

fn reject(status: StatusCode, message: &'static str) -> AuthRejection {
    AuthRejection { status, message }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminToken {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            warn!("{TOKEN_ENV} is not set; rejecting authenticated request");
            return Err(reject(StatusCode::FORBIDDEN, "Server authentication not configured"));
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let Some(token) = presented else {
            return Err(reject(StatusCode::UNAUTHORIZED, "Missing bearer token"));
        };

        if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
            warn!("invalid admin token presented");
            return Err(reject(StatusCode::FORBIDDEN, "Invalid authorization token"));
        }

        Ok(AdminToken)
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use vitach_auth::{JwtValidator, TokenValidationError};

use crate::app::errors::{json_error, token_error_to_response};
use crate::context::PrincipalContext;

/// Token ids signed out before their expiry.
///
/// Entries are dropped once the token would have expired anyway.
#[derive(Debug, Default)]
pub struct RevokedTokens {
    inner: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl RevokedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) {
        if let Ok(mut map) = self.inner.lock() {
            let now = Utc::now();
            map.retain(|_, exp| *exp > now);
            map.insert(jti, expires_at);
        }
    }

    /// A poisoned list fails closed.
    pub fn is_revoked(&self, jti: Uuid) -> bool {
        match self.inner.lock() {
            Ok(map) => map.contains_key(&jti),
            Err(_) => true,
        }
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub revoked: Arc<RevokedTokens>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "missing bearer token")
    })?;

    let claims = state
        .jwt
        .validate(token, Utc::now())
        .and_then(|claims| {
            if state.revoked.is_revoked(claims.jti) {
                Err(TokenValidationError::Revoked)
            } else {
                Ok(claims)
            }
        })
        .map_err(token_error_to_response)?;

    req.extensions_mut().insert(PrincipalContext::from_claims(claims));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

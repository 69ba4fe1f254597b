//! Sign-in and sign-out.
//!
//! The token carries the role read from the stored profile at sign-in; it is
//! never taken from the request.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use vitach_auth::IdentityProvider;

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> ApiResult<Response> {
    let identity = services
        .identity()
        .sign_in(&body.email, &body.password)
        .map_err(|e| {
            tracing::info!(code = e.code(), "sign-in refused");
            errors::identity_error_to_response(e)
        })?;

    let (token, expires_at) = services
        .issue_token(&identity)
        .map_err(errors::token_error_to_response)?;

    tracing::info!(user_id = %identity.user_id, role = identity.role.as_str(), "signed in");
    Ok((
        StatusCode::OK,
        Json(dto::LoginResponse {
            token,
            expires_at,
            user: identity.into(),
        }),
    )
        .into_response())
}

/// POST /auth/logout
///
/// Revokes the presented token until it would have expired.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> StatusCode {
    services.revoked().revoke(principal.jti(), principal.expires_at());
    tracing::info!(user_id = %principal.user_id(), "signed out");
    StatusCode::NO_CONTENT
}

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use vitach_auth::permissions_for;

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn me(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": principal.user_id().to_string(),
        "email": principal.email(),
        "role": principal.role(),
        "permissions": permissions_for(principal.role()),
        "expires_at": principal.expires_at(),
    }))
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};

use vitach_auth::{IdentityError, IdentityProvider, Permission};
use vitach_core::UserId;

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{parse_id, require};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(register_user))
        .route("/:id/role", patch(set_role))
        .route("/:id/status", patch(set_status))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require(&principal, Permission::UsersManage)?;
    let users: Vec<dto::UserResponse> = services.identity().list().into_iter().map(Into::into).collect();
    Ok(Json(users).into_response())
}

pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RegisterUserRequest>,
) -> ApiResult<Response> {
    require(&principal, Permission::UsersManage)?;
    let identity = services
        .identity()
        .register(&body.email, &body.password, &body.display_name, body.role)
        .map_err(errors::identity_error_to_response)?;
    Ok((StatusCode::CREATED, Json(dto::UserResponse::from(identity))).into_response())
}

fn user_error(e: IdentityError) -> Response {
    match e {
        IdentityError::UserNotFound => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        other => errors::identity_error_to_response(other),
    }
}

/// Role changes apply from the user's next sign-in.
pub async fn set_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetRoleRequest>,
) -> ApiResult<Response> {
    require(&principal, Permission::UsersManage)?;
    let user_id: UserId = parse_id(&id, "user")?;
    let identity = services
        .identity()
        .set_role(user_id, body.role)
        .map_err(user_error)?;
    tracing::info!(user_id = %user_id, role = body.role.as_str(), by = %principal.user_id(), "role changed");
    Ok(Json(dto::UserResponse::from(identity)).into_response())
}

/// Disabling blocks new sign-ins; tokens already issued run until they expire.
pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetUserStatusRequest>,
) -> ApiResult<Response> {
    require(&principal, Permission::UsersManage)?;
    let user_id: UserId = parse_id(&id, "user")?;
    if user_id == principal.user_id() && body.disabled {
        return Err(errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            "cannot disable your own account",
        ));
    }
    let identity = services
        .identity()
        .set_disabled(user_id, body.disabled)
        .map_err(user_error)?;
    tracing::info!(user_id = %user_id, disabled = body.disabled, by = %principal.user_id(), "account status changed");
    Ok(Json(dto::UserResponse::from(identity)).into_response())
}

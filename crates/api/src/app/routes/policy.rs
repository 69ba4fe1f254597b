use axum::{
    Json,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};

use vitach_auth::{Route, decide_route, permissions_for};

use crate::app::dto;
use crate::context::PrincipalContext;

/// GET /policy/routes
///
/// With `?path=`, the access decision for that page. Without, the pages and
/// mutations open to the caller's role.
pub async fn routes(
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::PolicyQuery>,
) -> Response {
    let role = principal.role();
    if let Some(path) = query.path {
        return Json(decide_route(&path, role)).into_response();
    }

    let routes: Vec<&'static str> = Route::ALL
        .into_iter()
        .filter(|r| r.allows(role))
        .map(|r| r.path())
        .collect();
    Json(serde_json::json!({
        "role": role,
        "routes": routes,
        "permissions": permissions_for(role),
    }))
    .into_response()
}

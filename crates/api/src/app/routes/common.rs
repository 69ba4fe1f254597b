use core::str::FromStr;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use vitach_auth::{CommandAuthorization, Permission, Route};

use crate::app::errors::{self, ApiResult};
use crate::context::PrincipalContext;

/// Small helper wrapper to associate required permissions with a command.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CmdAuth<C> {
    pub fn new(inner: C, required: Permission) -> Self {
        Self {
            inner,
            required: vec![required],
        }
    }

    /// Check the principal, then hand the command back.
    pub fn authorize(self, principal: &PrincipalContext) -> ApiResult<C> {
        crate::authz::authorize_command(principal, &self).map_err(errors::authz_error_to_response)?;
        Ok(self.inner)
    }
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

pub fn require(principal: &PrincipalContext, permission: Permission) -> ApiResult<()> {
    crate::authz::require(principal, permission).map_err(errors::authz_error_to_response)
}

pub fn require_view(principal: &PrincipalContext, route: Route) -> ApiResult<()> {
    if crate::authz::can_view(principal, route) {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("role '{}' may not open '{}'", principal.role(), route.path()),
        ))
    }
}

pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> ApiResult<T> {
    raw.parse().map_err(|_| errors::invalid_id(what))
}

/// Decode a request body into a schema type; shape errors are validation errors.
pub fn decode<T: DeserializeOwned>(body: JsonValue) -> ApiResult<T> {
    serde_json::from_value(body)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use vitach_auth::{AuthzError, IdentityError, TokenValidationError};
use vitach_core::DomainError;
use vitach_infra::{DispatchError, DocumentStoreError};

pub type ApiResult<T> = Result<T, axum::response::Response>;

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DispatchError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DispatchError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DispatchError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        DispatchError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        DispatchError::Deserialize(msg) => {
            tracing::error!(error = %msg, "stored order event no longer decodes");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        DispatchError::Store(e) => {
            tracing::error!(error = %e, "event store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage unavailable")
        }
        DispatchError::Publish(msg) => {
            // The events are committed; only live consumers lag.
            tracing::error!(error = %msg, "event publish failed after append");
            json_error(StatusCode::BAD_GATEWAY, "publish_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

pub fn document_error_to_response(err: DocumentStoreError) -> axum::response::Response {
    match err {
        DocumentStoreError::Domain(e) => domain_error_to_response(e),
        DocumentStoreError::NotFound { collection, id } => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{collection}/{id} not found"),
        ),
        DocumentStoreError::InvalidPatch => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", "patch must be a JSON object")
        }
        e @ (DocumentStoreError::Serialization(_) | DocumentStoreError::Poisoned) => {
            tracing::error!(error = %e, "document store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage unavailable")
        }
    }
}

/// Sign-in failures carry the provider code next to the localized message.
pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    let status = match &err {
        IdentityError::InvalidEmail | IdentityError::WeakPassword => StatusCode::BAD_REQUEST,
        IdentityError::EmailAlreadyInUse => StatusCode::CONFLICT,
        IdentityError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        IdentityError::NetworkRequestFailed => StatusCode::SERVICE_UNAVAILABLE,
        IdentityError::Other { .. } => {
            tracing::error!(code = err.code(), error = %err, "identity provider failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::UNAUTHORIZED,
    };
    (
        status,
        axum::Json(json!({
            "error": "identity_error",
            "code": err.code(),
            "severity": err.severity(),
            "message": err.user_message(),
        })),
    )
        .into_response()
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn token_error_to_response(err: TokenValidationError) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
}

pub fn invalid_id(what: &str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

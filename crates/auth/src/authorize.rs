use thiserror::Error;

use vitach_core::UserId;

use crate::{Permission, Role, permissions_for};

/// An authenticated actor as seen by authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },
}

/// Command-side authorization contract.
///
/// The API layer checks these before dispatching or writing anything.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if permissions_for(principal.role).contains(&required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role,
            permission: required,
        })
    }
}

//! API-side authorization guard.
//!
//! Every mutation is checked here against the static role policy before it
//! reaches the dispatcher or the document store. The order aggregate repeats
//! its own role check, so both layers must agree.

use vitach_auth::{AuthzError, CommandAuthorization, Permission, Route, authorize};

use crate::context::PrincipalContext;

/// Check every permission a command declares.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let principal = principal.principal();
    for perm in command.required_permissions() {
        authorize(&principal, *perm)?;
    }
    Ok(())
}

pub fn require(principal: &PrincipalContext, permission: Permission) -> Result<(), AuthzError> {
    authorize(&principal.principal(), permission)
}

/// Reads are gated by the page the data belongs to.
pub fn can_view(principal: &PrincipalContext, route: Route) -> bool {
    route.allows(principal.role())
}

//! `vitach-auth`: authentication and role-based authorization boundary.
//!
//! Decoupled from HTTP and storage: the API layer decodes tokens through
//! [`JwtValidator`] and asks [`authorize`] / the [`policy`] tables for decisions.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod jwt;
pub mod permissions;
pub mod policy;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::{Identity, IdentityError, IdentityProvider, Severity};
pub use jwt::{Hs256Jwt, JwtValidator};
pub use permissions::Permission;
pub use policy::{Route, RouteDecision, decide_route, permissions_for};
pub use roles::Role;

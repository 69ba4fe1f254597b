use chrono::{DateTime, Utc};
use uuid::Uuid;

use vitach_auth::{JwtClaims, Principal, Role};
use vitach_core::UserId;

/// Authenticated caller of a request, taken from the validated token.
///
/// The role is the one stored on the profile at sign-in; it is never read
/// from request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    email: String,
    role: Role,
    jti: Uuid,
    expires_at: DateTime<Utc>,
}

impl PrincipalContext {
    pub fn from_claims(claims: JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            jti: claims.jti,
            expires_at: claims.expires_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn jti(&self) -> Uuid {
        self.jti
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

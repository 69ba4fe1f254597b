//! Identity provider boundary and its error taxonomy.
//!
//! Provider failures carry a stable code (`auth/wrong-password`, ...). The API
//! shows users a fixed French message per code; codes it does not know fall
//! back to the provider's raw message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitach_core::UserId;

use crate::Role;

/// A signed-in user together with the role from their stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// How prominently a sign-in failure should be shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no account for this email")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("malformed email address")]
    InvalidEmail,
    #[error("account disabled")]
    UserDisabled,
    #[error("too many failed attempts")]
    TooManyRequests,
    #[error("identity backend unreachable")]
    NetworkRequestFailed,
    #[error("password too weak")]
    WeakPassword,
    #[error("email already registered")]
    EmailAlreadyInUse,
    #[error("invalid login credentials")]
    InvalidLoginCredentials,
    #[error("sign-in method not allowed")]
    OperationNotAllowed,
    #[error("recent sign-in required")]
    RequiresRecentLogin,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("{code}: {message}")]
    Other { code: String, message: String },
}

impl IdentityError {
    pub fn code(&self) -> &str {
        match self {
            IdentityError::UserNotFound => "auth/user-not-found",
            IdentityError::WrongPassword => "auth/wrong-password",
            IdentityError::InvalidEmail => "auth/invalid-email",
            IdentityError::UserDisabled => "auth/user-disabled",
            IdentityError::TooManyRequests => "auth/too-many-requests",
            IdentityError::NetworkRequestFailed => "auth/network-request-failed",
            IdentityError::WeakPassword => "auth/weak-password",
            IdentityError::EmailAlreadyInUse => "auth/email-already-in-use",
            IdentityError::InvalidLoginCredentials => "auth/invalid-login-credentials",
            IdentityError::OperationNotAllowed => "auth/operation-not-allowed",
            IdentityError::RequiresRecentLogin => "auth/requires-recent-login",
            IdentityError::InvalidCredential => "auth/invalid-credential",
            IdentityError::Other { code, .. } => code,
        }
    }

    /// User-facing message.
    pub fn user_message(&self) -> String {
        let fixed = match self {
            IdentityError::UserNotFound => "Aucun compte trouvé avec cette adresse email",
            IdentityError::WrongPassword => "Mot de passe incorrect. Veuillez vérifier votre saisie",
            IdentityError::InvalidEmail => "Adresse email invalide. Veuillez vérifier le format",
            IdentityError::UserDisabled => {
                "Ce compte a été temporairement désactivé. Contactez votre administrateur"
            }
            IdentityError::TooManyRequests => {
                "Trop de tentatives de connexion. Veuillez patienter quelques minutes avant de réessayer"
            }
            IdentityError::NetworkRequestFailed => {
                "Problème de connexion internet. Vérifiez votre connexion et réessayez"
            }
            IdentityError::WeakPassword => {
                "Le mot de passe est trop faible. Utilisez au moins 6 caractères"
            }
            IdentityError::EmailAlreadyInUse => {
                "Cette adresse email est déjà utilisée par un autre compte"
            }
            IdentityError::InvalidLoginCredentials => {
                "Identifiants de connexion invalides. Vérifiez votre email et mot de passe"
            }
            IdentityError::OperationNotAllowed => {
                "Méthode de connexion non autorisée. Contactez votre administrateur"
            }
            IdentityError::RequiresRecentLogin => {
                "Cette action nécessite une reconnexion récente. Veuillez vous reconnecter"
            }
            IdentityError::InvalidCredential => {
                "Credential invalide. Veuillez vérifier vos identifiants"
            }
            IdentityError::Other { message, .. } if !message.trim().is_empty() => {
                return message.clone();
            }
            IdentityError::Other { .. } => {
                "Une erreur inattendue s'est produite. Veuillez réessayer"
            }
        };
        fixed.to_string()
    }

    pub fn severity(&self) -> Severity {
        match self {
            IdentityError::UserNotFound
            | IdentityError::InvalidEmail
            | IdentityError::TooManyRequests
            | IdentityError::WeakPassword
            | IdentityError::EmailAlreadyInUse
            | IdentityError::RequiresRecentLogin => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Sign-in and account management backend.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Create an account with a stored profile role.
    fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<Identity, IdentityError>;

    /// Change the role on a stored profile.
    fn set_role(&self, user_id: UserId, role: Role) -> Result<Identity, IdentityError>;

    fn list(&self) -> Vec<Identity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_fixed_messages() {
        assert_eq!(IdentityError::UserNotFound.code(), "auth/user-not-found");
        assert_eq!(
            IdentityError::UserNotFound.user_message(),
            "Aucun compte trouvé avec cette adresse email"
        );
        assert_eq!(IdentityError::UserNotFound.severity(), Severity::Warning);
        assert_eq!(IdentityError::WrongPassword.severity(), Severity::Error);
    }

    #[test]
    fn unknown_codes_echo_raw_message_or_generic_text() {
        let raw = IdentityError::Other {
            code: "auth/quota-exceeded".to_string(),
            message: "Quota exceeded.".to_string(),
        };
        assert_eq!(raw.code(), "auth/quota-exceeded");
        assert_eq!(raw.user_message(), "Quota exceeded.");

        let blank = IdentityError::Other {
            code: "auth/internal-error".to_string(),
            message: String::new(),
        };
        assert_eq!(
            blank.user_message(),
            "Une erreur inattendue s'est produite. Veuillez réessayer"
        );
    }
}

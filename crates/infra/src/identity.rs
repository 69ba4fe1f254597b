//! In-memory account directory behind [`IdentityProvider`].
//!
//! Passwords are stored as Argon2id PHC strings. Repeated wrong passwords lock
//! the account for a short while, like a hosted identity service would.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use vitach_auth::{Identity, IdentityError, IdentityProvider, Role};
use vitach_core::UserId;

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_FAILED_ATTEMPTS: u32 = 5;
const LOCKOUT_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
    disabled: bool,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    /// Keyed by lower-cased email.
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable sign-in for an account.
    pub fn set_disabled(&self, user_id: UserId, disabled: bool) -> Result<Identity, IdentityError> {
        self.with_account(user_id, |account| {
            account.disabled = disabled;
            account.identity.clone()
        })
    }

    fn with_account<T>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut Account) -> T,
    ) -> Result<T, IdentityError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        let account = accounts
            .values_mut()
            .find(|a| a.identity.user_id == user_id)
            .ok_or(IdentityError::UserNotFound)?;
        Ok(f(account))
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let key = normalize_email(email)?;
        let now = Utc::now();

        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        let account = accounts.get_mut(&key).ok_or(IdentityError::UserNotFound)?;

        if account.disabled {
            return Err(IdentityError::UserDisabled);
        }
        if account.locked_until.is_some_and(|until| until > now) {
            return Err(IdentityError::TooManyRequests);
        }

        if !verify_password(password, &account.password_hash) {
            account.failed_attempts += 1;
            if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
                account.failed_attempts = 0;
                account.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
                warn!(user_id = %account.identity.user_id, "account locked after repeated failures");
                return Err(IdentityError::TooManyRequests);
            }
            return Err(IdentityError::WrongPassword);
        }

        account.failed_attempts = 0;
        account.locked_until = None;
        Ok(account.identity.clone())
    }

    fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<Identity, IdentityError> {
        let key = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        if accounts.contains_key(&key) {
            return Err(IdentityError::EmailAlreadyInUse);
        }

        let identity = Identity {
            user_id: UserId::new(),
            email: key.clone(),
            display_name: display_name.trim().to_string(),
            role,
        };
        accounts.insert(
            key,
            Account {
                identity: identity.clone(),
                password_hash,
                disabled: false,
                failed_attempts: 0,
                locked_until: None,
            },
        );
        info!(user_id = %identity.user_id, role = identity.role.as_str(), "account registered");
        Ok(identity)
    }

    fn set_role(&self, user_id: UserId, role: Role) -> Result<Identity, IdentityError> {
        self.with_account(user_id, |account| {
            account.identity.role = role;
            account.identity.clone()
        })
    }

    fn list(&self) -> Vec<Identity> {
        let Ok(accounts) = self.accounts.read() else {
            return vec![];
        };
        let mut out: Vec<_> = accounts.values().map(|a| a.identity.clone()).collect();
        out.sort_by(|a, b| a.email.cmp(&b.email));
        out
    }
}

fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(IdentityError::InvalidEmail);
    };
    let valid = !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
        && !email.chars().any(char::is_whitespace);
    if !valid {
        return Err(IdentityError::InvalidEmail);
    }
    Ok(email)
}

fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::encode_b64(Uuid::now_v7().as_bytes()).map_err(internal)?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(internal)
}

fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn internal(err: impl core::fmt::Display) -> IdentityError {
    IdentityError::Other {
        code: "auth/internal-error".to_string(),
        message: err.to_string(),
    }
}

fn poisoned() -> IdentityError {
    internal("account directory lock poisoned")
}

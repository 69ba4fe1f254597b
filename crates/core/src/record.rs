//! Flat document records (stock items, suppliers, employees, ...).
//!
//! Records are plain data bound to a named collection, validated at the store
//! boundary. Audit metadata is kept beside the record in [`Stored`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{DocumentId, UserId};

/// A schema type stored in a document collection.
pub trait Record: Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name (also the HTTP path segment).
    const COLLECTION: &'static str;

    /// Fields only the record's own operations may change; partial updates
    /// leave them as stored.
    const LIFECYCLE_FIELDS: &'static [&'static str] = &[];

    /// Validate field-level rules. Called on every create and on every update
    /// after the patch has been merged.
    fn validate(&self) -> DomainResult<()>;
}

/// Audit metadata attached to every stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    pub fn new(created_by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            created_by,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// A record together with its identifier and audit metadata.
///
/// Serializes flat: `{"id": .., "created_by": .., "created_at": .., "updated_at": .., <fields>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "R: Record")]
pub struct Stored<R> {
    pub id: DocumentId,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(flatten)]
    pub record: R,
}

/// Reject empty or whitespace-only text.
pub fn require_non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject zero quantities / amounts.
pub fn require_positive(field: &str, value: u64) -> DomainResult<()> {
    if value == 0 {
        return Err(DomainError::validation(format!("{field} must be greater than zero")));
    }
    Ok(())
}

//! Flat document collections (stock, suppliers, employees, ...).
//!
//! Documents are kept as the flat JSON of [`Stored<R>`], one map per
//! collection, keyed by [`DocumentId`]. Ids are UUIDv7 so the `BTreeMap`
//! iterates in creation order.
//!
//! Every write goes through [`Record::validate`]; a rejected record never
//! reaches the map.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use vitach_core::{Audit, DocumentId, DomainError, DomainResult, Record, Stored, UserId};

/// Keys owned by the store; patches cannot touch them.
const RESERVED_KEYS: [&str; 4] = ["id", "created_by", "created_at", "updated_at"];

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{collection}/{id} not found")]
    NotFound { collection: &'static str, id: DocumentId },

    #[error("patch must be a JSON object")]
    InvalidPatch,

    #[error("document serialization failed: {0}")]
    Serialization(String),

    #[error("document store lock poisoned")]
    Poisoned,
}

type Collection = BTreeMap<DocumentId, JsonValue>;

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<&'static str, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create<R: Record>(
        &self,
        record: R,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Stored<R>, DocumentStoreError> {
        record.validate()?;

        let stored = Stored {
            id: DocumentId::new(),
            audit: Audit::new(actor, at),
            record,
        };
        let json = to_json(&stored)?;

        let mut collections = self.collections.write().map_err(|_| DocumentStoreError::Poisoned)?;
        collections.entry(R::COLLECTION).or_default().insert(stored.id, json);
        Ok(stored)
    }

    /// Create the records `build` derives from the collection's current
    /// contents, under a single write lock. Nothing is stored unless every
    /// built record validates.
    pub fn create_from<R: Record>(
        &self,
        actor: UserId,
        at: DateTime<Utc>,
        build: impl FnOnce(&[Stored<R>]) -> DomainResult<Vec<R>>,
    ) -> Result<Vec<Stored<R>>, DocumentStoreError> {
        let mut collections = self.collections.write().map_err(|_| DocumentStoreError::Poisoned)?;
        let collection = collections.entry(R::COLLECTION).or_default();
        let existing = collection
            .values()
            .map(|doc| from_json(doc.clone()))
            .collect::<Result<Vec<Stored<R>>, _>>()?;

        let records = build(&existing)?;
        for record in &records {
            record.validate()?;
        }

        let mut created = Vec::with_capacity(records.len());
        let mut docs = Vec::with_capacity(records.len());
        for record in records {
            let stored = Stored {
                id: DocumentId::new(),
                audit: Audit::new(actor, at),
                record,
            };
            docs.push((stored.id, to_json(&stored)?));
            created.push(stored);
        }
        collection.extend(docs);
        Ok(created)
    }

    pub fn get<R: Record>(&self, id: DocumentId) -> Result<Stored<R>, DocumentStoreError> {
        let collections = self.collections.read().map_err(|_| DocumentStoreError::Poisoned)?;
        let json = collections
            .get(R::COLLECTION)
            .and_then(|c| c.get(&id))
            .ok_or(DocumentStoreError::NotFound {
                collection: R::COLLECTION,
                id,
            })?;
        from_json(json.clone())
    }

    /// Whole collection in creation order.
    pub fn list<R: Record>(&self) -> Result<Vec<Stored<R>>, DocumentStoreError> {
        self.list_matching::<R>(|_| true)
    }

    /// Documents whose top-level `field` equals `value`. Non-string fields
    /// compare by their JSON text (`3`, `true`).
    pub fn list_where<R: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Stored<R>>, DocumentStoreError> {
        self.list_matching::<R>(|doc| match doc.get(field) {
            Some(JsonValue::String(s)) => s == value,
            Some(JsonValue::Null) | None => false,
            Some(other) => other.to_string() == value,
        })
    }

    fn list_matching<R: Record>(
        &self,
        keep: impl Fn(&JsonValue) -> bool,
    ) -> Result<Vec<Stored<R>>, DocumentStoreError> {
        let collections = self.collections.read().map_err(|_| DocumentStoreError::Poisoned)?;
        let Some(collection) = collections.get(R::COLLECTION) else {
            return Ok(vec![]);
        };
        collection
            .values()
            .filter(|doc| keep(doc))
            .map(|doc| from_json(doc.clone()))
            .collect()
    }

    /// Merge `patch` into the record's top-level fields, re-validate, bump
    /// `updated_at`. Store-owned keys and the record's lifecycle fields in the
    /// patch are ignored.
    pub fn update<R: Record>(
        &self,
        id: DocumentId,
        patch: JsonValue,
        at: DateTime<Utc>,
    ) -> Result<Stored<R>, DocumentStoreError> {
        let JsonValue::Object(patch) = patch else {
            return Err(DocumentStoreError::InvalidPatch);
        };

        let mut collections = self.collections.write().map_err(|_| DocumentStoreError::Poisoned)?;
        let doc = collections
            .get_mut(R::COLLECTION)
            .and_then(|c| c.get_mut(&id))
            .ok_or(DocumentStoreError::NotFound {
                collection: R::COLLECTION,
                id,
            })?;

        let mut merged: Map<String, JsonValue> = match doc.clone() {
            JsonValue::Object(m) => m,
            _ => return Err(DocumentStoreError::Serialization("stored document is not an object".into())),
        };
        for (key, value) in patch {
            if RESERVED_KEYS.contains(&key.as_str()) || R::LIFECYCLE_FIELDS.contains(&key.as_str()) {
                continue;
            }
            merged.insert(key, value);
        }

        // A patch can produce a shape the record type refuses (wrong enum
        // literal, wrong type); that is the caller's input, not corruption.
        let mut stored: Stored<R> = serde_json::from_value(JsonValue::Object(merged))
            .map_err(|e| DomainError::validation(e.to_string()))?;
        stored.record.validate()?;
        stored.audit.touch(at);

        *doc = to_json(&stored)?;
        Ok(stored)
    }

    /// Run a domain operation on one record under the write lock.
    ///
    /// `op` may refuse (e.g. an overdrawn withdrawal); the document is then
    /// left untouched.
    pub fn modify<R: Record, T>(
        &self,
        id: DocumentId,
        at: DateTime<Utc>,
        op: impl FnOnce(&mut R) -> DomainResult<T>,
    ) -> Result<(Stored<R>, T), DocumentStoreError> {
        let mut collections = self.collections.write().map_err(|_| DocumentStoreError::Poisoned)?;
        let doc = collections
            .get_mut(R::COLLECTION)
            .and_then(|c| c.get_mut(&id))
            .ok_or(DocumentStoreError::NotFound {
                collection: R::COLLECTION,
                id,
            })?;

        let mut stored: Stored<R> = from_json(doc.clone())?;
        let out = op(&mut stored.record)?;
        stored.record.validate()?;
        stored.audit.touch(at);

        *doc = to_json(&stored)?;
        Ok((stored, out))
    }

    pub fn delete<R: Record>(&self, id: DocumentId) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().map_err(|_| DocumentStoreError::Poisoned)?;
        collections
            .get_mut(R::COLLECTION)
            .and_then(|c| c.remove(&id))
            .map(|_| ())
            .ok_or(DocumentStoreError::NotFound {
                collection: R::COLLECTION,
                id,
            })
    }
}

fn to_json<R: Record>(stored: &Stored<R>) -> Result<JsonValue, DocumentStoreError> {
    serde_json::to_value(stored).map_err(|e| DocumentStoreError::Serialization(e.to_string()))
}

fn from_json<R: Record>(json: JsonValue) -> Result<Stored<R>, DocumentStoreError> {
    serde_json::from_value(json).map_err(|e| DocumentStoreError::Serialization(e.to_string()))
}

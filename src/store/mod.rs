use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{course::Course, user::User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store lock poisoned")]
    Poisoned,
}

/// A keyed document collection. Mirrors the subset of a document-store
/// API the service relies on: predicate lookups, read-modify-write
/// updates, and delete-by-predicate.
///
/// `update_one` holds the collection write lock for the whole
/// read-modify-write, so updates to documents in the same collection
/// never interleave. Updates spanning two collections (student + course)
/// are two independent writes with no atomicity across them.
#[derive(Debug)]
pub struct Collection<T> {
    docs: RwLock<HashMap<String, T>>,
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert_one(&self, id: impl Into<String>, doc: T) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned)?;
        docs.insert(id.into(), doc);
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.get(id).cloned())
    }

    pub fn find_one<P>(&self, predicate: P) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.values().find(|doc| predicate(doc)).cloned())
    }

    pub fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.values().cloned().collect())
    }

    /// Applies `mutation` to the first document matching `predicate` and
    /// returns the updated document, or `None` when nothing matched.
    pub fn update_one<P, M>(&self, predicate: P, mutation: M) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool,
        M: FnOnce(&mut T),
    {
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned)?;
        match docs.values_mut().find(|doc| predicate(doc)) {
            Some(doc) => {
                mutation(doc);
                Ok(Some(doc.clone()))
            }
            None => Ok(None),
        }
    }

    pub fn find_one_and_delete<P>(&self, predicate: P) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned)?;
        let id = docs
            .iter()
            .find(|(_, doc)| predicate(doc))
            .map(|(id, _)| id.clone());
        Ok(id.and_then(|id| docs.remove(&id)))
    }
}

/// A token revoked at logout. Kept until process shutdown; revoked
/// tokens are never pruned, even once their own expiry has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    pub token: String,
}

/// The injected store handle. Constructed once at startup and shared
/// through `AppState`; tests build their own instance as a double.
#[derive(Debug)]
pub struct Store {
    pub students: Collection<User>,
    pub courses: Collection<Course>,
    pub blacklist: Collection<RevokedToken>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            students: Collection::new(),
            courses: Collection::new(),
            blacklist: Collection::new(),
        }
    }
}

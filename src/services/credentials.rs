use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

use crate::models::user::{User, UserRole};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("a user with this email already exists")]
    EmailTaken,
    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// User identities and password hashes over the students collection.
/// Plaintext passwords exist only transiently inside `create_user` and
/// `verify_password`; only the bcrypt hash is ever stored.
pub struct CredentialStore {
    store: Arc<Store>,
}

impl CredentialStore {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, CredentialError> {
        if self.find_by_email(email)?.is_some() {
            return Err(CredentialError::EmailTaken);
        }

        let password_hash = hash(password, DEFAULT_COST)?;
        let user = User::new(name, email, password_hash, role);
        self.store
            .students
            .insert_one(user.id.clone(), user.clone())?;
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.store.students.find_one(|u| u.email == email)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.store.students.find_by_id(id)
    }

    /// Partial profile update; absent fields are left untouched. Moving
    /// to an email already held by another user is a conflict.
    pub fn update_profile(
        &self,
        id: &str,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Option<User>, CredentialError> {
        if let Some(new_email) = &email {
            if let Some(existing) = self.find_by_email(new_email)? {
                if existing.id != id {
                    return Err(CredentialError::EmailTaken);
                }
            }
        }

        let updated = self.store.students.update_one(
            |u| u.id == id,
            |u| {
                if let Some(name) = name {
                    u.name = name;
                }
                if let Some(email) = email {
                    u.email = email;
                }
            },
        )?;
        Ok(updated)
    }

    pub fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .store
            .students
            .find_one_and_delete(|u| u.id == id)?
            .is_some())
    }

    /// One-way comparison; a hash that fails to parse counts as a
    /// mismatch rather than an error.
    pub fn verify_password(&self, plain: &str, password_hash: &str) -> bool {
        verify(plain, password_hash).unwrap_or(false)
    }
}

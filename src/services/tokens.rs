use std::sync::Arc;

use thiserror::Error;

use crate::store::{RevokedToken, Store, StoreError};
use crate::utils::jwt::{self, Claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("user not found")]
    UnknownUser,
    #[error("failed to sign token")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues, validates and revokes session tokens. The user's role is
/// read from the students collection once, at issuance, and embedded in
/// the token; revocation goes through the blacklist collection.
pub struct TokenService {
    store: Arc<Store>,
    secret: String,
}

impl TokenService {
    pub fn new(store: Arc<Store>, secret: impl Into<String>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        let user = self
            .store
            .students
            .find_by_id(user_id)?
            .ok_or(TokenError::UnknownUser)?;
        let claims = Claims::new(user.id.as_str(), user.role.as_str());
        Ok(jwt::create_jwt(&claims, &self.secret)?)
    }

    /// Signature and structure only; no expiry or blacklist check. Any
    /// failure is "invalid", never a fault.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        jwt::verify_jwt(token, &self.secret).ok()
    }

    /// `Some(claims)` iff the token is not blacklisted, its signature
    /// verifies, and it has not expired.
    pub fn validate(&self, token: &str) -> Result<Option<Claims>, StoreError> {
        if self
            .store
            .blacklist
            .find_one(|entry| entry.token == token)?
            .is_some()
        {
            return Ok(None);
        }
        match self.decode(token) {
            Some(claims) if !claims.is_expired() => Ok(Some(claims)),
            _ => Ok(None),
        }
    }

    /// Idempotent: revoking an already-revoked token is a no-op. The
    /// token need not be valid; logout blacklists whatever it is given.
    pub fn revoke(&self, token: &str) -> Result<(), StoreError> {
        self.store.blacklist.insert_one(
            token,
            RevokedToken {
                token: token.to_string(),
            },
        )
    }
}

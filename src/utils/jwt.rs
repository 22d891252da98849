use chrono::{Duration, NaiveDateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_TTL_MINUTES: i64 = 30;

// Legacy wire format: expiry travels as a formatted timestamp string
// rather than a numeric `exp` claim.
const EXPIRES_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Decoded payload of a session token. The role is captured at issuance
/// and never re-checked against the store, so a role change only takes
/// effect once the old token expires or is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub expires: String,
    pub users_role: String,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        let expires_at = Utc::now().naive_utc() + Duration::minutes(TOKEN_TTL_MINUTES);
        Self {
            user_id: user_id.into(),
            expires: expires_at.format(EXPIRES_FORMAT).to_string(),
            users_role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.users_role == "admin"
    }

    pub fn expires_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.expires, EXPIRES_FORMAT).ok()
    }

    /// An unparseable expiry counts as expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(at) => at <= Utc::now().naive_utc(),
            None => true,
        }
    }
}

pub fn create_jwt(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and structure only. Expiry and blacklist checks
/// belong to the token service; `exp` validation is disabled because the
/// payload carries no numeric `exp` claim.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

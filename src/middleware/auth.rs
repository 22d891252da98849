use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::services::policy::{self, Action};
use crate::utils::errors::AppError;
use crate::utils::jwt::Claims;
use crate::utils::logger::LOGGER;
use crate::AppState;

/// What the request presented for authentication. `claims` is `Some`
/// only when the `token` header passed full validation (signature,
/// expiry, blacklist); the raw header is kept separately so logout can
/// accept a token that no longer validates.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub token: Option<String>,
    pub claims: Option<Claims>,
}

impl AuthContext {
    pub fn authorize(&self, action: Action) -> Result<(), AppError> {
        policy::authorize(self.token.as_deref(), self.claims.as_ref(), action).map_err(|deny| {
            LOGGER.log_auth_denied(
                &format!("{:?}", action),
                &format!("{:?}", deny),
                self.claims.as_ref().map(|c| c.user_id.as_str()),
            );
            AppError::from(deny)
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("token")
            .and_then(|header| header.to_str().ok())
            .map(str::to_owned);

        let claims = match &token {
            Some(token) => state.tokens.validate(token)?,
            None => None,
        };

        Ok(Self { token, claims })
    }
}

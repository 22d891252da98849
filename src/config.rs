use anyhow::Context;
use std::env;

/// Process configuration, read once at startup. A missing signing
/// secret is a fatal startup error rather than a per-request failure.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let cors_origin =
            env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            jwt_secret,
            bind_addr,
            cors_origin,
        })
    }
}

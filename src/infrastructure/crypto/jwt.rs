//! Signed session tokens
//!
//! Session cookies carry an HS256 JWT signed with a secret shared with the
//! session issuer. This module only needs to verify them; `create_session_token`
//! exists so tooling and tests can mint cookies the issuer would produce.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session token configuration
#[derive(Clone)]
pub struct SessionTokenConfig {
    /// Secret key shared with the session issuer
    pub secret: String,
    /// Expected `iss` claim
    pub issuer: String,
}

impl std::fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Session ID
    pub sid: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl SessionClaims {
    pub fn new(user_id: &str, session_id: &str, ttl: Duration, config: &SessionTokenConfig) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }
}

/// Create a signed session token
pub fn create_session_token(
    user_id: &str,
    session_id: &str,
    ttl: Duration,
    config: &SessionTokenConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims::new(user_id, session_id, ttl, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, issuer and expiry of a session token
pub fn verify_session_token(
    token: &str,
    config: &SessionTokenConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

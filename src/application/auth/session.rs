//! Session provider port

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};

use crate::domain::{DomainResult, User};

/// An authenticated browser session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Validates the credentials a browser carries (cookies, headers) and
/// returns the session they belong to.
///
/// `Ok(None)` means no session is present or it is invalid. `Err` is
/// reserved for backend failures.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self, headers: &HeaderMap) -> DomainResult<Option<Session>>;
}

//! Credential resolution chain
//!
//! Turns raw request headers into the acting [`Principal`]. Strategies run
//! in order and the first one that yields a principal wins. Backend failures
//! are logged and treated as "not authenticated".

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::session::SessionProvider;
use crate::domain::{
    ApiKeyRepositoryInterface, AuthMethod, Principal, UserRepositoryInterface,
};

/// Header carrying a raw API key
pub const API_KEY_HEADER: &str = "x-api-key";

const BEARER_PREFIX: &str = "Bearer ";

/// One way of establishing who is making a request
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Principal>;
}

fn record(method: &'static str, outcome: &'static str) {
    metrics::counter!("auth_resolutions_total", "method" => method, "outcome" => outcome)
        .increment(1);
}

/// Pull a candidate API key out of the request headers.
///
/// `X-API-Key` wins; otherwise `Authorization: Bearer <key>`. Empty values
/// count as absent.
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    let direct = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    direct.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))
            .filter(|v| !v.is_empty())
    })
}

// ── Session ─────────────────────────────────────────────────────

pub struct SessionResolver {
    sessions: Arc<dyn SessionProvider>,
}

impl SessionResolver {
    pub fn new(sessions: Arc<dyn SessionProvider>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl CredentialResolver for SessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Principal> {
        match self.sessions.get_session(headers).await {
            Ok(Some(session)) => {
                record("session", "success");
                Some(Principal::from_user(session.user, AuthMethod::Session))
            }
            Ok(None) => {
                record("session", "absent");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed");
                record("session", "error");
                None
            }
        }
    }
}

// ── API key ─────────────────────────────────────────────────────

pub struct ApiKeyResolver {
    keys: Arc<dyn ApiKeyRepositoryInterface>,
    users: Arc<dyn UserRepositoryInterface>,
}

impl ApiKeyResolver {
    pub fn new(
        keys: Arc<dyn ApiKeyRepositoryInterface>,
        users: Arc<dyn UserRepositoryInterface>,
    ) -> Self {
        Self { keys, users }
    }

    /// Resolve against an explicit clock
    pub async fn resolve_at(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Option<Principal> {
        let Some(candidate) = extract_api_key(headers) else {
            record("api_key", "absent");
            return None;
        };

        let key = match self.keys.find_active_by_key(candidate).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                record("api_key", "not_found");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "API key lookup failed");
                record("api_key", "error");
                return None;
            }
        };

        // The store filter only covers `is_active`
        if !key.is_live_at(now) {
            debug!(key_id = %key.id, "Rejected expired or inactive API key");
            record("api_key", "expired");
            return None;
        }

        match self.users.get_user_by_id(&key.user_id).await {
            Ok(Some(user)) => {
                record("api_key", "success");
                Some(Principal::from_user(user, AuthMethod::ApiKey { key_id: key.id }))
            }
            Ok(None) => {
                warn!(key_id = %key.id, user_id = %key.user_id, "API key owner no longer exists");
                record("api_key", "owner_missing");
                None
            }
            Err(e) => {
                warn!(error = %e, key_id = %key.id, "API key owner lookup failed");
                record("api_key", "error");
                None
            }
        }
    }
}

#[async_trait]
impl CredentialResolver for ApiKeyResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Principal> {
        self.resolve_at(headers, Utc::now()).await
    }
}

// ── Chain ───────────────────────────────────────────────────────

/// Ordered list of resolvers; first success wins
#[derive(Clone, Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn CredentialResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Session first, then API key
    pub fn standard(
        sessions: Arc<dyn SessionProvider>,
        keys: Arc<dyn ApiKeyRepositoryInterface>,
        users: Arc<dyn UserRepositoryInterface>,
    ) -> Self {
        Self::new()
            .with(Arc::new(SessionResolver::new(sessions)))
            .with(Arc::new(ApiKeyResolver::new(keys, users)))
    }
}

#[async_trait]
impl CredentialResolver for ResolverChain {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Principal> {
        for resolver in &self.resolvers {
            if let Some(principal) = resolver.resolve(headers).await {
                return Some(principal);
            }
        }
        None
    }
}

use chrono::{DateTime, Utc};

/// A stored API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    /// Plaintext secret, `sk-` followed by 32 URL-safe characters.
    pub key: String,
    pub user_id: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// A key authenticates only while active and not past its expiry.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }
}

/// Insert payload; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub key: String,
    pub user_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// What to do with `expires_at` on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryUpdate {
    #[default]
    Unchanged,
    Clear,
    Set(DateTime<Utc>),
}

impl ExpiryUpdate {
    pub fn apply(self, current: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        match self {
            Self::Unchanged => current,
            Self::Clear => None,
            Self::Set(ts) => Some(ts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiKeyChanges {
    pub is_active: bool,
    pub expires_at: ExpiryUpdate,
}

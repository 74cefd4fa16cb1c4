use async_trait::async_trait;

use super::{ApiKey, ApiKeyChanges, NewApiKey};
use crate::shared::DomainResult;

/// Persistent API key table.
///
/// `insert` must report a duplicate `key` value as `DomainError::Conflict`;
/// `update` and `delete` report a missing row as `DomainError::NotFound`.
#[async_trait]
pub trait ApiKeyRepositoryInterface: Send + Sync {
    /// Exact match on the key value, restricted to active keys.
    async fn find_active_by_key(&self, key: &str) -> DomainResult<Option<ApiKey>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ApiKey>>;
    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<ApiKey>>;

    async fn insert(&self, new_key: NewApiKey) -> DomainResult<ApiKey>;
    async fn update(&self, id: &str, changes: ApiKeyChanges) -> DomainResult<ApiKey>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}

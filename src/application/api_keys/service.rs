//! API key lifecycle: create, list, update, delete.
//!
//! Every mutation is scoped to the acting principal. A key that does not
//! exist and a key owned by someone else are indistinguishable to callers.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    ApiKey, ApiKeyChanges, ApiKeyRepositoryInterface, DomainError, DomainResult, ExpiryUpdate,
    NewApiKey, Principal,
};
use crate::infrastructure::crypto::generate_api_key;
use crate::shared::parse_timestamp;

/// Attempts at finding an unused key value before giving up
pub const MAX_KEY_GENERATION_ATTEMPTS: usize = 3;

pub const MAX_NAME_LEN: usize = 100;

pub type KeyGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CreateApiKeyDto {
    pub name: String,
    /// Empty string is treated as absent
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateApiKeyDto {
    pub is_active: bool,
    /// Outer `None` leaves the expiry alone; `Some(None)` or `Some("")` clears it.
    pub expires_at: Option<Option<String>>,
}

pub struct ApiKeyService {
    repo: Arc<dyn ApiKeyRepositoryInterface>,
    generate: KeyGenerator,
}

impl ApiKeyService {
    pub fn new(repo: Arc<dyn ApiKeyRepositoryInterface>) -> Self {
        Self::with_generator(repo, Arc::new(generate_api_key))
    }

    pub fn with_generator(repo: Arc<dyn ApiKeyRepositoryInterface>, generate: KeyGenerator) -> Self {
        Self { repo, generate }
    }

    pub async fn list(&self, principal: &Principal) -> DomainResult<Vec<ApiKey>> {
        self.repo.list_by_user(&principal.id).await
    }

    pub async fn create(&self, principal: &Principal, dto: CreateApiKeyDto) -> DomainResult<ApiKey> {
        validate_name(&dto.name)?;
        let expires_at = match dto.expires_at.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw)?),
        };

        for attempt in 1..=MAX_KEY_GENERATION_ATTEMPTS {
            let new_key = NewApiKey {
                name: dto.name.clone(),
                key: (self.generate)(),
                user_id: principal.id.clone(),
                expires_at,
            };

            match self.repo.insert(new_key).await {
                Ok(key) => {
                    info!(key_id = %key.id, user_id = %principal.id, "API key created");
                    return Ok(key);
                }
                Err(DomainError::Conflict(_)) => {
                    warn!(attempt, "Generated API key collided with an existing one");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::Storage(format!(
            "no unique API key after {} attempts",
            MAX_KEY_GENERATION_ATTEMPTS
        )))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        dto: UpdateApiKeyDto,
    ) -> DomainResult<ApiKey> {
        let expires_at = match dto.expires_at {
            None => ExpiryUpdate::Unchanged,
            Some(None) => ExpiryUpdate::Clear,
            Some(Some(raw)) if raw.is_empty() => ExpiryUpdate::Clear,
            Some(Some(raw)) => ExpiryUpdate::Set(parse_timestamp(&raw)?),
        };

        self.load_owned(principal, id).await?;

        let changes = ApiKeyChanges {
            is_active: dto.is_active,
            expires_at,
        };
        let updated = self.repo.update(id, changes).await.map_err(forbid_missing)?;

        info!(key_id = %id, is_active = updated.is_active, "API key updated");
        Ok(updated)
    }

    pub async fn delete(&self, principal: &Principal, id: &str) -> DomainResult<()> {
        self.load_owned(principal, id).await?;
        self.repo.delete(id).await.map_err(forbid_missing)?;

        info!(key_id = %id, user_id = %principal.id, "API key deleted");
        Ok(())
    }

    async fn load_owned(&self, principal: &Principal, id: &str) -> DomainResult<ApiKey> {
        match self.repo.find_by_id(id).await? {
            Some(key) if principal.owns(&key) => Ok(key),
            Some(key) => {
                warn!(key_id = %key.id, principal = %principal.id, "Refused access to foreign API key");
                Err(forbidden())
            }
            None => Err(forbidden()),
        }
    }
}

fn forbidden() -> DomainError {
    DomainError::Forbidden("Forbidden".to_string())
}

// Row removed between the ownership check and the write
fn forbid_missing(err: DomainError) -> DomainError {
    match err {
        DomainError::NotFound { .. } => forbidden(),
        other => other,
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("name: must not be blank".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "name: must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

//! In-memory repositories for development and testing
//!
//! Both stores can be switched into a failing mode to simulate an
//! unreachable database.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    ApiKey, ApiKeyChanges, ApiKeyRepositoryInterface, CreateUserDto, DomainError, DomainResult,
    NewApiKey, User, UserRepositoryInterface, UserRole,
};

fn unavailable() -> DomainError {
    DomainError::Storage("in-memory store unavailable".to_string())
}

// ── API keys ────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryApiKeyRepository {
    keys: DashMap<String, ApiKey>,
    /// key value -> id, enforces uniqueness of `key`
    by_value: DashMap<String, String>,
    failing: AtomicBool,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a storage error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Store a fully-formed key as-is, bypassing id and timestamp assignment
    pub fn seed(&self, key: ApiKey) {
        self.by_value.insert(key.key.clone(), key.id.clone());
        self.keys.insert(key.id.clone(), key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn check(&self) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ApiKeyRepositoryInterface for InMemoryApiKeyRepository {
    async fn find_active_by_key(&self, key: &str) -> DomainResult<Option<ApiKey>> {
        self.check()?;
        let Some(id) = self.by_value.get(key).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self
            .keys
            .get(&id)
            .filter(|k| k.is_active)
            .map(|k| k.clone()))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ApiKey>> {
        self.check()?;
        Ok(self.keys.get(id).map(|k| k.clone()))
    }

    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<ApiKey>> {
        self.check()?;
        let mut keys: Vec<ApiKey> = self
            .keys
            .iter()
            .filter(|k| k.user_id == user_id)
            .map(|k| k.clone())
            .collect();
        keys.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(keys)
    }

    async fn insert(&self, new_key: NewApiKey) -> DomainResult<ApiKey> {
        self.check()?;
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();

        match self.by_value.entry(new_key.key.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(
                    "API key value already exists".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let key = ApiKey {
            id: id.clone(),
            name: new_key.name,
            key: new_key.key,
            user_id: new_key.user_id,
            is_active: true,
            expires_at: new_key.expires_at,
            created_at: now,
            updated_at: now,
        };
        self.keys.insert(id, key.clone());
        Ok(key)
    }

    async fn update(&self, id: &str, changes: ApiKeyChanges) -> DomainResult<ApiKey> {
        self.check()?;
        let mut entry = self
            .keys
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("ApiKey", "id", id))?;

        entry.is_active = changes.is_active;
        entry.expires_at = changes.expires_at.apply(entry.expires_at);
        entry.updated_at = Utc::now().max(entry.created_at);
        Ok(entry.clone())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.check()?;
        let (_, removed) = self
            .keys
            .remove(id)
            .ok_or_else(|| DomainError::not_found("ApiKey", "id", id))?;
        self.by_value.remove(&removed.key);
        Ok(())
    }
}

// ── Users ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    failing: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        self.check()?;
        if self.users.iter().any(|u| u.email == dto.email) {
            return Err(DomainError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: dto.email,
            name: dto.name,
            image: dto.image,
            email_verified: dto.email_verified,
            role: dto.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        self.check()?;
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.check()?;
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn update_user_role(&self, id: &str, role: UserRole) -> DomainResult<()> {
        self.check()?;
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExpiryUpdate;

    fn new_key(key: &str) -> NewApiKey {
        NewApiKey {
            name: "CI".into(),
            key: key.into(),
            user_id: "user-1".into(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_key_value_is_conflict() {
        let repo = InMemoryApiKeyRepository::new();
        repo.insert(new_key("sk-dup")).await.unwrap();

        let err = repo.insert(new_key("sk-dup")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn deleted_key_value_no_longer_resolves() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.insert(new_key("sk-gone")).await.unwrap();

        repo.delete(&created.id).await.unwrap();

        assert!(repo.find_active_by_key("sk-gone").await.unwrap().is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn inactive_keys_are_not_found_by_value() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.insert(new_key("sk-off")).await.unwrap();
        repo.update(
            &created.id,
            ApiKeyChanges {
                is_active: false,
                expires_at: ExpiryUpdate::Unchanged,
            },
        )
        .await
        .unwrap();

        assert!(repo.find_active_by_key("sk-off").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_mode_returns_storage_errors() {
        let repo = InMemoryApiKeyRepository::new();
        repo.set_failing(true);

        let err = repo.find_active_by_key("sk-any").await.unwrap_err();
        assert!(err.is_storage());

        repo.set_failing(false);
        assert!(repo.find_active_by_key("sk-any").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn user_lookup_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create_user(CreateUserDto {
                email: "a@example.com".into(),
                name: "A".into(),
                image: None,
                email_verified: false,
                role: None,
            })
            .await
            .unwrap();

        let found = repo.get_user_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, UserRole::User);
    }
}

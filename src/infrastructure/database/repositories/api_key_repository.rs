use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::user_repository::is_unique_violation;
use crate::domain::{
    ApiKey, ApiKeyChanges, ApiKeyRepositoryInterface, DomainError, DomainResult, NewApiKey,
};
use crate::infrastructure::database::entities::api_key;

pub struct SeaOrmApiKeyRepository {
    db: DatabaseConnection,
}

impl SeaOrmApiKeyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn api_key_model_to_domain(model: api_key::Model) -> ApiKey {
    ApiKey {
        id: model.id,
        name: model.name,
        key: model.key,
        user_id: model.user_id,
        is_active: model.is_active,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl ApiKeyRepositoryInterface for SeaOrmApiKeyRepository {
    async fn find_active_by_key(&self, key: &str) -> DomainResult<Option<ApiKey>> {
        let model = api_key::Entity::find()
            .filter(api_key::Column::Key.eq(key))
            .filter(api_key::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(model.map(api_key_model_to_domain))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ApiKey>> {
        let model = api_key::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(api_key_model_to_domain))
    }

    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<ApiKey>> {
        let models = api_key::Entity::find()
            .filter(api_key::Column::UserId.eq(user_id))
            .order_by_asc(api_key::Column::CreatedAt)
            .order_by_asc(api_key::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(api_key_model_to_domain).collect())
    }

    async fn insert(&self, new_key: NewApiKey) -> DomainResult<ApiKey> {
        let now = Utc::now();

        let model = api_key::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(new_key.name),
            key: Set(new_key.key),
            user_id: Set(new_key.user_id),
            is_active: Set(true),
            expires_at: Set(new_key.expires_at),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict("API key value already exists".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(api_key_model_to_domain(inserted))
    }

    async fn update(&self, id: &str, changes: ApiKeyChanges) -> DomainResult<ApiKey> {
        let Some(existing) = api_key::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(DomainError::not_found("ApiKey", "id", id));
        };

        let expires_at = changes.expires_at.apply(existing.expires_at);
        let updated_at = Utc::now().max(existing.created_at);

        let mut active: api_key::ActiveModel = existing.into();
        active.is_active = Set(changes.is_active);
        active.expires_at = Set(expires_at);
        active.updated_at = Set(updated_at);

        let updated = active.update(&self.db).await.map_err(|e| match e {
            // Row deleted between the read and the write
            sea_orm::DbErr::RecordNotUpdated => DomainError::not_found("ApiKey", "id", id),
            other => other.into(),
        })?;

        Ok(api_key_model_to_domain(updated))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = api_key::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ApiKey", "id", id));
        }

        Ok(())
    }
}

//! API key request / response bodies

use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::api_keys::{CreateApiKeyDto, UpdateApiKeyDto};
use crate::domain::ApiKey;
use crate::shared::format_timestamp;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "CI pipeline",
    "expiresAt": "2030-01-01T00:00:00Z"
}))]
pub struct CreateApiKeyRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    /// ISO-8601 timestamp; empty string means no expiry
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl From<CreateApiKeyRequest> for CreateApiKeyDto {
    fn from(r: CreateApiKeyRequest) -> Self {
        Self {
            name: r.name,
            expires_at: r.expires_at,
        }
    }
}

/// Body of `POST /api/apikey/update`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApiKeyRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub id: String,
    pub is_active: bool,
    /// Absent = unchanged, `null` or `""` = never expires
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub expires_at: Option<Option<String>>,
}

/// Body of `PATCH /api/apikey/{id}`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchApiKeyRequest {
    pub is_active: bool,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub expires_at: Option<Option<String>>,
}

impl UpdateApiKeyRequest {
    pub fn into_parts(self) -> (String, UpdateApiKeyDto) {
        (
            self.id,
            UpdateApiKeyDto {
                is_active: self.is_active,
                expires_at: self.expires_at,
            },
        )
    }
}

impl From<PatchApiKeyRequest> for UpdateApiKeyDto {
    fn from(r: PatchApiKeyRequest) -> Self {
        Self {
            is_active: r.is_active,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteApiKeyRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyDto {
    pub id: String,
    pub name: String,
    pub key: String,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ApiKey> for ApiKeyDto {
    fn from(k: ApiKey) -> Self {
        Self {
            expires_at: k.expires_at.as_ref().map(format_timestamp),
            created_at: format_timestamp(&k.created_at),
            updated_at: format_timestamp(&k.updated_at),
            id: k.id,
            name: k.name,
            key: k.key,
            is_active: k.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyListResponse {
    pub api_keys: Vec<ApiKeyDto>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: ApiKeyDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteApiKeyResponse {
    pub success: bool,
}

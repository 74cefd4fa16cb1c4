//! API key management handlers
//!
//! All routes sit behind the authorization gate, so a [`Principal`] is
//! always present in the request extensions.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::dto::{
    ApiKeyDto, ApiKeyListResponse, ApiKeyResponse, CreateApiKeyRequest, DeleteApiKeyRequest,
    DeleteApiKeyResponse, PatchApiKeyRequest, UpdateApiKeyRequest,
};
use crate::application::api_keys::ApiKeyService;
use crate::domain::Principal;
use crate::interfaces::http::common::{ErrorBody, ValidatedJson};
use crate::interfaces::http::error::ApiError;

const FETCH_FAILED: &str = "Failed to fetch API keys";
const CREATE_FAILED: &str = "Failed to create API key";
const UPDATE_FAILED: &str = "Failed to update API key";
const DELETE_FAILED: &str = "Failed to delete API key";

#[derive(Clone)]
pub struct ApiKeyHandlerState {
    pub service: Arc<ApiKeyService>,
}

#[utoipa::path(
    get,
    path = "/api/apikey",
    tag = "API Keys",
    responses(
        (status = 200, description = "Keys owned by the caller", body = ApiKeyListResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(("session_cookie" = []), ("api_key" = []), ("bearer_auth" = []))
)]
pub async fn list_api_keys(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiKeyListResponse>, ApiError> {
    let keys = state
        .service
        .list(&principal)
        .await
        .map_err(|e| ApiError::from_domain(e, FETCH_FAILED))?;

    Ok(Json(ApiKeyListResponse {
        api_keys: keys.into_iter().map(ApiKeyDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/apikey",
    tag = "API Keys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 200, description = "Key created; the plaintext key is included", body = ApiKeyResponse),
        (status = 400, description = "Invalid name or expiry", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(("session_cookie" = []), ("api_key" = []), ("bearer_auth" = []))
)]
pub async fn create_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let key = state
        .service
        .create(&principal, request.into())
        .await
        .map_err(|e| ApiError::from_domain(e, CREATE_FAILED))?;

    Ok(Json(ApiKeyResponse {
        api_key: key.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/apikey/update",
    tag = "API Keys",
    request_body = UpdateApiKeyRequest,
    responses(
        (status = 200, description = "Key updated", body = ApiKeyResponse),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Key missing or owned by someone else", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(("session_cookie" = []), ("api_key" = []), ("bearer_auth" = []))
)]
pub async fn update_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<UpdateApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let (id, dto) = request.into_parts();
    let key = state
        .service
        .update(&principal, &id, dto)
        .await
        .map_err(|e| ApiError::from_domain(e, UPDATE_FAILED))?;

    Ok(Json(ApiKeyResponse {
        api_key: key.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/apikey/{id}",
    tag = "API Keys",
    params(("id" = String, Path, description = "API key id")),
    request_body = PatchApiKeyRequest,
    responses(
        (status = 200, description = "Key updated", body = ApiKeyResponse),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Key missing or owned by someone else", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(("session_cookie" = []), ("api_key" = []), ("bearer_auth" = []))
)]
pub async fn patch_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<PatchApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let key = state
        .service
        .update(&principal, &id, request.into())
        .await
        .map_err(|e| ApiError::from_domain(e, UPDATE_FAILED))?;

    Ok(Json(ApiKeyResponse {
        api_key: key.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/apikey/delete",
    tag = "API Keys",
    request_body = DeleteApiKeyRequest,
    responses(
        (status = 200, description = "Key deleted", body = DeleteApiKeyResponse),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Key missing or owned by someone else", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(("session_cookie" = []), ("api_key" = []), ("bearer_auth" = []))
)]
pub async fn delete_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<DeleteApiKeyRequest>,
) -> Result<Json<DeleteApiKeyResponse>, ApiError> {
    remove(&state, &principal, &request.id).await
}

#[utoipa::path(
    delete,
    path = "/api/apikey/{id}",
    tag = "API Keys",
    params(("id" = String, Path, description = "API key id")),
    responses(
        (status = 200, description = "Key deleted", body = DeleteApiKeyResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Key missing or owned by someone else", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(("session_cookie" = []), ("api_key" = []), ("bearer_auth" = []))
)]
pub async fn delete_api_key_by_id(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeleteApiKeyResponse>, ApiError> {
    remove(&state, &principal, &id).await
}

async fn remove(
    state: &ApiKeyHandlerState,
    principal: &Principal,
    id: &str,
) -> Result<Json<DeleteApiKeyResponse>, ApiError> {
    state
        .service
        .delete(principal, id)
        .await
        .map_err(|e| ApiError::from_domain(e, DELETE_FAILED))?;

    Ok(Json(DeleteApiKeyResponse { success: true }))
}

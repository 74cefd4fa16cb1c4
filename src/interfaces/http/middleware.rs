//! Authorization gate
//!
//! Resolves the acting principal before any protected handler runs and
//! rejects the request with 401 when nobody could be identified.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use crate::application::auth::CredentialResolver;

#[derive(Clone)]
pub struct AuthState {
    pub resolver: Arc<dyn CredentialResolver>,
}

impl AuthState {
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self { resolver }
    }
}

/// Session / API-key authentication middleware
///
/// On success the [`Principal`](crate::domain::Principal) is stored in the
/// request extensions for handlers to extract.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(principal) = auth_state.resolver.resolve(request.headers()).await else {
        tracing::warn!(
            method = %request.method(),
            uri = %request.uri(),
            "Unauthenticated request rejected"
        );
        return ApiError::Unauthenticated.into_response();
    };

    tracing::debug!(
        principal = %principal.id,
        auth_method = principal.auth_method.as_str(),
        "Request authenticated"
    );
    request.extensions_mut().insert(principal);
    next.run(request).await
}

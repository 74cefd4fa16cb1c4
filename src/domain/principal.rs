//! The acting identity attached to an authenticated request.

use serde::Serialize;
use utoipa::ToSchema;

use super::api_key::ApiKey;
use super::user::{User, UserRole};

/// How the principal was authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    Session,
    ApiKey { key_id: String },
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::ApiKey { .. } => "api_key",
        }
    }
}

/// Authenticated user, whichever credential mechanism produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub email_verified: bool,
    pub role: UserRole,
    #[serde(skip)]
    pub auth_method: AuthMethod,
}

impl Principal {
    pub fn from_user(user: User, auth_method: AuthMethod) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            email_verified: user.email_verified,
            role: user.role,
            auth_method,
        }
    }

    /// Ownership predicate shared by every key mutation.
    pub fn owns(&self, key: &ApiKey) -> bool {
        key.user_id == self.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

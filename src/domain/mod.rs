//! Domain layer: aggregates, the acting principal and repository ports.

pub mod api_key;
pub mod principal;
pub mod user;

pub use api_key::{ApiKey, ApiKeyChanges, ApiKeyRepositoryInterface, ExpiryUpdate, NewApiKey};
pub use principal::{AuthMethod, Principal};
pub use user::{CreateUserDto, User, UserRepositoryInterface, UserRole};

pub use crate::shared::errors::{DomainError, DomainResult};

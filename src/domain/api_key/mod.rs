//! API key aggregate

pub mod model;
pub mod repository;

pub use model::{ApiKey, ApiKeyChanges, ExpiryUpdate, NewApiKey};
pub use repository::ApiKeyRepositoryInterface;

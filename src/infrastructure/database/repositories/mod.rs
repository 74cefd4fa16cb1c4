//! Database repository implementations

pub mod api_key_repository;
pub mod user_repository;

pub use api_key_repository::SeaOrmApiKeyRepository;
pub use user_repository::SeaOrmUserRepository;

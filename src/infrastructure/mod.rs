//! Infrastructure layer: persistence, crypto and session adapters

pub mod crypto;
pub mod database;
pub mod session;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
pub use session::JwtCookieSessionProvider;
pub use storage::{InMemoryApiKeyRepository, InMemoryUserRepository};

pub mod memory;

pub use memory::{InMemoryApiKeyRepository, InMemoryUserRepository};

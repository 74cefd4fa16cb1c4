//! Application layer: credential resolution and key lifecycle use-cases

pub mod api_keys;
pub mod auth;
pub mod identity;

pub use api_keys::{ApiKeyService, CreateApiKeyDto, UpdateApiKeyDto};
pub use auth::{CredentialResolver, ResolverChain, Session, SessionProvider};
pub use identity::{promote_admin, AdminSeedOutcome};

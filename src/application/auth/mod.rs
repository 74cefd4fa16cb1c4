//! Credential resolution

pub mod resolver;
pub mod session;

pub use resolver::{
    extract_api_key, ApiKeyResolver, CredentialResolver, ResolverChain, SessionResolver,
};
pub use session::{Session, SessionProvider};

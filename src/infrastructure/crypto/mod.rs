pub mod api_key;
pub mod jwt;

pub use api_key::{generate_api_key, API_KEY_PREFIX};
pub use jwt::{create_session_token, verify_session_token, SessionClaims, SessionTokenConfig};

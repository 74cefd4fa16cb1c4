pub mod service;

pub use service::{
    ApiKeyService, CreateApiKeyDto, KeyGenerator, UpdateApiKeyDto, MAX_KEY_GENERATION_ATTEMPTS,
};

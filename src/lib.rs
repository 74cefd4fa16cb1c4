//! # API key service
//!
//! Session and API-key authentication for a web backend, plus self-service
//! management of personal API keys.
//!
//! ## Architecture
//!
//! - **domain**: entities (`ApiKey`, `User`, `Principal`) and repository traits
//! - **application**: credential resolution chain and key lifecycle service
//! - **infrastructure**: SeaORM / in-memory stores, key generation, session cookies
//! - **interfaces**: axum router, authorization gate, handlers and OpenAPI docs
//! - **shared**: errors, timestamp helpers and shutdown plumbing

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;

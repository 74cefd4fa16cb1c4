//! HTTP REST API
//!
//! - `middleware`: authorization gate
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, layers and Swagger documentation

pub mod common;
pub mod error;
pub mod middleware;
pub mod modules;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use router::{create_api_router, ApiDoc, AppServices, RouterOptions};

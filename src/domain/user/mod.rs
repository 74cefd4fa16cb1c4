//! User aggregate
//!
//! Users are owned by the session provider; this service only reads them
//! and adjusts roles.

pub mod model;
pub mod repository;

mod dto_create;

pub use dto_create::CreateUserDto;
pub use model::{User, UserRole};
pub use repository::UserRepositoryInterface;

pub mod seed;

pub use seed::{promote_admin, AdminSeedOutcome};

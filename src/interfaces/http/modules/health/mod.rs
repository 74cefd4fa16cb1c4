pub mod handlers;

pub use handlers::{get_status, StatusResponse, StatusState};

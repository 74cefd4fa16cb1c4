pub mod handlers;

pub use handlers::{get_session, SessionHandlerState, SessionResponse};

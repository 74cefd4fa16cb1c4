pub mod jwt_cookie;

pub use jwt_cookie::{find_cookie, JwtCookieSessionProvider, DEFAULT_COOKIE_NAME};

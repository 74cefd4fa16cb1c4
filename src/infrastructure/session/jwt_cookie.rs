//! Session provider backed by a signed cookie

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::application::auth::{Session, SessionProvider};
use crate::domain::{DomainResult, UserRepositoryInterface};
use crate::infrastructure::crypto::{verify_session_token, SessionTokenConfig};

pub const DEFAULT_COOKIE_NAME: &str = "session_token";

/// Reads the session JWT from a cookie and loads the user it names.
pub struct JwtCookieSessionProvider {
    users: Arc<dyn UserRepositoryInterface>,
    config: SessionTokenConfig,
    cookie_name: String,
}

impl JwtCookieSessionProvider {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        config: SessionTokenConfig,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            users,
            config,
            cookie_name: cookie_name.into(),
        }
    }
}

/// Find a cookie value across all `Cookie` headers
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl SessionProvider for JwtCookieSessionProvider {
    async fn get_session(&self, headers: &HeaderMap) -> DomainResult<Option<Session>> {
        let Some(token) = find_cookie(headers, &self.cookie_name) else {
            return Ok(None);
        };

        let claims = match verify_session_token(token, &self.config) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session cookie");
                return Ok(None);
            }
        };

        let Some(expires_at) = DateTime::<Utc>::from_timestamp(claims.exp, 0) else {
            return Ok(None);
        };

        let Some(user) = self.users.get_user_by_id(&claims.sub).await? else {
            debug!(user_id = %claims.sub, "Session names an unknown user");
            return Ok(None);
        };

        Ok(Some(Session {
            id: claims.sid,
            user,
            expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreateUserDto;
    use crate::infrastructure::crypto::create_session_token;
    use crate::infrastructure::storage::InMemoryUserRepository;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn config() -> SessionTokenConfig {
        SessionTokenConfig {
            secret: "test-secret".into(),
            issuer: "apikey-service".into(),
        }
    }

    async fn provider() -> (JwtCookieSessionProvider, Arc<InMemoryUserRepository>, String) {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = users
            .create_user(CreateUserDto {
                email: "web@example.com".into(),
                name: "Web".into(),
                image: None,
                email_verified: true,
                role: None,
            })
            .await
            .unwrap();
        let provider = JwtCookieSessionProvider::new(users.clone(), config(), DEFAULT_COOKIE_NAME);
        (provider, users, user.id)
    }

    fn cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_others() {
        let headers = cookie("theme=dark; session_token=abc.def; other=1");
        assert_eq!(find_cookie(&headers, "session_token"), Some("abc.def"));
        assert_eq!(find_cookie(&headers, "missing"), None);
        assert_eq!(find_cookie(&cookie("session_token="), "session_token"), None);
    }

    #[tokio::test]
    async fn valid_cookie_yields_session() {
        let (provider, _, user_id) = provider().await;
        let token = create_session_token(&user_id, "sess-9", Duration::hours(1), &config()).unwrap();

        let session = provider
            .get_session(&cookie(&format!("session_token={token}")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.id, "sess-9");
        assert_eq!(session.user.id, user_id);
        assert!(session.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn missing_forged_or_expired_cookie_is_no_session() {
        let (provider, _, user_id) = provider().await;
        assert!(provider.get_session(&HeaderMap::new()).await.unwrap().is_none());

        let forged = create_session_token(
            &user_id,
            "s",
            Duration::hours(1),
            &SessionTokenConfig {
                secret: "wrong".into(),
                issuer: "apikey-service".into(),
            },
        )
        .unwrap();
        assert!(provider
            .get_session(&cookie(&format!("session_token={forged}")))
            .await
            .unwrap()
            .is_none());

        let expired = create_session_token(&user_id, "s", Duration::hours(-1), &config()).unwrap();
        assert!(provider
            .get_session(&cookie(&format!("session_token={expired}")))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unknown_user_is_no_session() {
        let (provider, _, _) = provider().await;
        let token = create_session_token("ghost", "s", Duration::hours(1), &config()).unwrap();

        assert!(provider
            .get_session(&cookie(&format!("session_token={token}")))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn user_store_failure_is_an_error() {
        let (provider, users, user_id) = provider().await;
        let token = create_session_token(&user_id, "s", Duration::hours(1), &config()).unwrap();
        users.set_failing(true);

        assert!(provider
            .get_session(&cookie(&format!("session_token={token}")))
            .await
            .is_err());
    }
}

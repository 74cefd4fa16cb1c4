//! Current browser session

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::auth::{Session, SessionProvider};
use crate::domain::UserRole;
use crate::shared::format_timestamp;

#[derive(Clone)]
pub struct SessionHandlerState {
    pub sessions: Arc<dyn SessionProvider>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub email_verified: bool,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoDto {
    pub id: String,
    pub user_id: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionData {
    pub user: SessionUserDto,
    pub session: SessionInfoDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// `null` when the request carries no valid session
    pub data: Option<SessionData>,
}

impl From<Session> for SessionData {
    fn from(s: Session) -> Self {
        Self {
            session: SessionInfoDto {
                id: s.id,
                user_id: s.user.id.clone(),
                expires_at: format_timestamp(&s.expires_at),
            },
            user: SessionUserDto {
                created_at: format_timestamp(&s.user.created_at),
                updated_at: format_timestamp(&s.user.updated_at),
                id: s.user.id,
                email: s.user.email,
                name: s.user.name,
                image: s.user.image,
                email_verified: s.user.email_verified,
                role: s.user.role,
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    responses(
        (status = 200, description = "Current session, or null", body = SessionResponse)
    )
)]
pub async fn get_session(
    State(state): State<SessionHandlerState>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let data = match state.sessions.get_session(&headers).await {
        Ok(session) => session.map(SessionData::from),
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed");
            None
        }
    };

    Json(SessionResponse { data })
}

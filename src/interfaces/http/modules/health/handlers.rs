//! Server status handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use utoipa::ToSchema;

use crate::shared::format_timestamp;

#[derive(Clone)]
pub struct StatusState {
    /// `None` when running on the in-memory stores
    pub db: Option<DatabaseConnection>,
    pub started_at: Arc<Instant>,
}

impl StatusState {
    pub fn new(db: Option<DatabaseConnection>) -> Self {
        Self {
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// `ok`, or `degraded` when the database does not answer
    pub status: String,
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub version: String,
    /// `ok`, `error` or `memory`
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Status",
    responses(
        (status = 200, description = "Server status and uptime", body = StatusResponse)
    )
)]
pub async fn get_status(State(state): State<StatusState>) -> Json<StatusResponse> {
    let database = match &state.db {
        None => "memory",
        Some(db) => match db
            .execute(Statement::from_string(
                db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
        {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                "error"
            }
        },
    };

    let status = if database == "error" { "degraded" } else { "ok" };

    Json(StatusResponse {
        status: status.to_string(),
        timestamp: format_timestamp(&Utc::now()),
        uptime: state.started_at.elapsed().as_secs_f64(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

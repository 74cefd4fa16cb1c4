//! API router with Swagger UI

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ErrorBody;
use super::middleware::{auth_middleware, AuthState};
use super::modules::api_keys::{self, ApiKeyHandlerState};
use super::modules::health::{self, StatusState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::session::{self, SessionHandlerState};
use crate::application::api_keys::ApiKeyService;
use crate::application::auth::{CredentialResolver, SessionProvider};
use crate::domain::UserRole;
use crate::infrastructure::session::DEFAULT_COOKIE_NAME;

/// Everything the handlers need, already wired
#[derive(Clone)]
pub struct AppServices {
    pub api_keys: Arc<ApiKeyService>,
    pub resolver: Arc<dyn CredentialResolver>,
    pub sessions: Arc<dyn SessionProvider>,
    pub db: Option<DatabaseConnection>,
}

#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Empty or `*` allows any origin (without credentials)
    pub cors_origins: Vec<String>,
    /// Mounts `/metrics` when present
    pub metrics: Option<PrometheusHandle>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(DEFAULT_COOKIE_NAME))),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("API key sent as a Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::get_status,
        session::handlers::get_session,
        api_keys::handlers::list_api_keys,
        api_keys::handlers::create_api_key,
        api_keys::handlers::update_api_key,
        api_keys::handlers::patch_api_key,
        api_keys::handlers::delete_api_key,
        api_keys::handlers::delete_api_key_by_id,
    ),
    components(
        schemas(
            ErrorBody,
            UserRole,
            health::StatusResponse,
            session::SessionResponse,
            session::handlers::SessionData,
            session::handlers::SessionUserDto,
            session::handlers::SessionInfoDto,
            api_keys::ApiKeyDto,
            api_keys::ApiKeyListResponse,
            api_keys::ApiKeyResponse,
            api_keys::CreateApiKeyRequest,
            api_keys::UpdateApiKeyRequest,
            api_keys::PatchApiKeyRequest,
            api_keys::DeleteApiKeyRequest,
            api_keys::DeleteApiKeyResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Status", description = "Server status and uptime"),
        (name = "Session", description = "Current browser session"),
        (name = "API Keys", description = "Create, list, update and delete personal API keys"),
    ),
    info(
        title = "API Key Service",
        version = "1.0.0",
        description = "Session and API-key authenticated key management API"
    )
)]
pub struct ApiDoc;

fn build_cors(origins: &[String]) -> CorsLayer {
    let explicit: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if explicit.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    // Cookies need an explicit origin list
    CorsLayer::new()
        .allow_origin(explicit)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
}

/// Create the API router with all routes
pub fn create_api_router(services: AppServices, options: RouterOptions) -> Router {
    let auth_state = AuthState::new(services.resolver.clone());
    let api_key_state = ApiKeyHandlerState {
        service: services.api_keys.clone(),
    };

    // Both `/api/apikey` and `/api/apikey/` are served
    let api_key_routes = Router::new()
        .route(
            "/api/apikey",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/api/apikey/",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route("/api/apikey/update", post(api_keys::update_api_key))
        .route("/api/apikey/delete", post(api_keys::delete_api_key))
        .route(
            "/api/apikey/{id}",
            patch(api_keys::patch_api_key).delete(api_keys::delete_api_key_by_id),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(api_key_state);

    let session_routes = Router::new()
        .route("/api/session", get(session::get_session))
        .with_state(SessionHandlerState {
            sessions: services.sessions.clone(),
        });

    let status_routes = Router::new()
        .route("/api/status", get(health::get_status))
        .with_state(StatusState::new(services.db.clone()));

    let swagger_routes =
        SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(status_routes)
        .merge(session_routes)
        .merge(api_key_routes);

    if let Some(handle) = options.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&options.cors_origins))
}

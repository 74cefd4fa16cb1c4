//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: store setup, migrations, admin
//! promotion, the HTTP server and graceful shutdown. The CLI binary is a
//! thin wrapper around it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::api_keys::ApiKeyService;
use crate::application::auth::ResolverChain;
use crate::application::identity::promote_admin;
use crate::config::{AppConfig, ConfigError, StoreBackend};
use crate::domain::{ApiKeyRepositoryInterface, UserRepositoryInterface};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::{SeaOrmApiKeyRepository, SeaOrmUserRepository};
use crate::infrastructure::database::init_database;
use crate::infrastructure::session::JwtCookieSessionProvider;
use crate::infrastructure::storage::{InMemoryApiKeyRepository, InMemoryUserRepository};
use crate::interfaces::http::modules::metrics::describe_metrics;
use crate::interfaces::http::{create_api_router, AppServices, RouterOptions};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// The global metrics recorder can only be installed once per process.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install Prometheus metrics recorder");
            describe_metrics();
            info!("Prometheus metrics recorder installed");
            handle
        })
        .clone()
}

struct Stores {
    keys: Arc<dyn ApiKeyRepositoryInterface>,
    users: Arc<dyn UserRepositoryInterface>,
    db: Option<DatabaseConnection>,
}

async fn open_stores(config: &AppConfig, auto_migrate: bool) -> Result<Stores, ServerError> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory stores; data is lost on shutdown");
            Ok(Stores {
                keys: Arc::new(InMemoryApiKeyRepository::new()),
                users: Arc::new(InMemoryUserRepository::new()),
                db: None,
            })
        }
        StoreBackend::Sql => {
            let db = init_database(&config.database_config()).await?;

            if auto_migrate {
                info!("Running database migrations...");
                Migrator::up(&db, None).await?;
                info!("Migrations completed");
            }

            Ok(Stores {
                keys: Arc::new(SeaOrmApiKeyRepository::new(db.clone())),
                users: Arc::new(SeaOrmUserRepository::new(db.clone())),
                db: Some(db),
            })
        }
    }
}

/// Handle to a running server
pub struct ServerHandle {
    pub config: AppConfig,
    /// Address actually bound (useful with port 0 in tests)
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;
        config.validate()?;

        info!("Starting API key service...");
        let metrics = prometheus_handle();

        let stores = open_stores(&config, opts.auto_migrate).await?;

        if let Some(email) = config.admin.email.as_deref().filter(|e| !e.is_empty()) {
            if let Err(e) = promote_admin(stores.users.as_ref(), email).await {
                error!(error = %e, "Admin promotion failed");
            }
        }

        let sessions = Arc::new(JwtCookieSessionProvider::new(
            stores.users.clone(),
            config.session_token_config(),
            config.session.cookie_name.clone(),
        ));
        let resolver = Arc::new(ResolverChain::standard(
            sessions.clone(),
            stores.keys.clone(),
            stores.users.clone(),
        ));

        let services = AppServices {
            api_keys: Arc::new(ApiKeyService::new(stores.keys.clone())),
            resolver,
            sessions,
            db: stores.db.clone(),
        };
        let router = create_api_router(
            services,
            RouterOptions {
                cors_origins: config.cors.allowed_origins.clone(),
                metrics: Some(metrics),
            },
        );

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let addr = config.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/api/docs/", local_addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            db: stores.db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGINT / SIGTERM listeners that trigger shutdown
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the HTTP server to drain, then close the database.
    pub async fn wait(self) {
        info!("Waiting for in-flight requests...");

        match tokio::time::timeout(self.shutdown.timeout(), self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(
                "REST API server did not stop within {:?}",
                self.shutdown.timeout()
            ),
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }

        info!("Shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the logging section.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

use crate::config::{InvoiceConfig, StoreBackend};
use crate::handlers;
use crate::services::{
    CompanyDirectory, Database, InvoiceStore, InvoiceUpsert, MemoryStore, SequenceCounter,
    SequenceStore,
};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<dyn InvoiceStore>,
    pub companies: Arc<dyn CompanyDirectory>,
    pub counter: SequenceCounter,
    pub upsert: InvoiceUpsert,
}

impl AppState {
    /// State over a single backend implementing every store trait.
    pub fn new<S>(store: S, counter_timeout: Duration) -> Self
    where
        S: SequenceStore + InvoiceStore + CompanyDirectory + 'static,
    {
        let store = Arc::new(store);
        Self::from_parts(store.clone(), store.clone(), store, counter_timeout)
    }

    pub fn from_parts(
        sequences: Arc<dyn SequenceStore>,
        invoices: Arc<dyn InvoiceStore>,
        companies: Arc<dyn CompanyDirectory>,
        counter_timeout: Duration,
    ) -> Self {
        let counter = SequenceCounter::new(sequences, counter_timeout);
        let upsert = InvoiceUpsert::new(counter.clone(), invoices.clone(), companies.clone());
        Self {
            invoices,
            companies,
            counter,
            upsert,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/invoices/next-number", get(handlers::peek_next_number))
        .route(
            "/invoices",
            post(handlers::save_invoice).get(handlers::list_invoices),
        )
        .route(
            "/invoices/:invoice_id",
            get(handlers::get_invoice).delete(handlers::delete_invoice),
        )
        .route(
            "/invoices/:invoice_id/document",
            get(handlers::get_invoice_document),
        )
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: InvoiceConfig) -> Result<Self, AppError> {
        let counter_timeout = config.numbering.counter_timeout();

        let state = match config.store.backend {
            StoreBackend::Postgres => {
                let url = config.database.url.as_deref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required"))
                })?;
                let db = Database::new(
                    url,
                    config.database.max_connections,
                    config.database.min_connections,
                    counter_timeout,
                )
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to PostgreSQL: {}", e);
                    e
                })?;
                if config.database.run_migrations {
                    db.run_migrations().await?;
                }
                AppState::new(db, counter_timeout)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                AppState::new(MemoryStore::new(), counter_timeout)
            }
        };

        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

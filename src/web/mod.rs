use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::catalog::{CatalogSource, SqliteCatalog};
use crate::pipeline::StockWatcher;
use crate::AppConfig;

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use handlers::{add_product, delete_product, health_check, list_products, trigger_check};
pub use responses::*;

#[derive(Clone)]
pub struct AppState {
    pub watcher: Arc<StockWatcher>,
    pub catalog: Arc<SqliteCatalog>,
    pub trigger_secret: Arc<str>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> crate::Result<Self> {
        let catalog = Arc::new(SqliteCatalog::new(&config.database.url)?);
        let source: Arc<dyn CatalogSource> = catalog.clone();
        let watcher = StockWatcher::from_config(config, source)?;

        Ok(Self {
            watcher: Arc::new(watcher),
            catalog,
            trigger_secret: Arc::from(config.trigger.secret.as_str()),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Trigger for the external scheduler, checks its own secret
        .route("/api/check", get(trigger_check))
        // Catalog administration
        .nest("/api/v1", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(from_fn(middleware::request_logging)),
        )
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(add_product))
        .route("/products/:id", delete(delete_product))
        .route_layer(from_fn_with_state(state, middleware::require_secret))
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate_trigger()?;
    let state = AppState::from_config(&config)?;
    state.catalog.ensure_schema().await?;

    let app = create_router(state);
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(address = %address, "Stock watcher listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

//! Core library of the depot file repository: the flat-directory file manager
//! and the HTTP routes around it.

pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use config::{AppConfig, ServerConfig, StorageConfig};
pub use error::{AppError, Result};
pub use files::{
    DeleteOutcome, FileManager, FileManagerConfig, FileUpload, StorageError, StoreReport,
    StoredFile,
};
pub use handlers::routes::create_routes;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use middleware::body_limit::{body_limit_middleware, security_headers_middleware, BodyLimit};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

const MIB: u64 = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub file_manager: FileManager,
}

impl AppState {
    pub fn new(file_manager: FileManager) -> Self {
        Self {
            app_name: "depot".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            file_manager,
        }
    }

    /// Upload limit in whole MiB, as shown to clients.
    pub fn max_upload_mb(&self) -> u64 {
        self.file_manager.max_content_length() / MIB
    }
}

pub fn create_app(state: AppState) -> Router {
    let limit = state.file_manager.max_content_length();
    let body_limit = usize::try_from(limit).unwrap_or(usize::MAX);

    let mut router = Router::new()
        .merge(create_routes())
        .layer(DefaultBodyLimit::max(body_limit));

    router = router.layer(axum_middleware::from_fn_with_state(
        BodyLimit(limit),
        body_limit_middleware,
    ));

    router = router.layer(axum_middleware::from_fn(security_headers_middleware));

    router = middleware::logging::with_request_tracing(router);

    router.with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

//! Dashgrid Layout Server
//!
//! Stores each user's dashboard arrangement as an opaque layout string and
//! serves it back. See [`routes`] for the HTTP surface and [`config`] for the
//! environment variables it reads.

mod config;
mod routes;

use config::{ServerConfig, StorageKind};
use dashgrid_core::{FileStorage, LayoutStore, MemoryStorage, StorageResult};
use routes::AppState;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashgrid_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = open_store(&config.storage)?;

    let state = Arc::new(AppState {
        store,
        catalog: Arc::new(config.catalog),
        grid: config.grid,
    });
    let app = routes::router(state);

    info!("Dashgrid layout server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn open_store(kind: &StorageKind) -> StorageResult<Arc<dyn LayoutStore>> {
    match kind {
        StorageKind::Memory => {
            info!("Using in-memory layout storage; layouts are lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageKind::File(Some(dir)) => {
            let storage = FileStorage::new(dir.clone())?;
            info!("Storing layouts in {}", storage.base_path().display());
            Ok(Arc::new(storage))
        }
        StorageKind::File(None) => {
            let storage = FileStorage::default_location()?;
            info!("Storing layouts in {}", storage.base_path().display());
            Ok(Arc::new(storage))
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

use std::sync::Arc;

use common::storage::filesystem::FilesystemBlobStore;
use tracing::{Level, info};

use server::catalog::RecordingCatalog;
use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    let blobs =
        FilesystemBlobStore::new(config.storage.root.clone(), config.storage.max_blob_size)
            .await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        catalog: RecordingCatalog::new(db),
        blobs: Arc::new(blobs),
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

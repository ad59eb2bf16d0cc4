use std::sync::Arc;

use common::storage::BlobStore;

use crate::catalog::RecordingCatalog;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub catalog: RecordingCatalog,
    pub blobs: Arc<dyn BlobStore>,
    pub config: AppConfig,
}

//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::MediaStore;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    media: MediaStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The media store is rooted at the configured `MEDIA_DIR`.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let media = MediaStore::new(config.media_dir.clone(), config.max_image_bytes);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Image storage for menu items.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.inner.media
    }
}

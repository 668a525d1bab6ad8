pub mod file_service;
pub mod database_service;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Backend, Config};
use crate::errors::StorageError;
use crate::types::{Page, Title};

pub use file_service::FileStore;
pub use database_service::{permalink, DatabaseStore, DEFAULT_CATALOG_LIMIT};

/// Persistence for wiki pages.
///
/// Backends are shared between request tasks, so implementations must be
/// `Send + Sync` and hold no per-request state.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Load the page stored for `title`.
    ///
    /// Every read failure, missing page or otherwise, is reported as
    /// [`StorageError::NotFound`].
    async fn load(&self, title: &Title) -> Result<Page, StorageError>;

    /// Replace whatever is stored for the page's title with the page.
    async fn save(&self, page: &Page) -> Result<(), StorageError>;
}

/// Listing of known titles for the index view
#[async_trait]
pub trait PageCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Backend opened from the configuration
pub enum OpenedBackend {
    Files(Arc<FileStore>),
    Database(Arc<DatabaseStore>),
}

impl OpenedBackend {
    /// Open the configured backend. Failure here is fatal to the process.
    pub async fn open(config: &Config) -> Result<Self, StorageError> {
        match &config.backend {
            Backend::Files => Ok(Self::Files(Arc::new(FileStore::open(&config.pages_dir).await?))),
            Backend::Database { url } => Ok(Self::Database(Arc::new(
                DatabaseStore::connect(url, config.catalog_limit).await?,
            ))),
        }
    }

    /// Release backend resources at shutdown
    pub async fn close(&self) {
        if let Self::Database(store) = self {
            store.close().await;
        }
    }

    /// The same backend seen as a store and as a catalog
    pub fn handles(&self) -> (Arc<dyn PageStore>, Arc<dyn PageCatalog>) {
        match self {
            Self::Files(store) => {
                let pages: Arc<dyn PageStore> = store.clone();
                let catalog: Arc<dyn PageCatalog> = store.clone();
                (pages, catalog)
            }
            Self::Database(store) => {
                let pages: Arc<dyn PageStore> = store.clone();
                let catalog: Arc<dyn PageCatalog> = store.clone();
                (pages, catalog)
            }
        }
    }
}

pub mod page;

use std::path::PathBuf;
use std::sync::Arc;

use crate::components::Render;
use crate::config::Config;
use crate::logger::RequestLogger;
use crate::services::{OpenedBackend, PageCatalog, PageStore};

pub use page::{is_valid_title, Page, Title, ROUTE_PREFIX_LEN};

/// Application state shared across all handlers
///
/// Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PageStore>,
    pub catalog: Arc<dyn PageCatalog>,
    pub renderer: Arc<dyn Render>,
    pub access_log: Option<RequestLogger>,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    /// Wire the opened backend, templates and access log together
    pub fn build(config: &Config, backend: &OpenedBackend, renderer: Arc<dyn Render>) -> Self {
        let (store, catalog) = backend.handles();
        Self {
            store,
            catalog,
            renderer,
            access_log: config.access_log.then(RequestLogger::new),
            static_dir: Arc::new(config.static_dir.clone()),
        }
    }
}

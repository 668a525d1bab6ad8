//! Quill - a small wiki server
//!
//! Pages are addressed by alphanumeric titles and kept either as flat files or
//! in a SQLite database. Both backends sit behind the same [`PageStore`] and
//! [`PageCatalog`] traits, so routing and rendering never know which one is in use.

pub mod app;
pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use app::create_router;
pub use components::{Render, TemplateComponent, View, ViewData};
pub use config::{Backend, Config};
pub use errors::{RenderError, StorageError, WikiError};
pub use logger::{Action, Logger, RequestLogger};
pub use services::{permalink, DatabaseStore, FileStore, OpenedBackend, PageCatalog, PageStore};
pub use types::{is_valid_title, AppState, Page, Title};

//! Router construction.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    handle_css, handle_edit, handle_fallback, handle_js, handle_root, handle_save, handle_view,
};
use crate::types::AppState;

/// Create the application router.
///
/// The bare `/view/`, `/edit/` and `/save/` routes exist so that an empty
/// title still reaches the title gate and gets a 404 instead of a redirect.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/view/", get(handle_view))
        .route("/view/*title", get(handle_view))
        .route("/edit/", get(handle_edit))
        .route("/edit/*title", get(handle_edit))
        .route("/save/", post(handle_save))
        .route("/save/*title", post(handle_save))
        .route("/js/*path", get(handle_js))
        .route("/css/*path", get(handle_css))
        .fallback(handle_fallback)
        .with_state(state)
}

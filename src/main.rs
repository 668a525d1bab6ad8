use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use quill::{create_router, AppState, Config, Logger, OpenedBackend, TemplateComponent, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to initialise logger: {e}");
    }

    let config = Config::from_env()?;
    let addr = config.socket_addr()?;
    let backend = OpenedBackend::open(&config).await?;
    let templates = TemplateComponent::load(&config.templates_dir)?;
    let state = AppState::build(&config, &backend, Arc::new(templates));

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;
    log::info!("Wiki listening on http://{}", addr);

    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    backend.close().await;
    log::info!("Wiki stopped");
    served.map_err(WikiError::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

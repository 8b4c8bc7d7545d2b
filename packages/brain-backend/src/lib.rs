//! Board backend: config loading, store init, HTTP server.
pub mod api;
pub mod config;
mod log_bridge;
pub mod server;
pub mod state;

use brain_core::storage::local::FileSlot;
use brain_core::BoardStore;

use crate::state::AppState;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = log_bridge::init() {
        log_bridge::write_fallback_line(&format!("failed to initialize backend logger: {}", e));
    }

    let config_path = config::default_config_path();
    let config = config::load_config(&config_path);
    let data_path = config.data_path();
    log::info!("[brain.backend] Using board data at {}", data_path.display());

    let store = BoardStore::open(Box::new(FileSlot::new(&data_path)));
    if let Some(error) = store.last_error() {
        log::warn!("[brain.backend] Store opened with error: {}", error);
    }
    log::info!("[brain.backend] Loaded {} boards", store.boards().len());

    let state = AppState::new(store, config.port, config.bind_address.clone());
    let port = server::spawn_server(state).await?;
    log::info!("[brain.backend] Ready on port {}", port);

    tokio::signal::ctrl_c().await?;
    log::info!("[brain.backend] Shutdown signal received");
    Ok(())
}

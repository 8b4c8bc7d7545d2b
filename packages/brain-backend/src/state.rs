//! Shared application state passed to axum handlers.
use std::sync::{Arc, Mutex, MutexGuard};

use brain_core::events::BoardChangeEvent;
use brain_core::BoardStore;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    /// One lock serializes every mutation, so the store sees them in order.
    pub store: Arc<Mutex<BoardStore>>,
    pub event_tx: broadcast::Sender<BoardChangeEvent>,
    pub port: u16,
    pub bind_address: String,
}

impl AppState {
    pub fn new(store: BoardStore, port: u16, bind_address: impl Into<String>) -> Self {
        let (event_tx, _event_rx) = broadcast::channel::<BoardChangeEvent>(256);
        Self {
            store: Arc::new(Mutex::new(store)),
            event_tx,
            port,
            bind_address: bind_address.into(),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, BoardStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Forward an event to SSE clients. Having no subscribers is not an error.
    pub fn emit(&self, event: BoardChangeEvent) {
        let _ = self.event_tx.send(event);
    }
}

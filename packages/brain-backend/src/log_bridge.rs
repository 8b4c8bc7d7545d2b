//! Logger that keeps recent entries in memory for `/logs` while still
//! printing through env_logger.
use env_logger::Logger;
use log::{Log, Metadata, Record, SetLoggerError};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex};

const MAX_LOG_ENTRIES: usize = 2000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendLogEntry {
    pub timestamp_ms: u64,
    pub level: String,
    pub target: String,
    pub message: String,
}

struct BackendLogHub {
    entries: Mutex<VecDeque<BackendLogEntry>>,
}

impl BackendLogHub {
    fn push(&self, entry: BackendLogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_back(entry);
        while entries.len() > MAX_LOG_ENTRIES {
            entries.pop_front();
        }
    }

    fn recent_entries(&self) -> Vec<BackendLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }
}

static LOG_HUB: LazyLock<BackendLogHub> = LazyLock::new(|| BackendLogHub {
    entries: Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES)),
});

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

struct BufferedLogger {
    inner: Logger,
}

impl Log for BufferedLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        LOG_HUB.push(BackendLogEntry {
            timestamp_ms: now_ms(),
            level: record.level().to_string().to_lowercase(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the logger. Filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<(), SetLoggerError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let inner = builder.build();
    let max_level = inner.filter();
    let logger = Box::leak(Box::new(BufferedLogger { inner }));
    log::set_logger(logger)?;
    log::set_max_level(max_level);
    Ok(())
}

pub fn recent_entries() -> Vec<BackendLogEntry> {
    LOG_HUB.recent_entries()
}

/// Record a line even when the logger could not be installed.
pub fn write_fallback_line(message: &str) {
    eprintln!("[brain.log_bridge] {}", message);
    LOG_HUB.push(BackendLogEntry {
        timestamp_ms: now_ms(),
        level: "error".to_string(),
        target: "brain.log_bridge".to_string(),
        message: message.to_string(),
    });
}

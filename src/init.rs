//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::engine::{BlockingToggle, ContactManager, FileContactProvider};
use crate::logger::{MemoryLogSink, RecentEvents, ScreeningLogSink, ScreeningLogger};
use crate::notify::{CallNotifier, LogNotifier, NoopNotifier};
use crate::screener::CallScreener;
use crate::stats::StatsCollector;
use crate::store::{
    BlockedCallLog, ContactStore, MemoryPreferences, PreferenceStore, SqlitePreferences,
};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    // stdout carries the host protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured preference backend.
pub fn init_preferences(config: &Config) -> Result<Arc<dyn PreferenceStore>> {
    match config.storage.backend.as_str() {
        "sqlite" => {
            info!("Using SQLite preference store.");
            Ok(Arc::new(SqlitePreferences::open(&config.storage.sqlite_path)?))
        }
        "memory" => {
            info!("Using in-memory preference store. Nothing will survive a restart.");
            Ok(Arc::new(MemoryPreferences::new()))
        }
        other => bail!("Unknown storage backend: {}", other),
    }
}

/// Everything the host loop needs, wired together.
pub struct Components {
    pub screener: CallScreener,
    pub importer: Option<Arc<ContactManager>>,
    pub recent: RecentEvents,
}

/// Builds stores, logger, notifier and screener on top of `prefs`.
///
/// Must be called inside a tokio runtime (the logger spawns its sink tasks).
pub fn init_components(config: &Config, prefs: Arc<dyn PreferenceStore>) -> Components {
    let contacts = Arc::new(ContactStore::new(prefs.clone()));
    let blocked = Arc::new(BlockedCallLog::new(prefs.clone(), config.retention.clone()));
    let toggle = Arc::new(BlockingToggle::new(prefs, config.blocking.default_enabled));

    let memory_sink = MemoryLogSink::new(config.logging.recent_capacity);
    let recent = memory_sink.clone_buffer();
    let extra_sinks: Vec<Box<dyn ScreeningLogSink>> = vec![Box::new(memory_sink)];
    let logger = ScreeningLogger::new(config.logging.clone(), extra_sinks);

    let notifier: Arc<dyn CallNotifier> = if config.notifications.enable {
        Arc::new(LogNotifier)
    } else {
        Arc::new(NoopNotifier)
    };

    let stats = StatsCollector::new();
    if config.stats.enable {
        stats.spawn_reporter(config.stats.log_interval_seconds);
    }

    let importer = config.contacts.import_path.as_ref().map(|path| {
        Arc::new(ContactManager::new(
            Arc::new(FileContactProvider::new(path)),
            contacts.clone(),
        ))
    });

    let screener = CallScreener::new(contacts, blocked, toggle, logger, notifier, stats);

    Components {
        screener,
        importer,
        recent,
    }
}

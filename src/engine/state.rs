use crate::store::PreferenceStore;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const BLOCKING_ENABLED_KEY: &str = "blocking_enabled";

/// Persisted on/off switch for screening.
///
/// When off, every call is allowed and nothing is logged. The flag is checked
/// before the allow-list is consulted.
pub struct BlockingToggle {
    prefs: Arc<dyn PreferenceStore>,
    default_enabled: bool,
    tx: watch::Sender<bool>,
}

impl BlockingToggle {
    pub fn new(prefs: Arc<dyn PreferenceStore>, default_enabled: bool) -> Self {
        let current = read_flag(prefs.as_ref(), default_enabled);
        let (tx, _rx) = watch::channel(current);
        Self {
            prefs,
            default_enabled,
            tx,
        }
    }

    /// Reads the persisted flag; absent or unreadable values give the default.
    pub fn is_enabled(&self) -> bool {
        read_flag(self.prefs.as_ref(), self.default_enabled)
    }

    /// Flips the flag atomically and returns the new value.
    pub fn toggle(&self) -> Result<bool> {
        let default_enabled = self.default_enabled;
        let stored = self.prefs.update(BLOCKING_ENABLED_KEY, &mut |current| {
            let enabled = parse_flag(current.as_deref()).unwrap_or(default_enabled);
            Ok((!enabled).to_string())
        })?;
        let enabled = parse_flag(Some(&stored)).unwrap_or(default_enabled);
        self.publish(enabled);
        Ok(enabled)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.prefs.put(BLOCKING_ENABLED_KEY, &enabled.to_string())?;
        self.publish(enabled);
        Ok(())
    }

    pub fn observe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn publish(&self, enabled: bool) {
        info!(
            "Call blocking {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.tx.send_replace(enabled);
    }
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn read_flag(prefs: &dyn PreferenceStore, default_enabled: bool) -> bool {
    match prefs.get(BLOCKING_ENABLED_KEY) {
        Ok(raw) => parse_flag(raw.as_deref()).unwrap_or(default_enabled),
        Err(e) => {
            warn!("Failed to read blocking flag, using default: {:#}", e);
            default_enabled
        }
    }
}

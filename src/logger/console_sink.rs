use crate::config::LoggingConfig;
use crate::logger::types::{ScreeningAction, ScreeningLogEntry, ScreeningLogSink};
use tracing::info;

pub struct ConsoleLogSink {
    config: LoggingConfig,
}

impl ConsoleLogSink {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    fn should_log(&self, entry: &ScreeningLogEntry) -> bool {
        if !self.config.enable {
            return false;
        }
        match entry.action {
            ScreeningAction::Blocked => self.config.log_blocked,
            ScreeningAction::Allowed => self.config.log_allowed,
        }
    }
}

impl ScreeningLogSink for ConsoleLogSink {
    fn log(&self, entry: &ScreeningLogEntry) {
        if !self.should_log(entry) {
            return;
        }

        let number = entry.number.as_deref().unwrap_or("<unknown>");
        if self.config.format == "json" {
            // Structured fields via tracing
            info!(
                target: "call_screen",
                number = %number,
                direction = ?entry.direction,
                action = ?entry.action,
                reason = ?entry.reason,
                latency_us = entry.latency_us,
                ts = entry.timestamp
            );
        } else {
            let action_str = match entry.action {
                ScreeningAction::Blocked => format!("blocked ({:?})", entry.reason),
                ScreeningAction::Allowed => format!("allowed ({:?})", entry.reason),
            };
            info!(
                "[{:?}] {} -> {} [{}us]",
                entry.direction, number, action_str, entry.latency_us
            );
        }
    }
}

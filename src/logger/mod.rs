pub mod console_sink;
pub mod memory_sink;
pub mod types;

pub use self::console_sink::ConsoleLogSink;
pub use self::memory_sink::{MemoryLogSink, RecentEvents};
pub use self::types::{ScreeningAction, ScreeningLogEntry, ScreeningLogSink};

use crate::config::LoggingConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Fans screening events out to sinks, each drained by its own task.
pub struct ScreeningLogger {
    sinks: Vec<mpsc::Sender<ScreeningLogEntry>>,
}

impl ScreeningLogger {
    /// Must be called inside a tokio runtime.
    pub fn new(config: LoggingConfig, extra_sinks: Vec<Box<dyn ScreeningLogSink>>) -> Arc<Self> {
        let mut boxed: Vec<Box<dyn ScreeningLogSink>> = Vec::new();

        for sink_type in &config.sinks {
            if sink_type == "console" {
                boxed.push(Box::new(ConsoleLogSink::new(config.clone())));
            } else {
                warn!("Unknown log sink type: {}", sink_type);
            }
        }
        boxed.extend(extra_sinks);

        let sinks = boxed
            .into_iter()
            .map(|sink| {
                let (tx, mut rx) = mpsc::channel::<ScreeningLogEntry>(1000);
                tokio::spawn(async move {
                    while let Some(entry) = rx.recv().await {
                        sink.log(&entry);
                    }
                });
                tx
            })
            .collect();

        Arc::new(Self { sinks })
    }

    pub async fn log(&self, entry: ScreeningLogEntry) {
        let len = self.sinks.len();
        for (i, sink) in self.sinks.iter().enumerate() {
            // Fire and forget, don't stall screening if a buffer is full
            if i == len - 1 {
                let _ = sink.try_send(entry);
                break;
            }
            let _ = sink.try_send(entry.clone());
        }
    }
}

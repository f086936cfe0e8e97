use super::{ScreeningLogEntry, ScreeningLogSink};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Ring buffer of the most recent screening events.
pub struct MemoryLogSink {
    buffer: Arc<RwLock<VecDeque<ScreeningLogEntry>>>,
    capacity: usize,
}

impl MemoryLogSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    // Allow sharing the buffer with the host session
    pub fn clone_buffer(&self) -> RecentEvents {
        RecentEvents {
            buffer: self.buffer.clone(),
        }
    }
}

impl ScreeningLogSink for MemoryLogSink {
    fn log(&self, entry: &ScreeningLogEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut buffer = self.buffer.write();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry.clone());
    }
}

/// Read handle onto a [`MemoryLogSink`] buffer.
#[derive(Clone, Default)]
pub struct RecentEvents {
    buffer: Arc<RwLock<VecDeque<ScreeningLogEntry>>>,
}

impl RecentEvents {
    /// Newest first.
    pub fn latest(&self, limit: usize) -> Vec<ScreeningLogEntry> {
        let buffer = self.buffer.read();
        buffer.iter().rev().take(limit).cloned().collect()
    }
}

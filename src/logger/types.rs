use crate::engine::DecisionReason;
use crate::model::CallDirection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningLogEntry {
    /// Normalized caller number, if the platform supplied one.
    pub number: Option<String>,
    pub direction: CallDirection,
    pub action: ScreeningAction,
    pub reason: DecisionReason,
    pub latency_us: u64,
    /// Millisecond epoch.
    pub timestamp: i64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum ScreeningAction {
    Allowed,
    Blocked,
}

pub trait ScreeningLogSink: Send + Sync {
    fn log(&self, entry: &ScreeningLogEntry);
}

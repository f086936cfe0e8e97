//! Data behind the single user-facing screen: the blocking switch and the
//! list of blocked calls.

use crate::engine::BlockingToggle;
use crate::model::BlockedCall;
use crate::store::BlockedCallLog;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct MainView {
    pub blocking_enabled: bool,
    pub title: &'static str,
    pub rows: Vec<BlockedCallRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedCallRow {
    /// Empty when the caller number was hidden.
    pub phone: String,
    pub when: String,
}

impl BlockedCallRow {
    pub fn from_call(call: &BlockedCall) -> Self {
        Self {
            phone: call.phone.clone().unwrap_or_default(),
            when: format_timestamp(call.date),
        }
    }

    /// Text placed on the clipboard when the row is tapped.
    pub fn clipboard_text(&self) -> &str {
        &self.phone
    }
}

impl MainView {
    pub fn build(toggle: &BlockingToggle, log: &BlockedCallLog) -> Self {
        Self::from_parts(toggle.is_enabled(), &log.snapshot())
    }

    /// `calls` are expected newest first, as the log returns them.
    pub fn from_parts(blocking_enabled: bool, calls: &[BlockedCall]) -> Self {
        Self {
            blocking_enabled,
            title: status_title(blocking_enabled),
            rows: calls.iter().map(BlockedCallRow::from_call).collect(),
        }
    }
}

pub fn status_title(enabled: bool) -> &'static str {
    if enabled {
        "Blocking enabled"
    } else {
        "Blocking disabled"
    }
}

/// `dd-MM-yyyy HH:mm:ss` in the device's local time zone.
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

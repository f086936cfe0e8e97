//! Line-delimited JSON protocol spoken by the binary with its host platform.
//!
//! Each input line is one [`HostRequest`]; each produces exactly one output
//! line. A malformed line yields an `error` response and does not stop the
//! session.

use crate::engine::ContactManager;
use crate::logger::{RecentEvents, ScreeningLogEntry};
use crate::model::{CallDetails, CallResponse, Contact};
use crate::screener::CallScreener;
use crate::stats::StatsSnapshot;
use crate::view::MainView;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostRequest {
    Screen(CallDetails),
    ImportContacts { contacts: Vec<Contact> },
    ReloadContacts,
    Toggle,
    Status,
    Blocked,
    Recent {
        #[serde(default = "default_recent_limit")]
        limit: usize,
    },
}

fn default_recent_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostResponse {
    Screened(CallResponse),
    Imported { allowed_numbers: usize },
    Toggled { enabled: bool },
    Status {
        enabled: bool,
        stats: StatsSnapshot,
    },
    Blocked(MainView),
    Recent { events: Vec<ScreeningLogEntry> },
    Error { message: String },
}

pub struct HostSession {
    screener: CallScreener,
    importer: Option<Arc<ContactManager>>,
    recent: RecentEvents,
}

impl HostSession {
    pub fn new(
        screener: CallScreener,
        importer: Option<Arc<ContactManager>>,
        recent: RecentEvents,
    ) -> Self {
        Self {
            screener,
            importer,
            recent,
        }
    }

    /// Handles one raw input line and returns the encoded response line.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<HostRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected malformed host request: {}", e);
                HostResponse::Error {
                    message: format!("invalid request: {}", e),
                }
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            error!("Failed to encode host response: {}", e);
            r#"{"kind":"error","message":"encoding failed"}"#.to_string()
        })
    }

    pub async fn handle(&self, request: HostRequest) -> HostResponse {
        match request {
            HostRequest::Screen(call) => HostResponse::Screened(self.screener.screen(&call).await),
            HostRequest::ImportContacts { contacts } => {
                match self.screener.contacts().save_contacts(contacts) {
                    Ok(list) => HostResponse::Imported {
                        allowed_numbers: list.len(),
                    },
                    Err(e) => HostResponse::Error {
                        message: format!("{:#}", e),
                    },
                }
            }
            HostRequest::ReloadContacts => {
                let list = match &self.importer {
                    Some(importer) => importer.refresh().await,
                    None => self.screener.contacts().reload(),
                };
                HostResponse::Imported {
                    allowed_numbers: list.len(),
                }
            }
            HostRequest::Toggle => match self.screener.toggle().toggle() {
                Ok(enabled) => HostResponse::Toggled { enabled },
                Err(e) => HostResponse::Error {
                    message: format!("{:#}", e),
                },
            },
            HostRequest::Status => HostResponse::Status {
                enabled: self.screener.toggle().is_enabled(),
                stats: self.screener.stats().get_snapshot(),
            },
            HostRequest::Blocked => HostResponse::Blocked(MainView::build(
                self.screener.toggle(),
                self.screener.blocked_calls(),
            )),
            HostRequest::Recent { limit } => HostResponse::Recent {
                events: self.recent.latest(limit),
            },
        }
    }
}

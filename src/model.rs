use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One imported address-book entry. `phone` is stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

/// A rejected call. Timestamps are persisted as millisecond epoch values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCall {
    pub phone: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

impl BlockedCall {
    pub fn new(phone: Option<String>, date: DateTime<Utc>) -> Self {
        Self { phone, date }
    }

    /// Stamps the call with the current time.
    pub fn now(phone: Option<String>) -> Self {
        Self::new(phone, Utc::now())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    #[default]
    Incoming,
    Outgoing,
    Unknown,
}

/// What the interception boundary hands us for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDetails {
    /// Raw caller number as delivered by the platform, if any.
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub direction: CallDirection,
}

impl CallDetails {
    pub fn incoming(number: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            direction: CallDirection::Incoming,
        }
    }
}

/// Answer returned to the interception boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResponse {
    pub disallow_call: bool,
    pub reject_call: bool,
}

impl CallResponse {
    pub fn allow() -> Self {
        Self {
            disallow_call: false,
            reject_call: false,
        }
    }

    pub fn reject() -> Self {
        Self {
            disallow_call: true,
            reject_call: true,
        }
    }
}

//! Call screening against a contact allow-list.
//!
//! An inbound number is normalized, checked against the numbers of the
//! imported contacts, and rejected calls are kept in a persisted,
//! observable blocked-call log.

pub mod config;
pub mod engine;
pub mod host;
pub mod init;
pub mod logger;
pub mod model;
pub mod notify;
pub mod number;
pub mod screener;
pub mod stats;
pub mod store;
pub mod view;

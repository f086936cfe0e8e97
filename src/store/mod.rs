//! Persistence: a string key-value backend plus the typed stores built on it.

mod blocked;
mod contacts;
mod prefs;
mod sqlite;

pub use blocked::{BlockedCallLog, BLOCKED_CALLS_KEY};
pub use contacts::{ContactStore, CONTACTS_KEY};
pub use prefs::{MemoryPreferences, PreferenceStore, UpdateFn};
pub use sqlite::SqlitePreferences;

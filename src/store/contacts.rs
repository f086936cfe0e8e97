use super::prefs::PreferenceStore;
use crate::engine::HashedAllowList;
use crate::model::Contact;
use crate::number;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub const CONTACTS_KEY: &str = "contacts_key";

/// Persisted contact list and the allow-list derived from it.
///
/// The allow-list is kept in memory and swapped wholesale whenever the list
/// is saved or reloaded, so the screening path never parses JSON.
pub struct ContactStore {
    prefs: Arc<dyn PreferenceStore>,
    allow_list: ArcSwap<HashedAllowList>,
    // Keeps storage and the in-memory list on the same save
    write_lock: Mutex<()>,
}

impl ContactStore {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        let contacts = load_from(prefs.as_ref());
        let allow_list = HashedAllowList::from_contacts(&contacts);
        info!("Loaded {} contacts into allow-list", allow_list.len());
        Self {
            prefs,
            allow_list: ArcSwap::from_pointee(allow_list),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the stored list. Phones are normalized here so the screening
    /// path only ever normalizes the inbound number.
    pub fn save_contacts(&self, contacts: Vec<Contact>) -> Result<Arc<HashedAllowList>> {
        let contacts: Vec<Contact> = contacts
            .into_iter()
            .map(|c| Contact {
                phone: number::normalize(&c.phone),
                name: c.name,
            })
            .collect();

        let json = serde_json::to_string(&contacts).context("Failed to encode contacts")?;
        let allow_list = Arc::new(HashedAllowList::from_contacts(&contacts));

        let _guard = self.write_lock.lock();
        self.prefs.put(CONTACTS_KEY, &json)?;
        self.allow_list.store(allow_list.clone());
        info!(
            "Saved {} contacts ({} distinct allowed numbers)",
            contacts.len(),
            allow_list.len()
        );
        Ok(allow_list)
    }

    /// Absent or unreadable data reads as an empty list.
    pub fn load_contacts(&self) -> Vec<Contact> {
        load_from(self.prefs.as_ref())
    }

    pub fn current_phones(&self) -> FxHashSet<String> {
        self.load_contacts().into_iter().map(|c| c.phone).collect()
    }

    pub fn allow_list(&self) -> Arc<HashedAllowList> {
        self.allow_list.load_full()
    }

    /// Re-reads the backend, picking up lists written by another context.
    pub fn reload(&self) -> Arc<HashedAllowList> {
        let _guard = self.write_lock.lock();
        let allow_list = Arc::new(HashedAllowList::from_contacts(&self.load_contacts()));
        self.allow_list.store(allow_list.clone());
        allow_list
    }
}

fn load_from(prefs: &dyn PreferenceStore) -> Vec<Contact> {
    let raw = match prefs.get(CONTACTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read contacts, treating as empty: {:#}", e);
            return Vec::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Stored contacts are not valid JSON, treating as empty: {}", e);
        Vec::new()
    })
}

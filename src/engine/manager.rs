use super::matcher::HashedAllowList;
use super::traits::ContactProvider;
use crate::model::Contact;
use crate::store::ContactStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Reads an address-book export from disk.
///
/// Accepts either a JSON array of `{name, phone}` objects or one
/// `name;phone` pair per line (`#` comments and blank lines skipped).
pub struct FileContactProvider {
    path: PathBuf,
    label: String,
}

impl FileContactProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    fn parse_line(line: &str) -> Option<Contact> {
        let line = line.trim();
        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        // A bare number is a contact without a name
        let (name, phone) = match line.rsplit_once(';') {
            Some((name, phone)) => (name.trim(), phone.trim()),
            None => ("", line),
        };
        if phone.is_empty() {
            return None;
        }
        Some(Contact {
            name: name.to_string(),
            phone: phone.to_string(),
        })
    }

    fn parse_contents(text: &str) -> Result<Vec<Contact>> {
        if text.trim_start().starts_with('[') {
            return serde_json::from_str(text).context("Failed to parse contacts JSON");
        }
        Ok(text.lines().filter_map(Self::parse_line).collect())
    }
}

#[async_trait::async_trait]
impl ContactProvider for FileContactProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<Contact>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read contacts from {}", self.label))?;
        Self::parse_contents(&text)
    }
}

/// Pulls contacts from a provider into the [`ContactStore`].
pub struct ContactManager {
    provider: Arc<dyn ContactProvider>,
    store: Arc<ContactStore>,
}

impl ContactManager {
    pub fn new(provider: Arc<dyn ContactProvider>, store: Arc<ContactStore>) -> Self {
        Self { provider, store }
    }

    /// Imports the provider's current list. A failed fetch or save keeps the
    /// previous allow-list in place.
    pub async fn refresh(&self) -> Arc<HashedAllowList> {
        info!("Importing contacts from {}...", self.provider.name());
        match self.try_refresh().await {
            Ok(list) => {
                info!("Contact import complete. Allowed numbers: {}", list.len());
                list
            }
            Err(e) => {
                error!(
                    "Contact import from {} failed: {:#}",
                    self.provider.name(),
                    e
                );
                self.store.allow_list()
            }
        }
    }

    async fn try_refresh(&self) -> Result<Arc<HashedAllowList>> {
        let contacts = self.provider.fetch().await?;
        self.store.save_contacts(contacts)
    }
}

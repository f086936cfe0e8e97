use crate::model::Contact;
use anyhow::Result;

/// The "Hot Path" check for one inbound number.
pub trait AllowListMatcher: Send + Sync {
    /// `phone` must already be normalized. Exact string membership only.
    fn is_allowed(&self, phone: &str) -> bool;
}

/// The "Control Plane" source of contacts, i.e. the device address book.
#[async_trait::async_trait]
pub trait ContactProvider: Send + Sync {
    /// Human-readable origin, for logs.
    fn name(&self) -> &str;

    /// Returns the raw (not yet normalized) contact list.
    async fn fetch(&self) -> Result<Vec<Contact>>;
}

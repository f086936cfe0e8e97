use super::traits::AllowListMatcher;
use crate::model::Contact;
use crate::number;
use rustc_hash::FxHashSet;

/// In-memory allow-list over FxHashSet<Box<str>>.
#[derive(Debug, Default)]
pub struct HashedAllowList {
    phones: FxHashSet<Box<str>>,
}

impl HashedAllowList {
    /// Entries without digits are dropped so a blank inbound number can
    /// never match.
    pub fn new<I, S>(phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phones = phones
            .into_iter()
            .map(Into::<String>::into)
            .filter(|p| !number::is_blank(p))
            .map(String::into_boxed_str)
            .collect();
        Self { phones }
    }

    pub fn from_contacts(contacts: &[Contact]) -> Self {
        Self::new(contacts.iter().map(|c| c.phone.as_str()))
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }
}

impl AllowListMatcher for HashedAllowList {
    fn is_allowed(&self, phone: &str) -> bool {
        self.phones.contains(phone)
    }
}

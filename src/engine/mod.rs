mod decision;
mod manager;
mod matcher;
pub mod state;
mod traits;

pub use decision::{decide, Decision, DecisionReason};
pub use manager::{ContactManager, FileContactProvider};
pub use matcher::HashedAllowList;
pub use state::BlockingToggle;
pub use traits::{AllowListMatcher, ContactProvider};

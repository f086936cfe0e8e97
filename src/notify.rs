//! User notifications raised for rejected calls.

use crate::model::BlockedCall;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use tracing::info;

/// What the platform shows when a call is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedCallNotification {
    /// Same number, same id: a repeat caller replaces the earlier notification.
    pub id: u64,
    pub title: String,
    pub body: String,
}

impl BlockedCallNotification {
    pub fn for_call(call: &BlockedCall) -> Self {
        let mut hasher = FxHasher::default();
        call.phone.hash(&mut hasher);
        let phone = call.phone.as_deref().unwrap_or("unknown");
        Self {
            id: hasher.finish(),
            title: "Call blocked".to_string(),
            body: format!("Number: {}", phone),
        }
    }
}

pub trait CallNotifier: Send + Sync {
    fn notify_blocked(&self, call: &BlockedCall);
}

/// Emits notifications through `tracing` under the `notification` target.
pub struct LogNotifier;

impl CallNotifier for LogNotifier {
    fn notify_blocked(&self, call: &BlockedCall) {
        let n = BlockedCallNotification::for_call(call);
        info!(target: "notification", id = n.id, "{}: {}", n.title, n.body);
    }
}

/// Used when notifications are switched off.
pub struct NoopNotifier;

impl CallNotifier for NoopNotifier {
    fn notify_blocked(&self, _call: &BlockedCall) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_notification_text() {
        let n = BlockedCallNotification::for_call(&BlockedCall::now(Some("+15559999999".into())));
        assert_eq!(n.title, "Call blocked");
        assert_eq!(n.body, "Number: +15559999999");

        let unknown = BlockedCallNotification::for_call(&BlockedCall::now(None));
        assert_eq!(unknown.body, "Number: unknown");
    }

    #[test]
    fn test_repeat_caller_reuses_id() {
        let now = Utc::now();
        let a = BlockedCall::new(Some("+1".into()), now);
        let b = BlockedCall::new(Some("+1".into()), now + Duration::minutes(5));
        let c = BlockedCall::new(Some("+2".into()), now);

        let id = |call: &BlockedCall| BlockedCallNotification::for_call(call).id;
        assert_eq!(id(&a), id(&b));
        assert_ne!(id(&a), id(&c));
    }
}

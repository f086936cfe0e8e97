use super::traits::AllowListMatcher;
use crate::number;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    AllowListed,
    NotAllowListed,
    /// Null, empty or digit-less caller number.
    MissingNumber,
    BlockingDisabled,
    Outgoing,
}

/// Outcome for one call. `number` is the normalized caller number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allow: bool,
    pub reason: DecisionReason,
    pub number: Option<String>,
}

impl Decision {
    /// Allowed without consulting the allow-list.
    pub fn bypass(raw: Option<&str>, reason: DecisionReason) -> Self {
        Self {
            allow: true,
            reason,
            number: number::normalize_opt(raw),
        }
    }
}

/// Allow iff the normalized number is an exact member of `allow_list`.
///
/// Pure: logging the rejection is the caller's job.
pub fn decide(raw: Option<&str>, allow_list: &dyn AllowListMatcher) -> Decision {
    let normalized = number::normalize_opt(raw);
    let (allow, reason) = match normalized.as_deref() {
        None => (false, DecisionReason::MissingNumber),
        Some(n) if number::is_blank(n) => (false, DecisionReason::MissingNumber),
        Some(n) if allow_list.is_allowed(n) => (true, DecisionReason::AllowListed),
        Some(_) => (false, DecisionReason::NotAllowListed),
    };
    Decision {
        allow,
        reason,
        number: normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HashedAllowList;

    struct AllowEverything;
    impl AllowListMatcher for AllowEverything {
        fn is_allowed(&self, _phone: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_member_is_allowed() {
        let list = HashedAllowList::new(["+15551234567"]);
        let d = decide(Some("+1 (555) 123-4567"), &list);
        assert!(d.allow);
        assert_eq!(d.reason, DecisionReason::AllowListed);
        assert_eq!(d.number.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn test_exact_match_only() {
        let list = HashedAllowList::new(["+79197102196"]);
        let d = decide(Some("79197102196"), &list);
        assert!(!d.allow);
        assert_eq!(d.reason, DecisionReason::NotAllowListed);
        assert_eq!(d.number.as_deref(), Some("79197102196"));
    }

    #[test]
    fn test_blank_numbers_always_rejected() {
        // Even a matcher that says yes to everything cannot admit a blank number
        for raw in [None, Some(""), Some("   "), Some("+"), Some("private")] {
            let d = decide(raw, &AllowEverything);
            assert!(!d.allow, "{:?} should be rejected", raw);
            assert_eq!(d.reason, DecisionReason::MissingNumber);
        }
        assert_eq!(decide(None, &AllowEverything).number, None);
        assert_eq!(
            decide(Some("private"), &AllowEverything).number.as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_bypass_keeps_number() {
        let d = Decision::bypass(Some("+1 555"), DecisionReason::BlockingDisabled);
        assert!(d.allow);
        assert_eq!(d.number.as_deref(), Some("+1555"));
    }
}

use super::prefs::PreferenceStore;
use crate::config::RetentionConfig;
use crate::model::BlockedCall;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const BLOCKED_CALLS_KEY: &str = "blocked_calls_key";

/// Append-only record of rejected calls.
///
/// Readers get the list newest first. Every change is pushed to
/// [`observe`](Self::observe) subscribers.
pub struct BlockedCallLog {
    prefs: Arc<dyn PreferenceStore>,
    max_entries: Option<usize>,
    max_age: Option<Duration>,
    tx: watch::Sender<Arc<Vec<BlockedCall>>>,
    write_lock: Mutex<()>,
}

impl BlockedCallLog {
    pub fn new(prefs: Arc<dyn PreferenceStore>, retention: RetentionConfig) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        let log = Self {
            prefs,
            max_entries: retention.max_entries.filter(|m| *m > 0),
            max_age: max_age(&retention),
            tx,
            write_lock: Mutex::new(()),
        };
        log.tx.send_replace(Arc::new(log.snapshot()));
        log
    }

    /// Records one rejected call and publishes the new list.
    pub fn append(&self, call: BlockedCall) -> Result<()> {
        self.append_at(call, Utc::now())
    }

    fn append_at(&self, call: BlockedCall, now: DateTime<Utc>) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut published = Vec::new();

        self.prefs.update(BLOCKED_CALLS_KEY, &mut |current| {
            let mut calls = current.as_deref().map(decode).unwrap_or_default();
            calls.insert(0, call.clone());
            let mut calls = sorted(calls);
            self.apply_retention(&mut calls, now);
            let json = serde_json::to_string(&calls).context("Failed to encode blocked calls")?;
            published = calls;
            Ok(json)
        })?;

        debug!("Blocked-call log now holds {} entries", published.len());
        self.tx.send_replace(Arc::new(published));
        Ok(())
    }

    /// Current entries, most recent first. Storage errors read as empty.
    ///
    /// Entries past the age limit are hidden here even before the next
    /// append evicts them from storage.
    pub fn snapshot(&self) -> Vec<BlockedCall> {
        let mut calls = sorted(load_from(self.prefs.as_ref()));
        if let Some(cutoff) = self.age_cutoff(Utc::now()) {
            calls.retain(|c| c.date >= cutoff);
        }
        calls
    }

    /// Live view of the log; the receiver always holds the latest list.
    pub fn observe(&self) -> watch::Receiver<Arc<Vec<BlockedCall>>> {
        self.tx.subscribe()
    }

    /// Re-reads the backend and publishes, for writes made by another context.
    pub fn reload(&self) {
        self.tx.send_replace(Arc::new(self.snapshot()));
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn age_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.max_age.and_then(|age| now.checked_sub_signed(age))
    }

    /// Expects `calls` newest first.
    fn apply_retention(&self, calls: &mut Vec<BlockedCall>, now: DateTime<Utc>) {
        if let Some(cutoff) = self.age_cutoff(now) {
            calls.retain(|c| c.date >= cutoff);
        }
        if let Some(max) = self.max_entries {
            calls.truncate(max);
        }
    }
}

/// `0` and values chrono cannot represent mean no age limit.
fn max_age(retention: &RetentionConfig) -> Option<Duration> {
    let hours = retention.max_age_hours.filter(|h| *h > 0)?;
    let age = i64::try_from(hours).ok().and_then(Duration::try_hours);
    if age.is_none() {
        warn!(
            "retention.max_age_hours = {} is out of range, keeping entries of any age",
            hours
        );
    }
    age
}

fn decode(raw: &str) -> Vec<BlockedCall> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Stored blocked calls are not valid JSON, treating as empty: {}", e);
        Vec::new()
    })
}

fn load_from(prefs: &dyn PreferenceStore) -> Vec<BlockedCall> {
    match prefs.get(BLOCKED_CALLS_KEY) {
        Ok(Some(raw)) => decode(&raw),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Failed to read blocked calls, treating as empty: {:#}", e);
            Vec::new()
        }
    }
}

/// Stable sort, newest first. Ties keep their stored order.
fn sorted(mut calls: Vec<BlockedCall>) -> Vec<BlockedCall> {
    calls.sort_by(|a, b| b.date.cmp(&a.date));
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPreferences;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn call(phone: &str, ms: i64) -> BlockedCall {
        BlockedCall::new(Some(phone.to_string()), at(ms))
    }

    fn log_with(retention: RetentionConfig) -> (Arc<MemoryPreferences>, BlockedCallLog) {
        let prefs = Arc::new(MemoryPreferences::new());
        let log = BlockedCallLog::new(prefs.clone(), retention);
        (prefs, log)
    }

    #[test]
    fn test_append_then_read_is_sorted_descending() {
        let (_prefs, log) = log_with(RetentionConfig::unbounded());
        let now = at(10_000);
        for (i, ms) in [3_000, 1_000, 5_000, 2_000, 4_000].iter().enumerate() {
            log.append_at(call(&format!("+{}", i), *ms), now).unwrap();
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 5);
        let dates: Vec<i64> = snapshot.iter().map(|c| c.date.timestamp_millis()).collect();
        assert_eq!(dates, vec![5_000, 4_000, 3_000, 2_000, 1_000]);
    }

    #[test]
    fn test_equal_timestamps_newest_append_first() {
        let (_prefs, log) = log_with(RetentionConfig::unbounded());
        log.append_at(call("+1", 1_000), at(1_000)).unwrap();
        log.append_at(call("+2", 1_000), at(1_000)).unwrap();

        let phones: Vec<_> = log
            .snapshot()
            .into_iter()
            .filter_map(|c| c.phone)
            .collect();
        assert_eq!(phones, vec!["+2", "+1"]);
    }

    #[test]
    fn test_legacy_insertion_order_is_resorted() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs
            .put(
                BLOCKED_CALLS_KEY,
                r#"[{"phone":"+1","date":1000},{"phone":"+2","date":2000}]"#,
            )
            .unwrap();
        let log = BlockedCallLog::new(prefs, RetentionConfig::unbounded());

        assert_eq!(log.snapshot()[0].phone.as_deref(), Some("+2"));
        assert_eq!(log.observe().borrow()[0].phone.as_deref(), Some("+2"));
    }

    #[test]
    fn test_observe_receives_appends() {
        let (_prefs, log) = log_with(RetentionConfig::unbounded());
        let mut rx = log.observe();
        assert!(rx.borrow_and_update().is_empty());

        log.append(BlockedCall::now(Some("+15559999999".into())))
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].phone.as_deref(), Some("+15559999999"));
    }

    #[test]
    fn test_retention_caps_by_count() {
        let (_prefs, log) = log_with(RetentionConfig {
            max_entries: Some(3),
            max_age_hours: None,
        });
        for ms in 1..=5 {
            log.append_at(call("+1", ms * 1_000), at(10_000)).unwrap();
        }
        let dates: Vec<i64> = log
            .snapshot()
            .iter()
            .map(|c| c.date.timestamp_millis())
            .collect();
        assert_eq!(dates, vec![5_000, 4_000, 3_000]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_retention_drops_by_age() {
        let (_prefs, log) = log_with(RetentionConfig {
            max_entries: None,
            max_age_hours: Some(24),
        });
        let now = Utc::now();
        log.append_at(
            BlockedCall::new(Some("+old".into()), now - Duration::hours(48)),
            now,
        )
        .unwrap();
        log.append_at(
            BlockedCall::new(Some("+new".into()), now - Duration::hours(1)),
            now,
        )
        .unwrap();

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].phone.as_deref(), Some("+new"));
    }

    #[test]
    fn test_zero_limits_mean_unbounded() {
        let (_prefs, log) = log_with(RetentionConfig {
            max_entries: Some(0),
            max_age_hours: Some(0),
        });
        for ms in 1..=4 {
            log.append_at(call("+1", ms), at(1_000_000_000)).unwrap();
        }
        assert_eq!(log.snapshot().len(), 4);
    }

    #[test]
    fn test_huge_age_limit_means_unbounded() {
        for hours in [u64::MAX, 3_000_000_000_000] {
            let (_prefs, log) = log_with(RetentionConfig {
                max_entries: None,
                max_age_hours: Some(hours),
            });
            let now = Utc::now();
            log.append_at(
                BlockedCall::new(Some("+old".into()), now - Duration::days(3650)),
                now,
            )
            .unwrap();
            log.append_at(BlockedCall::new(Some("+new".into()), now), now)
                .unwrap();

            assert_eq!(log.snapshot().len(), 2, "max_age_hours = {}", hours);
            assert_eq!(log.len(), 2);
        }
    }

    #[test]
    fn test_expired_entries_are_hidden_before_next_append() {
        let prefs = Arc::new(MemoryPreferences::new());
        let now = Utc::now();
        let stale = (now - Duration::hours(48)).timestamp_millis();
        let fresh = (now - Duration::hours(1)).timestamp_millis();
        prefs
            .put(
                BLOCKED_CALLS_KEY,
                &format!(
                    r#"[{{"phone":"+fresh","date":{}}},{{"phone":"+stale","date":{}}}]"#,
                    fresh, stale
                ),
            )
            .unwrap();
        let log = BlockedCallLog::new(
            prefs,
            RetentionConfig {
                max_entries: None,
                max_age_hours: Some(24),
            },
        );

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].phone.as_deref(), Some("+fresh"));
        assert_eq!(log.observe().borrow().len(), 1);
    }

    #[test]
    fn test_corrupt_list_is_replaced_on_append() {
        let (prefs, log) = log_with(RetentionConfig::default());
        prefs.put(BLOCKED_CALLS_KEY, "garbage").unwrap();
        assert!(log.snapshot().is_empty());

        log.append(BlockedCall::now(None)).unwrap();
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].phone, None);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let (_prefs, log) = log_with(RetentionConfig::unbounded());
        let log = Arc::new(log);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(BlockedCall::now(Some(format!("+{}{}", t, i))))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.snapshot().len(), 100);
        assert_eq!(log.len(), 100);
    }
}

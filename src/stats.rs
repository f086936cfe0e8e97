use crate::engine::DecisionReason;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{self, Duration};
use tracing::info;

/// Distinct blocked numbers tracked for the top list before pruning.
const MAX_TRACKED_NUMBERS: usize = 1024;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TopItem {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub screened: u64,
    pub allowed: u64,
    pub blocked: u64,
    pub bypassed: u64,
    pub missing_number: u64,
    pub top_blocked_numbers: Vec<TopItem>,
    pub started_at: u64,
}

#[derive(Debug)]
pub struct StatsCollector {
    screened: AtomicU64,
    allowed: AtomicU64,
    blocked: AtomicU64,
    // Allowed without consulting the allow-list (toggle off, outgoing)
    bypassed: AtomicU64,
    missing_number: AtomicU64,
    blocked_numbers: Mutex<FxHashMap<String, u64>>,
    started_at: u64,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self {
            screened: AtomicU64::new(0),
            allowed: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
            missing_number: AtomicU64::new(0),
            blocked_numbers: Mutex::new(FxHashMap::default()),
            started_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
}

impl StatsCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawns the periodic STATS DUMP task. Needs a tokio runtime.
    pub fn spawn_reporter(self: &Arc<Self>, log_interval_sec: u64) {
        if log_interval_sec == 0 {
            return;
        }
        let stats = self.clone();
        tokio::spawn(async move {
            stats.run_logger(Duration::from_secs(log_interval_sec)).await;
        });
    }

    pub fn record(&self, allow: bool, reason: DecisionReason, number: Option<&str>) {
        self.screened.fetch_add(1, Ordering::Relaxed);
        match reason {
            DecisionReason::BlockingDisabled | DecisionReason::Outgoing => {
                self.bypassed.fetch_add(1, Ordering::Relaxed);
            }
            DecisionReason::MissingNumber => {
                self.missing_number.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        if allow {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.blocked.fetch_add(1, Ordering::Relaxed);
            let key = number.filter(|n| !n.is_empty()).unwrap_or("unknown");
            let mut counts = self.blocked_numbers.lock();
            if counts.len() >= MAX_TRACKED_NUMBERS && !counts.contains_key(key) {
                prune_counts(&mut counts, MAX_TRACKED_NUMBERS / 2);
            }
            *counts.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    pub fn get_snapshot(&self) -> StatsSnapshot {
        let mut top: Vec<TopItem> = self
            .blocked_numbers
            .lock()
            .iter()
            .map(|(name, count)| TopItem {
                name: name.clone(),
                count: *count,
            })
            .collect();
        top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top.truncate(5);

        StatsSnapshot {
            screened: self.screened.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            missing_number: self.missing_number.load(Ordering::Relaxed),
            top_blocked_numbers: top,
            started_at: self.started_at,
        }
    }

    async fn run_logger(&self, log_interval: Duration) {
        let mut interval = time::interval(log_interval);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let s = self.get_snapshot();
        let pct = |n: u64| {
            if s.screened > 0 {
                (n as f64 / s.screened as f64) * 100.0
            } else {
                0.0
            }
        };

        let mut top_stats = String::new();
        for item in &s.top_blocked_numbers {
            top_stats.push_str(&format!("[{}: {}] ", item.name, item.count));
        }

        info!(
            "STATS DUMP: Screened: {}, Allowed: {} ({:.1}%), Blocked: {} ({:.1}%), Bypassed: {}, NoNumber: {} Top: {}",
            s.screened,
            s.allowed,
            pct(s.allowed),
            s.blocked,
            pct(s.blocked),
            s.bypassed,
            s.missing_number,
            top_stats
        );
    }
}

/// Keeps at most `keep` numbers, the most frequently blocked ones.
fn prune_counts(counts: &mut FxHashMap<String, u64>, keep: usize) {
    let mut by_count: Vec<u64> = counts.values().copied().collect();
    by_count.sort_unstable_by(|a, b| b.cmp(a));
    let Some(&threshold) = by_count.get(keep) else {
        return;
    };
    counts.retain(|_, count| *count > threshold);
}

use crate::engine::{decide, BlockingToggle, Decision, DecisionReason};
use crate::logger::{ScreeningAction, ScreeningLogEntry, ScreeningLogger};
use crate::model::{BlockedCall, CallDetails, CallDirection, CallResponse};
use crate::notify::CallNotifier;
use crate::stats::StatsCollector;
use crate::store::{BlockedCallLog, ContactStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Entry point for every intercepted call.
///
/// Outgoing calls pass untouched. For the rest the blocking toggle is checked
/// first, then allow-list membership; a rejection is appended to the
/// blocked-call log and raises a notification.
#[derive(Clone)]
pub struct CallScreener {
    contacts: Arc<ContactStore>,
    blocked: Arc<BlockedCallLog>,
    toggle: Arc<BlockingToggle>,
    logger: Arc<ScreeningLogger>,
    notifier: Arc<dyn CallNotifier>,
    stats: Arc<StatsCollector>,
}

impl CallScreener {
    pub fn new(
        contacts: Arc<ContactStore>,
        blocked: Arc<BlockedCallLog>,
        toggle: Arc<BlockingToggle>,
        logger: Arc<ScreeningLogger>,
        notifier: Arc<dyn CallNotifier>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            contacts,
            blocked,
            toggle,
            logger,
            notifier,
            stats,
        }
    }

    pub async fn screen(&self, call: &CallDetails) -> CallResponse {
        let start = Instant::now();
        let decision = self.evaluate(call);

        if !decision.allow {
            self.record_blocked(&decision);
        }
        self.stats
            .record(decision.allow, decision.reason, decision.number.as_deref());

        self.logger
            .log(ScreeningLogEntry {
                number: decision.number.clone(),
                direction: call.direction,
                action: if decision.allow {
                    ScreeningAction::Allowed
                } else {
                    ScreeningAction::Blocked
                },
                reason: decision.reason,
                latency_us: start.elapsed().as_micros() as u64,
                timestamp: Utc::now().timestamp_millis(),
            })
            .await;

        if decision.allow {
            CallResponse::allow()
        } else {
            CallResponse::reject()
        }
    }

    fn evaluate(&self, call: &CallDetails) -> Decision {
        let raw = call.number.as_deref();
        if call.direction == CallDirection::Outgoing {
            return Decision::bypass(raw, DecisionReason::Outgoing);
        }
        if !self.toggle.is_enabled() {
            debug!("Blocking disabled, allowing call");
            return Decision::bypass(raw, DecisionReason::BlockingDisabled);
        }
        let allow_list = self.contacts.allow_list();
        decide(raw, allow_list.as_ref())
    }

    fn record_blocked(&self, decision: &Decision) {
        let call = BlockedCall::now(decision.number.clone());
        // The call stays rejected even if the log write fails
        if let Err(e) = self.blocked.append(call.clone()) {
            error!("Failed to record blocked call: {:#}", e);
        }
        self.notifier.notify_blocked(&call);
    }

    pub fn blocked_calls(&self) -> &Arc<BlockedCallLog> {
        &self.blocked
    }

    pub fn contacts(&self) -> &Arc<ContactStore> {
        &self.contacts
    }

    pub fn toggle(&self) -> &Arc<BlockingToggle> {
        &self.toggle
    }

    pub fn stats(&self) -> &Arc<StatsCollector> {
        &self.stats
    }
}

use std::{collections::HashMap, sync::Arc, time::Duration};

use lfb_model::Target;
use tracing::trace;

use crate::{
    clock::Clock,
    timer::{TimerHandle, TimerQueue},
};

/// The single live refresh timer of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub handle: TimerHandle,
    /// Absolute deadline, unix ms.
    pub fire_at: u64,
}

/// What [`RefreshCoalescer::request_refresh`] did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// No timer was pending; a new one was armed.
    Scheduled,
    /// The pending timer was stale or later than requested; it was cancelled and re-armed.
    Replaced,
    /// The pending timer already fires no later than requested.
    Kept,
}

/// Keeps at most one pending refresh timer per target.
///
/// Callers ask for a refresh at some delay without knowing whether one is
/// already scheduled; an earlier request preempts a later timer, a later
/// request is absorbed by the earlier one.
pub struct RefreshCoalescer {
    clock: Arc<dyn Clock>,
    timers: TimerQueue<Target>,
    pending: HashMap<Target, PendingTimer>,
}

impl RefreshCoalescer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            timers: TimerQueue::new(),
            pending: HashMap::new(),
        }
    }

    pub fn request_refresh(&mut self, target: &Target, delay: Duration) -> RefreshDecision {
        let now = self.clock.now_ms();
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let candidate = now.saturating_add(delay_ms);

        let decision = match self.pending.get(target) {
            None => RefreshDecision::Scheduled,
            // A timer whose deadline already passed never fired; do not trust it.
            Some(existing) if now > existing.fire_at || candidate < existing.fire_at => {
                self.timers.cancel(existing.handle);
                RefreshDecision::Replaced
            }
            Some(_) => RefreshDecision::Kept,
        };

        if decision != RefreshDecision::Kept {
            let handle = self.timers.schedule(candidate, target.clone());
            self.pending.insert(
                target.clone(),
                PendingTimer {
                    handle,
                    fire_at: candidate,
                },
            );
        }

        trace!(
            builder = %target,
            delay_ms,
            ?decision,
            "refresh requested"
        );
        decision
    }

    /// Fire every timer due now, clearing each target's slot before it is returned.
    pub fn take_due(&mut self) -> Vec<Target> {
        let now = self.clock.now_ms();
        let mut due = Vec::new();

        for (handle, target) in self.timers.pop_due(now) {
            let live = self
                .pending
                .get(&target)
                .is_some_and(|p| p.handle == handle);
            if live {
                self.pending.remove(&target);
                due.push(target);
            }
        }
        due
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.pending.clear();
    }

    pub fn pending(&self, target: &Target) -> Option<&PendingTimer> {
        self.pending.get(target)
    }

    pub fn is_pending(&self, target: &Target) -> bool {
        self.pending.contains_key(target)
    }

    /// Number of armed timers; never more than the number of distinct targets.
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }
}

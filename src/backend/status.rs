//! Backend reachability state.
//!
//! # States
//! - Reachable: last applied check or forward succeeded
//! - Unreachable: last applied check or forward failed (also the initial state)
//!
//! # Ordering
//! Every attempt takes a ticket when it starts. A completed attempt is applied
//! only if no later-started attempt has been applied already, so a slow stale
//! check cannot overwrite a fresher result.
//!
//! Ticket and flag are packed into one `AtomicU64` (`ticket << 1 | reachable`)
//! so both change together.

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::Gauge;

/// Ticket taken when a check or forward starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

pub struct BackendStatus {
    next_ticket: AtomicU64,
    state: AtomicU64,
    gauge: Gauge,
}

impl BackendStatus {
    /// Create the status in the unreachable state, mirrored into `gauge`.
    pub fn new(gauge: Gauge) -> Self {
        gauge.set(0.0);
        Self {
            next_ticket: AtomicU64::new(1),
            state: AtomicU64::new(0),
            gauge,
        }
    }

    /// Take a ticket before starting an attempt.
    pub fn begin(&self) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }

    /// Record the outcome of the attempt holding `ticket`.
    ///
    /// Returns `false` if a later-started attempt already won.
    pub fn complete(&self, ticket: Ticket, reachable: bool) -> bool {
        let packed = (ticket.0 << 1) | u64::from(reachable);
        let applied = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current >> 1 < ticket.0).then_some(packed)
            })
            .is_ok();

        if applied {
            self.publish(packed);
        } else {
            tracing::debug!(ticket = ticket.0, reachable, "Discarding stale backend status");
        }
        applied
    }

    /// Mirror `observed` into the gauge, repeating until the state stops moving
    /// underneath us. Whoever changes the state last also publishes last.
    fn publish(&self, mut observed: u64) {
        loop {
            self.gauge.set((observed & 1) as f64);
            let current = self.state.load(Ordering::Acquire);
            if current == observed {
                break;
            }
            observed = current;
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.state.load(Ordering::Acquire) & 1 == 1
    }
}

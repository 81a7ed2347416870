//! Timer abstraction
//!
//! Timers are opaque handles backed by the application's event loop: the
//! library arms them through [`EventOps::register_timer`] and the
//! application calls [`DectHandle::timer_process`] on expiry. A timer
//! delivers at most one expiry per start; stopping disarms it.
//!
//! [`EventOps::register_timer`]: crate::ops::EventOps::register_timer
//! [`DectHandle::timer_process`]: crate::handle::DectHandle::timer_process

use std::collections::HashMap;
use std::time::Duration;

use opendect_common::Ipui;

use crate::ops::DectOps;
use crate::transaction::TransactionKey;

/// Opaque timer identifier shared with the application.
pub type TimerId = u32;

/// What to do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerEvent {
    /// The CC setup timer of the call on this transaction ran out.
    CcSetup(TransactionKey),
    /// The release grace period of an idle data link ended.
    LinkRelease(Ipui),
}

/// Table of armed timers.
#[derive(Default)]
pub(crate) struct TimerTable {
    timers: HashMap<TimerId, TimerEvent>,
    next_id: TimerId,
}

impl TimerTable {
    /// Arms a new timer with the application and records its event.
    pub(crate) fn start(
        &mut self,
        ops: &DectOps,
        event: TimerEvent,
        timeout: Duration,
    ) -> TimerId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.insert(id, event);
        ops.event_ops.register_timer(id, timeout);
        id
    }

    /// Stops a running timer. Stopping an already expired or unknown timer
    /// is a no-op.
    pub(crate) fn stop(&mut self, ops: &DectOps, id: TimerId) {
        if self.timers.remove(&id).is_some() {
            ops.event_ops.unregister_timer(id);
        }
    }

    /// Takes the event of an expired timer. Returns `None` when the timer
    /// was already stopped, enforcing one delivery per start.
    pub(crate) fn expire(&mut self, id: TimerId) -> Option<TimerEvent> {
        self.timers.remove(&id)
    }

    /// Number of armed timers.
    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}

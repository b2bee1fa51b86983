//! Debounce Scheduler
//!
//! Coalesces bursts of change notifications into single writes. The
//! debouncer owns the pending-write token (at most one outstanding timer) and
//! decides, per notification, whether to write now, start a timer, restart
//! it, or ignore the notification.

use crate::timer::{TimerHost, TimerId, TimerTask};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// How repeated notifications inside one delay interact with the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebounceMode {
    /// Every notification restarts the delay; the write fires after a quiet period.
    #[default]
    Sliding,
    /// The first notification starts the delay; later ones ride along.
    Fixed,
}

impl DebounceMode {
    pub fn from_fixed(fixed: bool) -> Self {
        if fixed {
            DebounceMode::Fixed
        } else {
            DebounceMode::Sliding
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DebounceMode::Sliding => "sliding",
            DebounceMode::Fixed => "fixed",
        }
    }
}

/// Outcome of a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Zero delay, or no timer could be scheduled: the caller must write synchronously.
    WriteNow,
    /// No timer was pending; one was started.
    Started(TimerId),
    /// Sliding mode: the pending timer was cancelled and replaced.
    Restarted(TimerId),
    /// Fixed mode: a timer is already pending and absorbs this change.
    Coalesced(TimerId),
}

/// Debounce state for one storage object.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    mode: DebounceMode,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(delay: Duration, mode: DebounceMode) -> Self {
        Self {
            delay,
            mode,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    /// True when writes happen synchronously on every change.
    pub fn is_immediate(&self) -> bool {
        self.delay.is_zero()
    }

    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Register a change.
    ///
    /// `make_task` builds the timer callback; it is only invoked when a new
    /// timer is actually started. The callback receives its own timer id and
    /// should hand it back through [`Debouncer::accept_fire`].
    pub fn trigger<F>(&mut self, timers: &dyn TimerHost, make_task: F) -> Schedule
    where
        F: FnOnce() -> TimerTask,
    {
        if self.is_immediate() {
            return Schedule::WriteNow;
        }

        let outcome = match (self.pending, self.mode) {
            (Some(id), DebounceMode::Fixed) => Schedule::Coalesced(id),
            (Some(id), DebounceMode::Sliding) => {
                timers.cancel(id);
                self.start(timers, make_task())
                    .map_or(Schedule::WriteNow, Schedule::Restarted)
            }
            (None, _) => self
                .start(timers, make_task())
                .map_or(Schedule::WriteNow, Schedule::Started),
        };
        debug!(mode = self.mode.as_str(), outcome = ?outcome, "Debounce decision");
        outcome
    }

    /// Clear the pending token, cancelling its timer. Returns whether one was pending.
    pub fn take_pending(&mut self, timers: &dyn TimerHost) -> bool {
        match self.pending.take() {
            Some(id) => {
                timers.cancel(id);
                true
            }
            None => false,
        }
    }

    /// Accept a timer firing. Only the currently pending id is honoured;
    /// stale ids from cancelled timers return false.
    pub fn accept_fire(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Leaves nothing pending when the host refuses the task.
    fn start(&mut self, timers: &dyn TimerHost, task: TimerTask) -> Option<TimerId> {
        self.pending = match timers.schedule(self.delay, task) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Could not schedule a debounced write; writing now");
                None
            }
        };
        self.pending
    }
}

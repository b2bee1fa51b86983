//! Virtual-clock host

use super::{TimerHost, TimerId, TimerTask};
use crate::error::StoreError;
use parking_lot::Mutex;
use std::time::Duration;

struct Scheduled {
    id: TimerId,
    due: Duration,
    task: TimerTask,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    queue: Vec<Scheduled>,
}

/// Timer host driven by explicit calls to [`ManualTimers::advance`].
///
/// Nothing fires on its own. Tasks run on the caller's thread, in due order
/// (ties by scheduling order), with the clock set to their due time.
#[derive(Default)]
pub struct ManualTimers {
    clock: Mutex<Clock>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    /// Number of scheduled tasks that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.clock.lock().queue.len()
    }

    /// Move the clock forward, running every task that falls due.
    ///
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.clock.lock().now + by;
        let mut fired = 0;
        // The lock is released before each task so tasks may schedule or cancel.
        while let Some((id, task)) = self.pop_due(target) {
            task(id);
            fired += 1;
        }
        self.clock.lock().now = target;
        fired
    }

    /// Run everything currently scheduled, advancing to the last due time.
    pub fn run_all(&self) -> usize {
        let last_due = {
            let clock = self.clock.lock();
            clock.queue.iter().map(|s| s.due).max().unwrap_or(clock.now)
        };
        let now = self.now();
        self.advance(last_due.saturating_sub(now))
    }

    fn pop_due(&self, target: Duration) -> Option<(TimerId, TimerTask)> {
        let mut clock = self.clock.lock();
        let index = clock
            .queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= target)
            .min_by_key(|(_, s)| (s.due, s.id))
            .map(|(i, _)| i)?;
        let scheduled = clock.queue.swap_remove(index);
        clock.now = scheduled.due;
        Some((scheduled.id, scheduled.task))
    }
}

impl TimerHost for ManualTimers {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerId, StoreError> {
        let mut clock = self.clock.lock();
        let id = TimerId(clock.next_id);
        clock.next_id += 1;
        let due = clock.now + delay;
        clock.queue.push(Scheduled { id, due, task });
        Ok(id)
    }

    fn cancel(&self, id: TimerId) {
        self.clock.lock().queue.retain(|s| s.id != id);
    }
}

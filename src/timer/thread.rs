//! Background-thread host

use super::{TimerHost, TimerId, TimerTask};
use crate::error::StoreError;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, error};

#[derive(Default)]
struct Queue {
    due: BTreeMap<(Instant, TimerId), TimerTask>,
    deadlines: HashMap<TimerId, Instant>,
    worker_started: bool,
    shutdown: bool,
}

impl Queue {
    fn remove(&mut self, id: TimerId) -> Option<TimerTask> {
        let deadline = self.deadlines.remove(&id)?;
        self.due.remove(&(deadline, id))
    }
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    wake: Condvar,
}

/// Runs tasks on one background thread per host, in deadline order.
///
/// The thread is started by the first `schedule` and sleeps until the
/// earliest deadline. Cancelling drops the task without running it, so a
/// burst of restarts leaves one queued entry. Dropping the host stops the
/// thread; tasks still queued at that point never run.
#[derive(Default)]
pub struct ThreadTimers {
    next_id: AtomicU64,
    shared: Arc<Shared>,
}

impl ThreadTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide host used by objects that are not given one.
    pub fn shared() -> Arc<ThreadTimers> {
        static SHARED: OnceLock<Arc<ThreadTimers>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(ThreadTimers::new())))
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().due.len()
    }

    fn ensure_worker(&self, queue: &mut Queue) -> Result<(), StoreError> {
        if queue.worker_started {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        std::thread::Builder::new()
            .name("storage-object-timers".to_string())
            .spawn(move || run_worker(&shared))?;
        queue.worker_started = true;
        debug!("Timer thread started");
        Ok(())
    }
}

impl TimerHost for ThreadTimers {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerId, StoreError> {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let deadline = Instant::now() + delay;

        let mut queue = self.shared.queue.lock();
        if let Err(e) = self.ensure_worker(&mut queue) {
            error!(timer = id.0, error = %e, "Failed to start timer thread");
            return Err(e);
        }
        queue.due.insert((deadline, id), task);
        queue.deadlines.insert(id, deadline);
        drop(queue);

        self.shared.wake.notify_one();
        Ok(id)
    }

    fn cancel(&self, id: TimerId) {
        let removed = self.shared.queue.lock().remove(id);
        // Dropped outside the lock; a task may own the last handle to its object.
        drop(removed);
    }
}

impl Drop for ThreadTimers {
    fn drop(&mut self) {
        self.shared.queue.lock().shutdown = true;
        self.shared.wake.notify_all();
    }
}

impl std::fmt::Debug for ThreadTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadTimers")
            .field("pending", &self.pending())
            .finish()
    }
}

fn run_worker(shared: &Shared) {
    let mut queue = shared.queue.lock();
    loop {
        if queue.shutdown {
            let abandoned = std::mem::take(&mut queue.due);
            queue.deadlines.clear();
            MutexGuard::unlocked(&mut queue, || drop(abandoned));
            return;
        }

        let Some(&(deadline, id)) = queue.due.keys().next() else {
            shared.wake.wait(&mut queue);
            continue;
        };
        if deadline > Instant::now() {
            shared.wake.wait_until(&mut queue, deadline);
            continue;
        }

        if let Some(task) = queue.remove(id) {
            MutexGuard::unlocked(&mut queue, || {
                if panic::catch_unwind(AssertUnwindSafe(|| task(id))).is_err() {
                    error!(timer = id.0, "Timer task panicked");
                }
            });
        }
    }
}

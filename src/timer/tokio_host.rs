//! Tokio runtime host

use super::{TimerHost, TimerId, TimerTask};
use crate::error::StoreError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Spawns each timer as a task on a tokio runtime; cancellation aborts it.
pub struct TokioTimers {
    handle: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<TimerId, JoinHandle<()>>>>,
}

impl TokioTimers {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(0),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Bind to the runtime of the calling context, if there is one.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl TimerHost for TokioTimers {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerId, StoreError> {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tasks = Arc::clone(&self.tasks);

        // Hold the map lock across spawn so the task cannot look itself up
        // before it has been registered.
        let mut registered = self.tasks.lock();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_live = tasks.lock().remove(&id).is_some();
            if still_live {
                task(id);
            }
        });
        registered.insert(id, join);
        Ok(id)
    }

    fn cancel(&self, id: TimerId) {
        if let Some(join) = self.tasks.lock().remove(&id) {
            join.abort();
        }
    }
}

//! Timer hosts
//!
//! The debounce scheduler never sleeps itself; it asks a timer host to run a
//! task after a delay and may cancel that request later. Hosts differ in
//! where the task runs:
//!
//! - [`ThreadTimers`]: one shared background thread per host (default)
//! - [`TokioTimers`]: a task on a tokio runtime
//! - [`ManualTimers`]: a virtual clock advanced by the embedder

mod manual;
mod thread;
mod tokio_host;

pub use manual::ManualTimers;
pub use thread::ThreadTimers;
pub use tokio_host::TokioTimers;

use crate::error::StoreError;
use std::time::Duration;

/// Work handed to a timer host. It receives the id it was scheduled under.
pub type TimerTask = Box<dyn FnOnce(TimerId) + Send + 'static>;

/// Handle for one scheduled task, unique within its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Deferred-callback facility.
pub trait TimerHost: Send + Sync {
    /// Run `task` once after `delay`, unless cancelled first.
    ///
    /// An error means the task was not accepted and will never run.
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerId, StoreError>;

    /// Cancel a scheduled task. Unknown or already fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

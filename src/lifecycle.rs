//! Shutdown lifecycle
//!
//! The host owns a [`ShutdownHooks`] registry and fires it once when it is
//! about to exit. Storage objects with a non-zero debounce time register a
//! hook that flushes their pending write, if any.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Callback run when the host shuts down.
pub type ShutdownHook = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Registry {
    hooks: Vec<ShutdownHook>,
    fired: bool,
}

/// Registry of flush-on-shutdown callbacks. Clones share the registry.
#[derive(Clone, Default)]
pub struct ShutdownHooks {
    registry: Arc<Mutex<Registry>>,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook. Returns false (and drops the hook) once the registry has fired.
    pub fn register(&self, hook: ShutdownHook) -> bool {
        let mut registry = self.registry.lock();
        if registry.fired {
            return false;
        }
        registry.hooks.push(hook);
        true
    }

    /// Run every registered hook exactly once.
    ///
    /// Later calls are no-ops. Returns how many hooks ran.
    pub fn fire(&self) -> usize {
        let hooks = {
            let mut registry = self.registry.lock();
            registry.fired = true;
            std::mem::take(&mut registry.hooks)
        };
        let count = hooks.len();
        for hook in hooks {
            hook();
        }
        debug!(hooks = count, "Shutdown hooks fired");
        count
    }

    pub fn is_fired(&self) -> bool {
        self.registry.lock().fired
    }

    /// Number of hooks waiting to fire.
    pub fn len(&self) -> usize {
        self.registry.lock().hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ShutdownHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("ShutdownHooks")
            .field("hooks", &registry.hooks.len())
            .field("fired", &registry.fired)
            .finish()
    }
}

//! Storage Object
//!
//! A [`StorageObject`] binds one key of a backing store to a live tree. The
//! tree is decoded once at open time, mutated in memory through [`Node`]
//! handles, and written back through the debounce scheduler whenever any
//! node at any depth changes.
//!
//! The handle dereferences to the root [`Node`], so `object.set("a", 1)` and
//! `object.at("d").set("e", 6)` are the everyday entry points. `write()` and
//! `clear()` live on the handle itself.

mod node;
mod options;
pub mod path;

pub use node::Node;
pub use options::{ObjectOptions, DEFAULT_DEBOUNCE_MS};
pub use path::PathSegment;

use crate::codec;
use crate::debounce::{Debouncer, Schedule};
use crate::error::StoreError;
use crate::lifecycle::ShutdownHooks;
use crate::store::KeyValueStore;
use crate::timer::{ThreadTimers, TimerHost, TimerId};
use crate::value::Map;
use parking_lot::Mutex;
use path::{Container, ContainerMut};
use std::ops::Deref;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

/// Handle to a persistent, debounced object tree bound to one store key.
///
/// Clones share the same tree. When the last clone (or node) is dropped a
/// pending debounced write is flushed.
#[derive(Clone)]
pub struct StorageObject {
    root: Node,
}

/// Builder for [`StorageObject`] with non-default timer host or shutdown registry.
pub struct Builder {
    key: String,
    store: Arc<dyn KeyValueStore>,
    options: ObjectOptions,
    timers: Option<Arc<dyn TimerHost>>,
    shutdown: Option<ShutdownHooks>,
}

impl Builder {
    pub fn options(mut self, options: ObjectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn initial_values(mut self, initial_values: Map) -> Self {
        self.options.initial_values = initial_values;
        self
    }

    pub fn debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.options.debounce_ms = debounce_ms;
        self
    }

    pub fn debounce_fixed(mut self, fixed: bool) -> Self {
        self.options.debounce_fixed = fixed;
        self
    }

    /// Timer host for debounced writes (default: the process-wide [`ThreadTimers::shared`]).
    pub fn timers(mut self, timers: Arc<dyn TimerHost>) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Registry fired by the host at shutdown; a flush hook is registered
    /// when the debounce time is non-zero.
    pub fn shutdown_hooks(mut self, hooks: &ShutdownHooks) -> Self {
        self.shutdown = Some(hooks.clone());
        self
    }

    /// Load (or seed) the tree, normalize the stored entry, and return the handle.
    pub fn open(self) -> Result<StorageObject, StoreError> {
        let Builder {
            key,
            store,
            options,
            timers,
            shutdown,
        } = self;

        let tree = match store.get(&key)? {
            Some(raw) => match codec::decode(&raw) {
                Some(tree) => {
                    debug!(key = %key, entries = tree.len(), "Loaded stored tree");
                    tree
                }
                None => {
                    warn!(key = %key, "Stored entry is not valid JSON, using initial values");
                    options.initial_values.clone()
                }
            },
            None => {
                debug!(key = %key, "No stored entry, using initial values");
                options.initial_values.clone()
            }
        };

        let debouncer = Debouncer::new(options.debounce_time(), options.debounce_mode());
        let immediate = debouncer.is_immediate();
        let inner = Arc::new(Inner {
            key,
            store,
            options,
            timers: timers.unwrap_or_else(|| ThreadTimers::shared()),
            state: Mutex::new(State { tree, debouncer }),
        });

        // Normalizes the stored entry, e.g. dates supplied as initial values.
        inner.write()?;

        if !immediate {
            if let Some(hooks) = shutdown {
                let weak = Arc::downgrade(&inner);
                hooks.register(Box::new(move || flush_on_shutdown(&weak)));
            }
        }

        info!(
            key = %inner.key,
            debounce_ms = inner.options.debounce_ms,
            mode = inner.options.debounce_mode().as_str(),
            "Storage object opened"
        );
        Ok(StorageObject {
            root: Node::new(inner, Vec::new()),
        })
    }
}

fn flush_on_shutdown(weak: &Weak<Inner>) {
    if let Some(inner) = weak.upgrade() {
        if let Err(e) = inner.flush_pending() {
            error!(key = %inner.key, error = %e, "Shutdown flush failed");
        }
    }
}

impl StorageObject {
    /// Start building a handle for `key` in `store`.
    pub fn builder(key: impl Into<String>, store: impl KeyValueStore + 'static) -> Builder {
        Builder {
            key: key.into(),
            store: Arc::new(store),
            options: ObjectOptions::default(),
            timers: None,
            shutdown: None,
        }
    }

    /// Open a handle with the given options and the default timer host.
    pub fn open(
        key: impl Into<String>,
        store: impl KeyValueStore + 'static,
        options: ObjectOptions,
    ) -> Result<Self, StoreError> {
        Self::builder(key, store).options(options).open()
    }

    /// The store key this handle is bound to.
    pub fn key(&self) -> &str {
        &self.inner().key
    }

    pub fn options(&self) -> &ObjectOptions {
        &self.inner().options
    }

    /// The root node (same as dereferencing the handle).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Write the tree now, cancelling any pending debounced write.
    pub fn write(&self) -> Result<(), StoreError> {
        self.inner().write()
    }

    /// Write only if a debounced write is pending. Returns whether it wrote.
    pub fn flush_pending(&self) -> Result<bool, StoreError> {
        self.inner().flush_pending()
    }

    /// True while a debounced write is waiting on its timer.
    pub fn is_pending(&self) -> bool {
        self.inner().state.lock().debouncer.is_pending()
    }

    /// Reset the tree to the initial values and write synchronously.
    pub fn clear(&self) -> Result<(), StoreError> {
        let inner = self.inner();
        let mut state = inner.state.lock();
        state.tree.clear();
        state.tree.extend(inner.options.initial_values.clone());
        debug!(key = %inner.key, "Storage object cleared");
        inner.write_locked(&mut state)
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> Map {
        self.inner().state.lock().tree.clone()
    }

    /// Mutate the root map in place; one write is scheduled afterwards.
    ///
    /// The object stays locked while `f` runs, so `f` must not call back into
    /// this object or any [`Node`] of it; doing so deadlocks.
    pub fn update_tree<R>(&self, f: impl FnOnce(&mut Map) -> R) -> Result<R, StoreError> {
        let inner = self.inner();
        let mut state = inner.state.lock();
        let result = f(&mut state.tree);
        inner.changed(&mut state)?;
        Ok(result)
    }

    fn inner(&self) -> &Arc<Inner> {
        self.root.inner()
    }
}

impl Deref for StorageObject {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.root
    }
}

impl std::fmt::Debug for StorageObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageObject")
            .field("key", &self.key())
            .field("options", self.options())
            .field("pending", &self.is_pending())
            .finish()
    }
}

struct State {
    tree: Map,
    debouncer: Debouncer,
}

/// Shared state behind every handle and node of one storage object.
pub(crate) struct Inner {
    key: String,
    store: Arc<dyn KeyValueStore>,
    options: ObjectOptions,
    timers: Arc<dyn TimerHost>,
    state: Mutex<State>,
}

impl Inner {
    /// Run `f` against the container at `path`.
    pub(crate) fn read<R>(
        &self,
        path: &[PathSegment],
        f: impl FnOnce(Container<'_>) -> R,
    ) -> Result<R, StoreError> {
        let state = self.state.lock();
        let container = path::resolve(&state.tree, path)?;
        Ok(f(container))
    }

    /// Run `f` against the container at `path` and schedule a write if it succeeds.
    pub(crate) fn mutate<R>(
        self: &Arc<Self>,
        path: &[PathSegment],
        f: impl FnOnce(ContainerMut<'_>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut state = self.state.lock();
        let container = path::resolve_mut(&mut state.tree, path)?;
        let result = f(container)?;
        self.changed(&mut state)?;
        Ok(result)
    }

    /// Hand a change to the debouncer; writes synchronously when it says so.
    fn changed(self: &Arc<Self>, state: &mut State) -> Result<(), StoreError> {
        let weak = Arc::downgrade(self);
        let schedule = state.debouncer.trigger(self.timers.as_ref(), move || {
            Box::new(move |id| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_timer(id);
                }
            })
        });
        match schedule {
            Schedule::WriteNow => self.write_locked(state),
            _ => Ok(()),
        }
    }

    fn on_timer(&self, id: TimerId) {
        let mut state = self.state.lock();
        if !state.debouncer.accept_fire(id) {
            return;
        }
        if let Err(e) = self.persist(&state.tree) {
            error!(key = %self.key, error = %e, "Debounced write failed");
        }
    }

    fn write(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        self.write_locked(&mut state)
    }

    fn flush_pending(&self) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        if !state.debouncer.is_pending() {
            return Ok(false);
        }
        self.write_locked(&mut state)?;
        Ok(true)
    }

    fn write_locked(&self, state: &mut State) -> Result<(), StoreError> {
        state.debouncer.take_pending(self.timers.as_ref());
        self.persist(&state.tree)
    }

    fn persist(&self, tree: &Map) -> Result<(), StoreError> {
        let raw = codec::encode(tree)?;
        debug!(key = %self.key, bytes = raw.len(), "Writing storage object");
        self.store.set(&self.key, raw)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if !state.debouncer.take_pending(self.timers.as_ref()) {
            return;
        }
        let written = codec::encode(&state.tree).and_then(|raw| self.store.set(&self.key, raw));
        match written {
            Ok(()) => debug!(key = %self.key, "Flushed pending write on drop"),
            Err(e) => error!(key = %self.key, error = %e, "Flush on drop failed"),
        }
    }
}

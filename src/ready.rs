//! One-shot "engine is usable" notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error};

/// Zero-argument callback run once the engine is ready.
///
/// Identity is the `Arc` allocation: registering a clone of the same `Arc`
/// twice is a no-op.
pub type ReadyListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    listeners: Vec<ReadyListener>,
    ready: bool,
}

/// Ordered set of pending ready listeners.
///
/// `fire_ready` drains the set in registration order. Once it has run, the
/// registry remembers that the engine is ready and `on_ready` invokes late
/// registrants immediately instead of queueing them.
#[derive(Default)]
pub struct ReadyListenerRegistry {
    inner: Mutex<Inner>,
}

fn same_listener(a: &ReadyListener, b: &ReadyListener) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Run one listener; a panic is logged and does not reach the caller.
fn invoke(listener: &ReadyListener) -> bool {
    match catch_unwind(AssertUnwindSafe(|| listener())) {
        Ok(()) => true,
        Err(_) => {
            error!("Ready listener panicked");
            false
        }
    }
}

impl ReadyListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Listeners never run under the lock, so poisoning carries no torn state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `listener` unless it is already pending.
    ///
    /// If the registry has already fired, the listener runs right away.
    pub fn on_ready(&self, listener: ReadyListener) {
        {
            let mut inner = self.lock();
            if !inner.ready {
                if !inner.listeners.iter().any(|l| same_listener(l, &listener)) {
                    inner.listeners.push(listener);
                }
                return;
            }
        }

        debug!("Engine already ready, invoking late listener");
        invoke(&listener);
    }

    /// Invoke every pending listener once, in registration order, then clear.
    ///
    /// Returns the number of listeners invoked.
    pub fn fire_ready(&self) -> usize {
        let listeners = {
            let mut inner = self.lock();
            inner.ready = true;
            std::mem::take(&mut inner.listeners)
        };

        debug!("Firing {} ready listener(s)", listeners.len());
        for listener in &listeners {
            invoke(listener);
        }
        listeners.len()
    }

    /// Whether `fire_ready` has run.
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Number of listeners waiting for `fire_ready`.
    pub fn pending(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl std::fmt::Debug for ReadyListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ReadyListenerRegistry")
            .field("pending", &inner.listeners.len())
            .field("ready", &inner.ready)
            .finish()
    }
}

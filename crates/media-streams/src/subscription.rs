//! Cancellation handles for active stream bindings.
//!
//! Every subscribe call in this crate returns a [`Subscription`] that owns
//! the matching deregistration. Cleanup runs exactly once, on the first
//! `dispose` call or on drop, whichever comes first.

use std::sync::Mutex;

type Cleanup = Box<dyn FnOnce() + Send>;

/// Handle to one active stream binding.
///
/// Disposing synchronously removes the underlying observer or notification
/// registration. Dispose is idempotent; dropping an undisposed handle also
/// disposes it.
pub struct Subscription {
    cleanup: Mutex<Option<Cleanup>>,
}

impl Subscription {
    /// Wrap a cleanup action that deregisters the underlying callback.
    pub fn new(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cleanup: Mutex::new(Some(Box::new(cleanup))),
        }
    }

    /// A subscription with nothing to clean up (owner already gone).
    pub fn empty() -> Self {
        Self {
            cleanup: Mutex::new(None),
        }
    }

    /// Bundle child subscriptions; disposing the group disposes every child.
    pub fn group(children: Vec<Subscription>) -> Self {
        Self::new(move || {
            for child in &children {
                child.dispose();
            }
        })
    }

    /// Run the cleanup action if it has not run yet.
    pub fn dispose(&self) {
        let cleanup = self
            .cleanup
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(cleanup) = cleanup {
            tracing::trace!("disposing subscription");
            cleanup();
        }
    }

    /// `true` once the cleanup action has run (or never existed).
    pub fn is_disposed(&self) -> bool {
        self.cleanup.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

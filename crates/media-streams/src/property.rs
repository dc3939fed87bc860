//! Observed properties and the property-to-stream adapter.
//!
//! [`Property`] is the boundary cell a media engine embeds for every field
//! it exposes to observation: a current (possibly absent) value plus an
//! observer table. Registering an observer immediately delivers the current
//! value, then every subsequent store, matching key-path observation in the
//! native frameworks this layer fronts.

use std::sync::{Arc, Mutex, Weak};

use crate::source::{Handler, Source};
use crate::subscription::Subscription;

/// Identifies one registered observer of a [`Property`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObserverId(u64);

struct ObserverTable<T> {
    next_id: u64,
    entries: Vec<(u64, Handler<Option<T>>)>,
}

/// An engine-owned observable field.
///
/// Stores invoke observers synchronously on the storing thread, outside the
/// table lock; the initial replay runs inside the registration section so a
/// concurrent store cannot overtake it. The value may be absent (`None`);
/// observers see absence as a plain `None`, the stream adapter filters it
/// out.
pub struct Property<T> {
    value: Mutex<Option<T>>,
    observers: Mutex<ObserverTable<T>>,
}

impl<T: Clone + Send + 'static> Property<T> {
    pub fn new(initial: Option<T>) -> Self {
        Self {
            value: Mutex::new(initial),
            observers: Mutex::new(ObserverTable {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    /// Current value, if any.
    pub fn get(&self) -> Option<T> {
        self.value.lock().map(|v| v.clone()).unwrap_or(None)
    }

    /// Store a new value (or absence) and notify every observer.
    pub fn store(&self, value: Option<T>) {
        if let Ok(mut slot) = self.value.lock() {
            *slot = value.clone();
        }
        for handler in self.snapshot_observers() {
            handler(value.clone());
        }
    }

    /// Register an observer; it is immediately invoked with the current
    /// value, then once per subsequent [`store`](Self::store).
    ///
    /// The initial invocation happens while the observer table is locked,
    /// which keeps a concurrent store from delivering ahead of it. The
    /// handler must not call back into this property from that first call.
    pub fn observe(&self, handler: Handler<Option<T>>) -> ObserverId {
        let mut table = self.observers.lock().unwrap_or_else(|p| p.into_inner());
        let id = table.next_id;
        table.next_id += 1;
        table.entries.push((id, handler.clone()));
        handler(self.get());
        ObserverId(id)
    }

    /// Deregister; unknown ids are ignored.
    pub fn remove(&self, id: ObserverId) {
        if let Ok(mut table) = self.observers.lock() {
            table.entries.retain(|(entry_id, _)| *entry_id != id.0);
        }
    }

    /// Number of live observers (used to verify deregistration).
    pub fn observer_count(&self) -> usize {
        self.observers.lock().map(|t| t.entries.len()).unwrap_or(0)
    }

    fn snapshot_observers(&self) -> Vec<Handler<Option<T>>> {
        self.observers
            .lock()
            .map(|table| table.entries.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

/// Adapt one observed property of `owner` into a stream.
///
/// The source holds only a `Weak` reference: it never extends the owner's
/// lifetime. Subscribing against an already-released owner yields an empty
/// subscription and no events. Disposal removes the observer synchronously;
/// if the owner is gone by then, its table went with it and there is nothing
/// to remove.
pub fn property_stream<O, T>(owner: &Arc<O>, select: fn(&O) -> &Property<T>) -> Source<Option<T>>
where
    O: Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    let weak = Arc::downgrade(owner);
    Source::new(move |handler| {
        let Some(strong) = weak.upgrade() else {
            tracing::debug!("property owner released before subscribe");
            return Subscription::empty();
        };
        let id = select(&strong).observe(handler);
        drop(strong);

        let weak = weak.clone();
        Subscription::new(move || {
            if let Some(strong) = weak.upgrade() {
                select(&strong).remove(id);
            }
        })
    })
}

/// `property_stream` with the absence filter already applied.
pub fn present_stream<O, T>(owner: &Arc<O>, select: fn(&O) -> &Property<T>) -> Source<T>
where
    O: Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    property_stream(owner, select).present()
}

/// Shim for [`Weak::upgrade`] chains used by adapters that re-read owner
/// state per emission.
pub(crate) fn with_owner<O, R>(weak: &Weak<O>, read: impl FnOnce(&O) -> R) -> Option<R> {
    weak.upgrade().map(|strong| read(&strong))
}

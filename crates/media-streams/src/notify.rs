//! Notification feed for engine events that are not observed properties.
//!
//! Delivery is broadcast, keyed by notification name with an optional
//! originating-object filter. There is no replay: an observer only sees
//! notifications posted after it registered. The same push-stream interface
//! as property observation fronts the feed, so merge logic downstream is
//! source-agnostic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::source::{Handler, Source};
use crate::subscription::Subscription;

/// Process-unique identity of a notification-posting object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Names of the engine notifications this layer consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationName {
    /// Playback started but could not continue to the end.
    FailedToPlayToEnd,
    /// Playback stalled waiting for data.
    PlaybackStalled,
    /// The item played through to its end.
    DidPlayToEnd,
}

/// One delivered notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notification {
    pub name: NotificationName,
    pub sender: ObjectId,
}

struct Registration {
    id: u64,
    filter: Option<ObjectId>,
    handler: Handler<Notification>,
}

struct HubState {
    next_id: u64,
    observers: HashMap<NotificationName, Vec<Registration>>,
}

/// Broadcast channel for engine notifications.
pub struct NotificationHub {
    state: Mutex<HubState>,
}

/// Identifies one registered notification observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotificationToken {
    name: NotificationName,
    id: u64,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState {
                next_id: 0,
                observers: HashMap::new(),
            }),
        }
    }

    /// Deliver `name` from `sender` to every matching observer, on the
    /// posting thread.
    pub fn post(&self, name: NotificationName, sender: ObjectId) {
        tracing::debug!(?name, ?sender, "posting notification");
        let notification = Notification { name, sender };
        let handlers: Vec<Handler<Notification>> = {
            let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            state
                .observers
                .get(&name)
                .map(|regs| {
                    regs.iter()
                        .filter(|reg| reg.filter.is_none() || reg.filter == Some(sender))
                        .map(|reg| reg.handler.clone())
                        .collect()
                })
                .unwrap_or_default()
        };
        for handler in handlers {
            handler(notification);
        }
    }

    /// Register an observer for `name`, optionally restricted to a single
    /// originating object. No past notifications are replayed.
    pub fn observe(
        &self,
        name: NotificationName,
        filter: Option<ObjectId>,
        handler: Handler<Notification>,
    ) -> NotificationToken {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let id = state.next_id;
        state.next_id += 1;
        state.observers.entry(name).or_default().push(Registration {
            id,
            filter,
            handler,
        });
        NotificationToken { name, id }
    }

    /// Deregister; unknown tokens are ignored.
    pub fn remove(&self, token: NotificationToken) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(regs) = state.observers.get_mut(&token.name) {
                regs.retain(|reg| reg.id != token.id);
            }
        }
    }

    /// Number of live observers for `name` (used to verify deregistration).
    pub fn observer_count(&self, name: NotificationName) -> usize {
        self.state
            .lock()
            .map(|state| state.observers.get(&name).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

/// Adapt a notification feed into a stream.
///
/// Holds the hub weakly; subscribing after the hub is gone yields no events.
pub fn notification_stream(
    hub: &Arc<NotificationHub>,
    name: NotificationName,
    filter: Option<ObjectId>,
) -> Source<Notification> {
    let weak = Arc::downgrade(hub);
    Source::new(move |handler| {
        let Some(hub) = weak.upgrade() else {
            tracing::debug!(?name, "notification hub released before subscribe");
            return Subscription::empty();
        };
        let token = hub.observe(name, filter, handler);
        drop(hub);

        let weak = weak.clone();
        Subscription::new(move || {
            if let Some(hub) = weak.upgrade() {
                hub.remove(token);
            }
        })
    })
}

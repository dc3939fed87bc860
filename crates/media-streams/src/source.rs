//! Lazy push-streams and the combinators the observation layer needs.
//!
//! A [`Source`] does nothing until subscribed. Each subscribe call performs
//! a fresh registration against the upstream owner, so sources are
//! restartable and two subscribers never share state. Sources carry data
//! events only: they never complete and never deliver a terminal error.

use std::sync::{Arc, Mutex};

use crate::subscription::Subscription;

/// Callback invoked for every stream element.
pub type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

type SubscribeFn<T> = dyn Fn(Handler<T>) -> Subscription + Send + Sync;

/// A lazy, restartable, cancellable stream of values.
///
/// Elements are delivered on whatever thread the upstream registration fires
/// on; forwarding to a particular execution context is the subscriber's
/// concern.
pub struct Source<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: self.subscribe_fn.clone(),
        }
    }
}

impl<T: Send + 'static> Source<T> {
    /// Build a source from a registration function.
    ///
    /// `subscribe_fn` is invoked once per subscriber and must return the
    /// subscription that undoes its registration.
    pub fn new(
        subscribe_fn: impl Fn(Handler<T>) -> Subscription + Send + Sync + 'static,
    ) -> Self {
        Self {
            subscribe_fn: Arc::new(subscribe_fn),
        }
    }

    /// Register `handler` for every element until the returned subscription
    /// is disposed.
    pub fn subscribe(&self, handler: impl Fn(T) + Send + Sync + 'static) -> Subscription {
        (self.subscribe_fn)(Arc::new(handler))
    }

    /// Transform every element with a pure function.
    pub fn map<U, F>(&self, transform: F) -> Source<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let transform = Arc::new(transform);
        Source::new(move |handler| {
            let transform = transform.clone();
            upstream.subscribe(move |value| handler(transform(value)))
        })
    }

    /// Drop elements the predicate rejects.
    pub fn filter<F>(&self, keep: F) -> Source<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let keep = Arc::new(keep);
        Source::new(move |handler| {
            let keep = keep.clone();
            upstream.subscribe(move |value| {
                if keep(&value) {
                    handler(value);
                }
            })
        })
    }

    /// Transform and drop in one stage.
    pub fn filter_map<U, F>(&self, transform: F) -> Source<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let transform = Arc::new(transform);
        Source::new(move |handler| {
            let transform = transform.clone();
            upstream.subscribe(move |value| {
                if let Some(mapped) = transform(value) {
                    handler(mapped);
                }
            })
        })
    }

    /// Pair each element with the latest value seen on `other`.
    ///
    /// Elements arriving before `other` has produced anything are dropped;
    /// `other` on its own never triggers an emission. Disposing the returned
    /// subscription disposes both child subscriptions.
    pub fn with_latest<U>(&self, other: &Source<U>) -> Source<(T, U)>
    where
        U: Clone + Send + 'static,
    {
        let primary = self.clone();
        let companion = other.clone();
        Source::new(move |handler| {
            let latest: Arc<Mutex<Option<U>>> = Arc::new(Mutex::new(None));

            let latest_writer = latest.clone();
            let companion_sub = companion.subscribe(move |value| {
                if let Ok(mut slot) = latest_writer.lock() {
                    *slot = Some(value);
                }
            });

            let primary_sub = primary.subscribe(move |value| {
                let snapshot = latest.lock().map(|slot| slot.clone()).unwrap_or(None);
                if let Some(latest_value) = snapshot {
                    handler((value, latest_value));
                }
            });

            Subscription::group(vec![primary_sub, companion_sub])
        })
    }

    /// Arrival-order fan-in over independently driven sources.
    ///
    /// Every element from any input is forwarded as it arrives; no
    /// deduplication, no buffering, no cross-input ordering guarantee.
    /// Disposing the returned subscription disposes all input subscriptions.
    pub fn merge(sources: Vec<Source<T>>) -> Source<T> {
        Source::new(move |handler| {
            let children = sources
                .iter()
                .map(|source| {
                    let handler = handler.clone();
                    source.subscribe(move |value| handler(value))
                })
                .collect();
            Subscription::group(children)
        })
    }
}

impl<T: Send + 'static> Source<Option<T>> {
    /// Collapse absent values out of the stream.
    ///
    /// The resulting element type has no absence case; an upstream `None`
    /// produces zero emissions.
    pub fn present(&self) -> Source<T> {
        self.filter_map(|value| value)
    }
}

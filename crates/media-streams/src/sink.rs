//! Write-only endpoints over mutable engine properties.
//!
//! The dual of the property stream: each accepted value is assigned to the
//! external property synchronously and immediately. No buffering, no
//! coalescing, no back-pressure; last write wins. A sink never errors — if
//! the owning object is gone, the write is silently dropped.

use std::sync::Arc;

use crate::property::Property;

type WriteFn<T> = dyn Fn(T) + Send + Sync;

/// Write-only endpoint for one mutable property.
pub struct PropertySink<T> {
    write: Arc<WriteFn<T>>,
}

impl<T> Clone for PropertySink<T> {
    fn clone(&self) -> Self {
        Self {
            write: self.write.clone(),
        }
    }
}

impl<T> PropertySink<T> {
    /// Apply `value` to the underlying property now.
    ///
    /// Callers issuing concurrent writes must serialize externally if
    /// ordering matters; the sink itself provides none.
    pub fn send(&self, value: T) {
        (self.write)(value);
    }
}

/// Bind a sink to one mutable property of `owner`.
///
/// Holds only a `Weak` reference; writes after the owner is released are
/// no-ops.
pub fn property_sink<O, T>(owner: &Arc<O>, select: fn(&O) -> &Property<T>) -> PropertySink<T>
where
    O: Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    let weak = Arc::downgrade(owner);
    PropertySink {
        write: Arc::new(move |value: T| match weak.upgrade() {
            Some(strong) => select(&strong).store(Some(value)),
            None => tracing::trace!("dropping write, property owner released"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePlayer {
        volume: Property<f32>,
    }

    fn player() -> Arc<FakePlayer> {
        Arc::new(FakePlayer {
            volume: Property::new(Some(1.0)),
        })
    }

    #[test]
    fn writes_apply_immediately_and_last_write_wins() {
        let owner = player();
        let sink = property_sink(&owner, |p| &p.volume);

        sink.send(0.5);
        assert_eq!(owner.volume.get(), Some(0.5));
        sink.send(1.0);
        assert_eq!(owner.volume.get(), Some(1.0));
    }

    #[test]
    fn write_after_owner_release_is_a_silent_no_op() {
        let owner = player();
        let sink = property_sink(&owner, |p| &p.volume);
        drop(owner);
        sink.send(0.25);
    }

    #[test]
    fn sink_does_not_keep_the_owner_alive() {
        let owner = player();
        let weak = Arc::downgrade(&owner);
        let _sink = property_sink(&owner, |p| &p.volume);
        drop(owner);
        assert!(weak.upgrade().is_none());
    }
}

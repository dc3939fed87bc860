//! Push-stream observation layer for a media player.
//!
//! Wraps engine-owned observable properties and notifications behind typed,
//! lazily-subscribed, cancellable streams, and mutable player properties
//! behind write-only sinks. All state originates in the engine; this crate
//! only translates callbacks into streams and stream values into writes.

pub mod dispatch;
pub mod fault;
pub mod item;
pub mod notify;
pub mod player;
pub mod property;
pub mod sink;
pub mod source;
pub mod subscription;

pub use media_stream_types::{FaultKind, ItemStatus, TimeRange, TimedMetadata};

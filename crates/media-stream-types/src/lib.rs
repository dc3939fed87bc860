use std::fmt;

use serde::{Deserialize, Serialize};

/// Load state of a player item as reported by the media engine.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// The item has not been evaluated yet.
    #[default]
    Unknown,
    /// The item can be played.
    ReadyToPlay,
    /// The item can no longer be played.
    Failed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Unknown => write!(f, "unknown"),
            ItemStatus::ReadyToPlay => write!(f, "readyToPlay"),
            ItemStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Recovered classification of a playback fault.
///
/// Faults are informational stream values, never stream-terminating errors.
/// Exactly one classification is assigned per fault occurrence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The media resource exists but cannot be served right now.
    Unavailable,
    /// The media resource does not exist.
    NotFound,
    /// Playback started but could not run to the end.
    FailedToPlayToEnd,
    /// Playback stalled waiting for data.
    Stalled,
    /// No known error code matched.
    Unknown,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Unavailable => write!(f, "unavailable"),
            FaultKind::NotFound => write!(f, "notFound"),
            FaultKind::FailedToPlayToEnd => write!(f, "failedToPlayToEnd"),
            FaultKind::Stalled => write!(f, "stalled"),
            FaultKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Half-open media time range.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRange {
    /// Range start in milliseconds of media time.
    pub start_ms: u64,
    /// Range length in milliseconds.
    pub duration_ms: u64,
}

impl TimeRange {
    /// Exclusive end of the range in milliseconds.
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }
}

/// One timed metadata entry carried by the media stream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimedMetadata {
    /// Metadata key (for example `title`, `artist`).
    pub identifier: String,
    /// String form of the metadata value.
    pub value: String,
    /// Media time the entry applies to, when the container provides one.
    pub timestamp_ms: Option<u64>,
}

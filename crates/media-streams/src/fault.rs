//! Fault classification from the engine's error log.
//!
//! The raw error representation never escapes to stream consumers: every
//! failure is recovered into a [`FaultKind`] and delivered as ordinary data.

use media_stream_types::FaultKind;
use thiserror::Error;

/// One entry from the engine's per-item error log.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{domain} error {status_code}{detail}", detail = .comment.as_deref().map(|c| format!(": {c}")).unwrap_or_default())]
pub struct ErrorLogEvent {
    /// Error domain reported by the engine (for example `http`).
    pub domain: String,
    /// Domain-specific status code.
    pub status_code: i32,
    /// Free-form detail, when the engine provides one.
    pub comment: Option<String>,
}

impl ErrorLogEvent {
    /// Classification of this single entry.
    pub fn kind(&self) -> FaultKind {
        match self.status_code {
            404 => FaultKind::NotFound,
            503 => FaultKind::Unavailable,
            _ => FaultKind::Unknown,
        }
    }
}

/// Classify a failure from the log as it stands at the moment of failure.
///
/// `NotFound` outranks `Unavailable`; anything else, including an empty
/// log, is `Unknown`.
pub fn classify(events: &[ErrorLogEvent]) -> FaultKind {
    let kinds: Vec<FaultKind> = events.iter().map(ErrorLogEvent::kind).collect();
    if kinds.contains(&FaultKind::NotFound) {
        return FaultKind::NotFound;
    }
    if kinds.contains(&FaultKind::Unavailable) {
        return FaultKind::Unavailable;
    }
    FaultKind::Unknown
}

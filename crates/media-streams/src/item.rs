//! Observation surface for one playable item.
//!
//! [`PlayerItem`] is the engine-owned object this layer fronts: the engine
//! stores status, range, and metadata updates into its properties, appends
//! to its error log, and posts item notifications to a [`NotificationHub`];
//! consumers take streams and sinks from it. The item itself schedules
//! nothing.

use std::sync::{Arc, Mutex};

use media_stream_types::{FaultKind, ItemStatus, TimeRange, TimedMetadata};

use crate::fault::{ErrorLogEvent, classify};
use crate::notify::{NotificationHub, NotificationName, ObjectId, notification_stream};
use crate::property::{Property, present_stream, with_owner};
use crate::sink::{PropertySink, property_sink};
use crate::source::Source;

/// One playable media item.
pub struct PlayerItem {
    id: ObjectId,
    status: Property<ItemStatus>,
    seekable_ranges: Property<Vec<TimeRange>>,
    timed_metadata: Property<Vec<TimedMetadata>>,
    preferred_peak_bit_rate: Property<f64>,
    error_log: Mutex<Vec<ErrorLogEvent>>,
}

impl Default for PlayerItem {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerItem {
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
            status: Property::new(Some(ItemStatus::Unknown)),
            seekable_ranges: Property::new(None),
            timed_metadata: Property::new(None),
            preferred_peak_bit_rate: Property::new(Some(0.0)),
            error_log: Mutex::new(Vec::new()),
        }
    }

    /// Identity used as the originating-object filter for notifications.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Engine-facing status cell.
    pub fn status(&self) -> &Property<ItemStatus> {
        &self.status
    }

    /// Engine-facing seekable-ranges cell.
    pub fn seekable_ranges(&self) -> &Property<Vec<TimeRange>> {
        &self.seekable_ranges
    }

    /// Engine-facing timed-metadata cell.
    pub fn timed_metadata(&self) -> &Property<Vec<TimedMetadata>> {
        &self.timed_metadata
    }

    /// Engine-facing peak-bitrate cell.
    pub fn preferred_peak_bit_rate(&self) -> &Property<f64> {
        &self.preferred_peak_bit_rate
    }

    /// Append an entry to the error log.
    ///
    /// The engine must log before storing a `Failed` status; classification
    /// reads the log at the moment the failure is observed.
    pub fn log_error(&self, event: ErrorLogEvent) {
        if let Ok(mut log) = self.error_log.lock() {
            log.push(event);
        }
    }

    /// Snapshot of the error log.
    pub fn error_log(&self) -> Vec<ErrorLogEvent> {
        self.error_log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Status changes, current value first.
    pub fn status_stream(self: &Arc<Self>) -> Source<ItemStatus> {
        present_stream(self, |item| &item.status)
    }

    /// Seekable-range updates, absent values filtered.
    pub fn seekable_ranges_stream(self: &Arc<Self>) -> Source<Vec<TimeRange>> {
        present_stream(self, |item| &item.seekable_ranges)
    }

    /// Timed-metadata updates, absent values filtered.
    pub fn timed_metadata_stream(self: &Arc<Self>) -> Source<Vec<TimedMetadata>> {
        present_stream(self, |item| &item.timed_metadata)
    }

    /// Fires once per observed `Failed` status, classified from the error
    /// log as it stands at that moment (recomputed per emission).
    pub fn error_status_stream(self: &Arc<Self>) -> Source<FaultKind> {
        let weak = Arc::downgrade(self);
        self.status_stream()
            .filter(|status| *status == ItemStatus::Failed)
            .map(move |_| {
                with_owner(&weak, |item| classify(&item.error_log()))
                    .unwrap_or(FaultKind::Unknown)
            })
    }

    /// Every fault affecting this item, whatever its delivery mechanism:
    /// status failures, failed-to-play-to-end, and stall notifications,
    /// merged by arrival.
    pub fn fault_stream(self: &Arc<Self>, hub: &Arc<NotificationHub>) -> Source<FaultKind> {
        let failed_to_play =
            notification_stream(hub, NotificationName::FailedToPlayToEnd, Some(self.id))
                .map(|_| FaultKind::FailedToPlayToEnd);
        let stalled = notification_stream(hub, NotificationName::PlaybackStalled, Some(self.id))
            .map(|_| FaultKind::Stalled);
        Source::merge(vec![self.error_status_stream(), failed_to_play, stalled])
    }

    /// Fires when the item plays through to its end.
    pub fn played_to_end_stream(self: &Arc<Self>, hub: &Arc<NotificationHub>) -> Source<()> {
        notification_stream(hub, NotificationName::DidPlayToEnd, Some(self.id)).map(|_| ())
    }

    /// Write-only endpoint for the preferred peak bitrate (bits per second).
    pub fn peak_bit_rate_sink(self: &Arc<Self>) -> PropertySink<f64> {
        property_sink(self, |item| &item.preferred_peak_bit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value| sink.lock().unwrap().push(value))
    }

    fn http_error(code: i32) -> ErrorLogEvent {
        ErrorLogEvent {
            domain: "http".into(),
            status_code: code,
            comment: None,
        }
    }

    #[test]
    fn failed_status_with_not_found_log_emits_exactly_one_not_found() {
        let item = Arc::new(PlayerItem::new());
        let (seen, on_fault) = collect();
        let _sub = item.error_status_stream().subscribe(on_fault);

        item.log_error(http_error(404));
        item.status().store(Some(ItemStatus::Failed));

        assert_eq!(*seen.lock().unwrap(), vec![FaultKind::NotFound]);
    }

    #[test]
    fn non_failed_statuses_emit_no_error() {
        let item = Arc::new(PlayerItem::new());
        let (seen, on_fault) = collect();
        let _sub = item.error_status_stream().subscribe(on_fault);

        item.status().store(Some(ItemStatus::ReadyToPlay));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn classification_reads_the_log_at_each_failure() {
        let item = Arc::new(PlayerItem::new());
        let (seen, on_fault) = collect();
        let _sub = item.error_status_stream().subscribe(on_fault);

        // Empty log at first failure, populated by the second.
        item.status().store(Some(ItemStatus::Failed));
        item.log_error(http_error(503));
        item.status().store(Some(ItemStatus::Failed));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![FaultKind::Unknown, FaultKind::Unavailable]
        );
    }

    #[test]
    fn stall_notification_yields_exactly_one_stalled_fault() {
        let item = Arc::new(PlayerItem::new());
        let hub = Arc::new(NotificationHub::new());
        let (seen, on_fault) = collect();
        let _sub = item.fault_stream(&hub).subscribe(on_fault);

        hub.post(NotificationName::PlaybackStalled, item.id());
        assert_eq!(*seen.lock().unwrap(), vec![FaultKind::Stalled]);

        hub.post(NotificationName::FailedToPlayToEnd, item.id());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![FaultKind::Stalled, FaultKind::FailedToPlayToEnd]
        );
    }

    #[test]
    fn fault_stream_ignores_other_items_notifications() {
        let item = Arc::new(PlayerItem::new());
        let other = Arc::new(PlayerItem::new());
        let hub = Arc::new(NotificationHub::new());
        let (seen, on_fault) = collect();
        let _sub = item.fault_stream(&hub).subscribe(on_fault);

        hub.post(NotificationName::PlaybackStalled, other.id());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn disposing_fault_stream_removes_all_source_registrations() {
        let item = Arc::new(PlayerItem::new());
        let hub = Arc::new(NotificationHub::new());
        let sub = item.fault_stream(&hub).subscribe(|_| {});

        assert_eq!(item.status().observer_count(), 1);
        assert_eq!(hub.observer_count(NotificationName::PlaybackStalled), 1);
        assert_eq!(hub.observer_count(NotificationName::FailedToPlayToEnd), 1);

        sub.dispose();
        assert_eq!(item.status().observer_count(), 0);
        assert_eq!(hub.observer_count(NotificationName::PlaybackStalled), 0);
        assert_eq!(hub.observer_count(NotificationName::FailedToPlayToEnd), 0);
    }

    #[test]
    fn played_to_end_fires_per_notification() {
        let item = Arc::new(PlayerItem::new());
        let hub = Arc::new(NotificationHub::new());
        let (seen, on_end) = collect::<()>();
        let _sub = item.played_to_end_stream(&hub).subscribe(on_end);

        hub.post(NotificationName::DidPlayToEnd, item.id());
        hub.post(NotificationName::DidPlayToEnd, item.id());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn metadata_and_range_streams_replay_current_value() {
        let item = Arc::new(PlayerItem::new());
        item.seekable_ranges().store(Some(vec![TimeRange {
            start_ms: 0,
            duration_ms: 30_000,
        }]));

        let (ranges, on_ranges) = collect();
        let _sub = item.seekable_ranges_stream().subscribe(on_ranges);
        assert_eq!(ranges.lock().unwrap().len(), 1);

        let (meta, on_meta) = collect();
        let _sub2 = item.timed_metadata_stream().subscribe(on_meta);
        // Metadata starts absent: nothing replayed.
        assert!(meta.lock().unwrap().is_empty());

        item.timed_metadata().store(Some(vec![TimedMetadata {
            identifier: "title".into(),
            value: "Example".into(),
            timestamp_ms: Some(1_000),
        }]));
        assert_eq!(meta.lock().unwrap().len(), 1);
    }

    #[test]
    fn peak_bit_rate_sink_writes_through() {
        let item = Arc::new(PlayerItem::new());
        let sink = item.peak_bit_rate_sink();
        sink.send(2_500_000.0);
        assert_eq!(item.preferred_peak_bit_rate().get(), Some(2_500_000.0));
    }
}

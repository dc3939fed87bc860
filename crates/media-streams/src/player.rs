//! Observation surface for the player itself.
//!
//! Rate is both observable and settable; storing 0.0 or 1.0 through the
//! rate sink is the pause/play pair of the native framework, so prefer the
//! sink over any play/pause verb. Periodic time ticks are delivered on a
//! caller-supplied [`TaskQueue`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick};

use crate::dispatch::TaskQueue;
use crate::notify::ObjectId;
use crate::property::{Property, present_stream, with_owner};
use crate::sink::{PropertySink, property_sink};
use crate::source::Source;
use crate::subscription::Subscription;

/// The engine-owned player object.
pub struct Player {
    id: ObjectId,
    rate: Property<f32>,
    volume: Property<f32>,
    position: Mutex<Duration>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
            rate: Property::new(Some(0.0)),
            volume: Property::new(Some(1.0)),
            position: Mutex::new(Duration::ZERO),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Engine-facing rate cell.
    pub fn rate(&self) -> &Property<f32> {
        &self.rate
    }

    /// Engine-facing volume cell.
    pub fn volume(&self) -> &Property<f32> {
        &self.volume
    }

    /// Current playhead position.
    pub fn position(&self) -> Duration {
        self.position.lock().map(|p| *p).unwrap_or(Duration::ZERO)
    }

    /// Engine-side playhead update.
    pub fn set_position(&self, position: Duration) {
        if let Ok(mut slot) = self.position.lock() {
            *slot = position;
        }
    }

    /// Rate changes, current value first.
    pub fn rate_stream(self: &Arc<Self>) -> Source<f32> {
        present_stream(self, |player| &player.rate)
    }

    /// Write-only endpoint for the playback rate.
    pub fn rate_sink(self: &Arc<Self>) -> PropertySink<f32> {
        property_sink(self, |player| &player.rate)
    }

    /// Write-only endpoint for the output volume.
    pub fn volume_sink(self: &Arc<Self>) -> PropertySink<f32> {
        property_sink(self, |player| &player.volume)
    }

    /// Playhead samples every `interval`, delivered on `queue`.
    ///
    /// Each subscription runs its own ticker; disposal stops the ticker and
    /// the ticker also exits on its own once the player is released. A tick
    /// already posted to the queue at disposal time may still be delivered.
    pub fn periodic_time(self: &Arc<Self>, interval: Duration, queue: TaskQueue) -> Source<Duration> {
        let weak = Arc::downgrade(self);
        Source::new(move |handler| {
            let ticker = tick(interval);
            let (stop_tx, stop_rx) = bounded::<()>(1);
            let weak = weak.clone();
            let queue = queue.clone();

            std::thread::spawn(move || {
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> msg => {
                            if msg.is_err() {
                                break;
                            }
                            let Some(position) = with_owner(&weak, |p| p.position()) else {
                                tracing::debug!("player released, stopping periodic ticker");
                                break;
                            };
                            let handler = handler.clone();
                            queue.run(move || handler(position));
                        }
                    }
                }
            });

            Subscription::new(move || {
                let _ = stop_tx.send(());
            })
        })
    }
}

//! Sensor subscription and tilt delivery.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use snowtilt_core::Tilt;

use crate::cell::TiltCell;
use crate::orientation::tilt_from_vector;
use crate::sensors::RotationSensor;

/// Default delivery cadence, roughly a UI refresh.
pub const UI_DELAY: Duration = Duration::from_millis(60);

/// Converts rotation-sensor events into tilt readings.
pub struct TiltSource {
    sensor: Option<Box<dyn RotationSensor>>,
    delay: Duration,
}

impl TiltSource {
    /// Create a tilt source over an optional sensor, polled every `delay`.
    pub fn new(sensor: Option<Box<dyn RotationSensor>>, delay: Duration) -> Self {
        Self { sensor, delay }
    }

    /// Whether the device has a rotation sensor at all.
    pub fn has_sensor(&self) -> bool {
        self.sensor.is_some()
    }

    /// Subscribe to the sensor, calling `on_reading` for every new event.
    ///
    /// Without a sensor the returned handle is inert and no callback is
    /// ever made.
    pub fn start<F>(self, mut on_reading: F) -> SubscriptionHandle
    where
        F: FnMut(Tilt) + Send + 'static,
    {
        let Some(mut sensor) = self.sensor else {
            log::warn!("no rotation sensor available, tilt stays level");
            return SubscriptionHandle {
                sensor_name: None,
                stop_tx: None,
                thread: None,
            };
        };

        let sensor_name = sensor.name();
        let delay = self.delay;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("tilt-source".into())
            .spawn(move || {
                loop {
                    if let Some(vector) = sensor.read() {
                        on_reading(tilt_from_vector(&vector));
                    }
                    // A stop message or a dropped sender both end delivery
                    match stop_rx.recv_timeout(delay) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        SubscriptionHandle::from_spawn(sensor_name, delay, stop_tx, thread)
    }

    /// Subscribe and write every reading into `cell`.
    pub fn start_into(self, cell: TiltCell) -> SubscriptionHandle {
        self.start(move |tilt| cell.store(tilt))
    }
}

/// Live sensor subscription. Released on [`stop`](Self::stop) or drop.
#[derive(Debug)]
pub struct SubscriptionHandle {
    sensor_name: Option<&'static str>,
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Wrap the outcome of spawning the delivery thread. A failed spawn
    /// leaves the handle in degraded mode, with no sensor reported.
    fn from_spawn(
        sensor_name: &'static str,
        delay: Duration,
        stop_tx: Sender<()>,
        spawned: io::Result<JoinHandle<()>>,
    ) -> Self {
        match spawned {
            Ok(thread) => {
                log::info!("tilt source started ({sensor_name}, every {delay:?})");
                Self {
                    sensor_name: Some(sensor_name),
                    stop_tx: Some(stop_tx),
                    thread: Some(thread),
                }
            }
            Err(e) => {
                log::warn!("failed to spawn tilt delivery thread: {e}; tilt stays level");
                Self {
                    sensor_name: None,
                    stop_tx: None,
                    thread: None,
                }
            }
        }
    }

    /// Name of the subscribed sensor, `None` in degraded mode.
    pub fn sensor_name(&self) -> Option<&'static str> {
        self.sensor_name
    }

    /// Whether readings are still being delivered.
    pub fn is_active(&self) -> bool {
        self.thread.is_some()
    }

    /// Release the subscription. No callback runs after this returns.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("tilt delivery thread panicked");
            } else {
                log::info!("tilt source stopped");
            }
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

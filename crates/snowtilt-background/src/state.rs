//! Snowfall tick loop running on its own thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use snowtilt_core::{Particle, SurfaceSize};
use snowtilt_sensor::TiltCell;

use crate::snow::Snowfall;

/// Fixed simulation cadence.
pub const TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Default number of snowflakes.
pub const DEFAULT_COUNT: usize = 10;

/// State shared between the loop thread and its owner.
#[derive(Debug, Default)]
struct Shared {
    /// Particle set published after every iteration.
    particles: RwLock<Vec<Particle>>,
    /// Latest surface size reported by the renderer.
    surface: RwLock<Option<SurfaceSize>>,
    /// Skip ticks while set.
    paused: AtomicBool,
    /// Ticks applied so far.
    ticks: AtomicU64,
}

/// Drives a [`Snowfall`] at a fixed cadence on a background thread.
#[derive(Debug)]
pub struct SnowfallLoop {
    shared: Arc<Shared>,
    count: usize,
    interval: Duration,
    seed: u64,
    signal_tx: Option<Sender<Signal>>,
    thread: Option<JoinHandle<()>>,
}

/// Messages to the loop thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Run the next iteration now.
    Wake,
    Stop,
}

impl Default for SnowfallLoop {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT, TICK_INTERVAL, None)
    }
}

impl SnowfallLoop {
    /// Create a stopped loop. Without a seed, one is taken from the clock.
    pub fn new(count: usize, interval: Duration, seed: Option<u64>) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let seed = seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });

        Self {
            shared: Arc::new(Shared::default()),
            count,
            interval,
            seed,
            signal_tx: None,
            thread: None,
        }
    }

    /// Start ticking, reading tilt from `tilt` on every iteration.
    pub fn start(&mut self, tilt: TiltCell) {
        if self.thread.is_some() {
            return;
        }

        let shared = self.shared.clone();
        let interval = self.interval;
        let mut snow = Snowfall::seeded(self.count, self.seed);
        let (signal_tx, signal_rx) = mpsc::channel::<Signal>();

        let spawned = thread::Builder::new()
            .name("snowfall".into())
            .spawn(move || {
                loop {
                    let requested = shared.surface.read().ok().and_then(|s| *s);
                    // A fresh set is published as seeded; the first tick waits an interval
                    let reinitialized = requested.is_some_and(|size| snow.on_surface_resize(size));

                    if !reinitialized && !shared.paused.load(Ordering::Relaxed) && snow.is_ready() {
                        snow.step(tilt.load());
                        shared.ticks.fetch_add(1, Ordering::Relaxed);
                    }

                    if let Ok(mut published) = shared.particles.write() {
                        published.clear();
                        published.extend_from_slice(snow.particles());
                    }

                    match signal_rx.recv_timeout(interval) {
                        Ok(Signal::Wake) | Err(RecvTimeoutError::Timeout) => continue,
                        Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                log::info!(
                    "snowfall loop started ({} flakes, every {:?}, seed {})",
                    self.count,
                    interval,
                    self.seed
                );
                self.signal_tx = Some(signal_tx);
                self.thread = Some(handle);
            }
            Err(e) => log::error!("failed to spawn snowfall loop: {e}"),
        }
    }

    /// Stop ticking. No tick runs after this returns.
    pub fn stop(&mut self) {
        if let Some(tx) = self.signal_tx.take() {
            let _ = tx.send(Signal::Stop);
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("snowfall loop panicked");
            } else {
                log::info!("snowfall loop stopped");
            }
        }
    }

    /// Report the drawing surface size.
    ///
    /// A changed size wakes the loop, which publishes a freshly seeded set
    /// right away and ticks it one interval later.
    pub fn on_surface_resize(&self, size: SurfaceSize) {
        let changed = match self.shared.surface.write() {
            Ok(mut surface) if *surface != Some(size) => {
                *surface = Some(size);
                true
            }
            _ => false,
        };
        if changed && let Some(tx) = &self.signal_tx {
            let _ = tx.send(Signal::Wake);
        }
    }

    /// Latest published particle set.
    pub fn snapshot(&self) -> Vec<Particle> {
        self.shared
            .particles
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Number of ticks applied since start.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Drop for SnowfallLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use snowtilt_core::Tilt;

    use super::*;

    fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        done()
    }

    #[test]
    fn test_loop_creation() {
        let snow = SnowfallLoop::default();
        assert!(!snow.is_running());
        assert!(snow.snapshot().is_empty());
        assert_eq!(snow.ticks(), 0);
    }

    #[test]
    fn test_no_ticks_before_surface_known() {
        let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(1));
        snow.start(TiltCell::new());
        thread::sleep(Duration::from_millis(20));
        assert_eq!(snow.ticks(), 0);
        assert!(snow.snapshot().is_empty());
        snow.stop();
    }

    #[test]
    fn test_publishes_particles_after_resize() {
        let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(1));
        snow.start(TiltCell::new());
        snow.on_surface_resize(SurfaceSize::new(80.0, 1000.0));
        assert!(wait_for(|| snow.ticks() > 3));
        let particles = snow.snapshot();
        assert_eq!(particles.len(), 5);
        assert!(particles.iter().any(|p| p.y > 0.0));
        snow.stop();
    }

    #[test]
    fn test_tilt_is_read_every_tick() {
        let tilt = TiltCell::new();
        let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(3));
        snow.on_surface_resize(SurfaceSize::new(10_000.0, 10_000.0));
        snow.start(tilt.clone());
        assert!(wait_for(|| snow.ticks() > 0));
        let start: Vec<f32> = snow.snapshot().iter().map(|p| p.x).collect();

        tilt.store(Tilt::new(1.0, 0.0));
        assert!(wait_for(|| {
            snow.snapshot()
                .iter()
                .zip(&start)
                .any(|(p, x0)| p.x > *x0)
        }));
        snow.stop();
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(1));
        snow.on_surface_resize(SurfaceSize::new(80.0, 40.0));
        snow.start(TiltCell::new());
        assert!(wait_for(|| snow.ticks() > 0));

        snow.set_paused(true);
        assert!(snow.is_paused());
        thread::sleep(Duration::from_millis(10));
        let paused_at = snow.ticks();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(snow.ticks(), paused_at);

        snow.set_paused(false);
        assert!(wait_for(|| snow.ticks() > paused_at));
        snow.stop();
    }

    #[test]
    fn test_stop_halts_ticking() {
        let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(1));
        snow.on_surface_resize(SurfaceSize::new(80.0, 40.0));
        snow.start(TiltCell::new());
        assert!(wait_for(|| snow.ticks() > 0));

        snow.stop();
        assert!(!snow.is_running());
        let stopped_at = snow.ticks();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(snow.ticks(), stopped_at);
    }

    #[test]
    fn test_fresh_set_is_published_before_first_tick() {
        let mut snow = SnowfallLoop::new(5, Duration::from_secs(5), Some(1));
        snow.on_surface_resize(SurfaceSize::new(100.0, 1000.0));
        snow.start(TiltCell::new());
        assert!(wait_for(|| snow.snapshot().len() == 5));
        thread::sleep(Duration::from_millis(50));

        assert_eq!(snow.ticks(), 0);
        assert!(snow.snapshot().iter().all(|p| p.y == 0.0));
        snow.stop();
    }

    #[test]
    fn test_resize_while_running_publishes_top_row() {
        let mut snow = SnowfallLoop::new(4, Duration::from_millis(300), Some(5));
        snow.on_surface_resize(SurfaceSize::new(100.0, 10_000.0));
        snow.start(TiltCell::new());
        assert!(wait_for(|| snow.ticks() > 0 && snow.snapshot().iter().all(|p| p.y > 0.0)));

        snow.on_surface_resize(SurfaceSize::new(20.0, 5_000.0));
        assert!(wait_for(|| {
            let particles = snow.snapshot();
            particles.len() == 4 && particles.iter().all(|p| p.y == 0.0 && p.x <= 20.0)
        }));
        snow.stop();
    }

    #[test]
    fn test_drop_stops_ticking() {
        let ticks = {
            let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(1));
            snow.on_surface_resize(SurfaceSize::new(80.0, 40.0));
            snow.start(TiltCell::new());
            assert!(wait_for(|| snow.ticks() > 0));
            snow.shared.clone()
        };
        let after_drop = ticks.ticks.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.ticks.load(Ordering::Relaxed), after_drop);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut snow = SnowfallLoop::new(5, Duration::from_millis(1), Some(1));
        snow.start(TiltCell::new());
        snow.start(TiltCell::new());
        assert!(snow.is_running());
    }

    #[test]
    fn test_resize_reinitializes_published_set() {
        let mut snow = SnowfallLoop::new(4, Duration::from_millis(1), Some(5));
        snow.on_surface_resize(SurfaceSize::new(100.0, 10_000.0));
        snow.start(TiltCell::new());
        assert!(wait_for(|| snow.snapshot().iter().any(|p| p.y > 10.0)));

        snow.set_paused(true);
        snow.on_surface_resize(SurfaceSize::new(20.0, 5_000.0));
        assert!(wait_for(|| {
            let particles = snow.snapshot();
            particles.len() == 4 && particles.iter().all(|p| p.y == 0.0 && p.x <= 20.0)
        }));
        snow.stop();
    }
}

//! Rotation-vector sensor backends.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::orientation::{RotationVector, vector_from_pitch_roll};

/// Largest angle the manual sensor can be tipped to, in degrees.
const MANUAL_LIMIT_DEG: f32 = 85.0;

/// Peak roll of the sway sensor, in degrees.
const SWAY_ROLL_DEG: f32 = 30.0;

/// Peak pitch of the sway sensor, in degrees.
const SWAY_PITCH_DEG: f32 = 10.0;

/// Full roll cycle of the sway sensor.
const SWAY_PERIOD: Duration = Duration::from_secs(6);

/// A source of rotation-vector events.
pub trait RotationSensor: Send {
    /// Newest event since the previous call, if any.
    fn read(&mut self) -> Option<RotationVector>;

    /// Short human-readable name.
    fn name(&self) -> &'static str;
}

/// Which rotation sensor the device offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// No rotation sensor; tilt stays level.
    None,
    /// Tilted by hand from the keyboard.
    #[default]
    Keyboard,
    /// Gently rocks from side to side on its own.
    Sway,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::None => "none",
            SensorKind::Keyboard => "keyboard",
            SensorKind::Sway => "sway",
        };
        f.write_str(name)
    }
}

/// Result of looking up the device's rotation sensor.
pub struct SensorSelection {
    /// The sensor, or `None` when the device has none.
    pub sensor: Option<Box<dyn RotationSensor>>,
    /// Controls for a manually tilted sensor.
    pub controls: Option<ManualSensorHandle>,
}

/// Look up the rotation sensor of the given kind.
pub fn default_rotation_sensor(kind: SensorKind) -> SensorSelection {
    match kind {
        SensorKind::None => SensorSelection {
            sensor: None,
            controls: None,
        },
        SensorKind::Keyboard => {
            let (sensor, controls) = ManualSensor::new();
            SensorSelection {
                sensor: Some(Box::new(sensor)),
                controls: Some(controls),
            }
        }
        SensorKind::Sway => SensorSelection {
            sensor: Some(Box::new(SwaySensor::new())),
            controls: None,
        },
    }
}

#[derive(Debug, Default)]
struct ManualState {
    pitch_deg: f32,
    roll_deg: f32,
    /// Set when the angles changed since the last read.
    pending: bool,
}

/// Sensor whose attitude is set through a [`ManualSensorHandle`].
///
/// It only emits an event after the attitude changes, like a real device
/// lying still.
#[derive(Debug)]
pub struct ManualSensor {
    state: Arc<RwLock<ManualState>>,
}

/// Control side of a [`ManualSensor`].
#[derive(Debug, Clone)]
pub struct ManualSensorHandle {
    state: Arc<RwLock<ManualState>>,
}

impl ManualSensor {
    /// Create a level sensor and its control handle.
    pub fn new() -> (Self, ManualSensorHandle) {
        let state = Arc::new(RwLock::new(ManualState {
            pending: true,
            ..Default::default()
        }));
        (
            Self {
                state: state.clone(),
            },
            ManualSensorHandle { state },
        )
    }
}

impl RotationSensor for ManualSensor {
    fn read(&mut self) -> Option<RotationVector> {
        let mut state = self.state.write().ok()?;
        if !state.pending {
            return None;
        }
        state.pending = false;
        Some(vector_from_pitch_roll(
            state.pitch_deg.to_radians(),
            state.roll_deg.to_radians(),
        ))
    }

    fn name(&self) -> &'static str {
        "keyboard"
    }
}

impl ManualSensorHandle {
    /// Tip the device by the given amounts, in degrees.
    pub fn nudge(&self, pitch_deg: f32, roll_deg: f32) {
        if let Ok(mut state) = self.state.write() {
            state.pitch_deg = (state.pitch_deg + pitch_deg).clamp(-MANUAL_LIMIT_DEG, MANUAL_LIMIT_DEG);
            state.roll_deg = (state.roll_deg + roll_deg).clamp(-MANUAL_LIMIT_DEG, MANUAL_LIMIT_DEG);
            state.pending = true;
        }
    }

    /// Lay the device flat.
    pub fn level(&self) {
        if let Ok(mut state) = self.state.write() {
            state.pitch_deg = 0.0;
            state.roll_deg = 0.0;
            state.pending = true;
        }
    }

    /// Current (pitch, roll) in degrees.
    pub fn angles(&self) -> (f32, f32) {
        self.state
            .read()
            .map(|s| (s.pitch_deg, s.roll_deg))
            .unwrap_or((0.0, 0.0))
    }
}

/// Synthetic sensor rocking from side to side.
#[derive(Debug)]
pub struct SwaySensor {
    started: Instant,
}

impl SwaySensor {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SwaySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationSensor for SwaySensor {
    fn read(&mut self) -> Option<RotationVector> {
        let (pitch_deg, roll_deg) = sway_angles(self.started.elapsed());
        Some(vector_from_pitch_roll(
            pitch_deg.to_radians(),
            roll_deg.to_radians(),
        ))
    }

    fn name(&self) -> &'static str {
        "sway"
    }
}

/// Sway attitude (pitch, roll) in degrees after `elapsed`.
fn sway_angles(elapsed: Duration) -> (f32, f32) {
    let phase = elapsed.as_secs_f32() / SWAY_PERIOD.as_secs_f32() * std::f32::consts::TAU;
    let roll = SWAY_ROLL_DEG * phase.sin();
    // Slower, out-of-step pitch so the motion doesn't look mechanical
    let pitch = SWAY_PITCH_DEG * (phase / 1.7).sin();
    (pitch, roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::tilt_from_vector;

    #[test]
    fn test_no_sensor_kind_yields_nothing() {
        let selection = default_rotation_sensor(SensorKind::None);
        assert!(selection.sensor.is_none());
        assert!(selection.controls.is_none());
    }

    #[test]
    fn test_keyboard_kind_has_controls() {
        let selection = default_rotation_sensor(SensorKind::Keyboard);
        assert_eq!(selection.sensor.map(|s| s.name()), Some("keyboard"));
        assert!(selection.controls.is_some());
    }

    #[test]
    fn test_manual_sensor_emits_only_on_change() {
        let (mut sensor, handle) = ManualSensor::new();
        // Initial attitude is delivered once
        assert!(sensor.read().is_some());
        assert!(sensor.read().is_none());

        handle.nudge(0.0, 45.0);
        let tilt = tilt_from_vector(&sensor.read().expect("reading after nudge"));
        assert!((tilt.x - 0.5).abs() < 1e-4);
        assert!(sensor.read().is_none());
    }

    #[test]
    fn test_manual_sensor_clamps_and_levels() {
        let (_sensor, handle) = ManualSensor::new();
        handle.nudge(200.0, -200.0);
        assert_eq!(handle.angles(), (MANUAL_LIMIT_DEG, -MANUAL_LIMIT_DEG));
        handle.level();
        assert_eq!(handle.angles(), (0.0, 0.0));
    }

    #[test]
    fn test_sway_angles_stay_within_amplitude() {
        for ms in (0..20_000).step_by(250) {
            let (pitch, roll) = sway_angles(Duration::from_millis(ms));
            assert!(pitch.abs() <= SWAY_PITCH_DEG + 1e-3);
            assert!(roll.abs() <= SWAY_ROLL_DEG + 1e-3);
        }
        assert_eq!(sway_angles(Duration::ZERO), (0.0, 0.0));
    }

    #[test]
    fn test_sway_sensor_always_reads() {
        let mut sensor = SwaySensor::new();
        assert!(sensor.read().is_some());
        assert!(sensor.read().is_some());
    }
}

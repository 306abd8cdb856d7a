//! Tilt source for the snowtilt snowfall effect.
//!
//! A rotation-vector sensor is polled on a delivery thread; each raw vector is
//! converted into a normalized [`Tilt`] and handed to a callback, usually one
//! that stores it into a [`TiltCell`] read by the simulation loop. A missing
//! sensor is not an error: the subscription is inert and tilt stays level.

mod cell;
mod orientation;
mod sensors;
mod source;

pub use cell::TiltCell;
pub use orientation::{
    Orientation, RotationVector, orientation_from_matrix, rotation_matrix_from_vector,
    tilt_from_vector, vector_from_pitch_roll,
};
pub use sensors::{
    ManualSensor, ManualSensorHandle, RotationSensor, SensorKind, SensorSelection, SwaySensor,
    default_rotation_sensor,
};
pub use snowtilt_core::Tilt;
pub use source::{SubscriptionHandle, TiltSource, UI_DELAY};

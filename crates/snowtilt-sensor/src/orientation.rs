//! Rotation-vector to tilt conversion.

use snowtilt_core::Tilt;

/// Raw rotation-vector sensor event: the vector part of a unit quaternion
/// plus an optional scalar part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Scalar component; some devices omit it.
    pub w: Option<f32>,
}

impl RotationVector {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w: Some(w) }
    }

    /// A vector without the scalar component.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: None }
    }

    /// Scalar component, reconstructed from the unit-norm constraint when absent.
    pub fn scalar(&self) -> f32 {
        self.w.unwrap_or_else(|| {
            let rest = 1.0 - self.x * self.x - self.y * self.y - self.z * self.z;
            if rest > 0.0 { rest.sqrt() } else { 0.0 }
        })
    }
}

/// Device orientation angles in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Rotation around the vertical axis.
    pub azimuth: f32,
    /// Rotation around the device's horizontal axis (forward/back).
    pub pitch: f32,
    /// Rotation around the device's long axis (left/right).
    pub roll: f32,
}

/// Build a row-major 3x3 rotation matrix from a rotation vector.
pub fn rotation_matrix_from_vector(v: &RotationVector) -> [f32; 9] {
    let (q1, q2, q3) = (v.x, v.y, v.z);
    let q0 = v.scalar();

    let sq_q1 = 2.0 * q1 * q1;
    let sq_q2 = 2.0 * q2 * q2;
    let sq_q3 = 2.0 * q3 * q3;
    let q1_q2 = 2.0 * q1 * q2;
    let q3_q0 = 2.0 * q3 * q0;
    let q1_q3 = 2.0 * q1 * q3;
    let q2_q0 = 2.0 * q2 * q0;
    let q2_q3 = 2.0 * q2 * q3;
    let q1_q0 = 2.0 * q1 * q0;

    [
        1.0 - sq_q2 - sq_q3,
        q1_q2 - q3_q0,
        q1_q3 + q2_q0,
        q1_q2 + q3_q0,
        1.0 - sq_q1 - sq_q3,
        q2_q3 - q1_q0,
        q1_q3 - q2_q0,
        q2_q3 + q1_q0,
        1.0 - sq_q1 - sq_q2,
    ]
}

/// Derive azimuth, pitch and roll from a rotation matrix.
pub fn orientation_from_matrix(r: &[f32; 9]) -> Orientation {
    Orientation {
        azimuth: r[1].atan2(r[4]),
        // asin is undefined outside [-1, 1]; rounding can push us slightly past
        pitch: (-r[7]).clamp(-1.0, 1.0).asin(),
        roll: (-r[6]).atan2(r[8]),
    }
}

/// Convert a raw rotation vector into a normalized tilt.
///
/// Azimuth is discarded; roll and pitch are scaled so that ±90° maps to ±1.
/// The result is not clamped, so a device rolled past vertical reports
/// `|x| > 1`.
pub fn tilt_from_vector(v: &RotationVector) -> Tilt {
    let orientation = orientation_from_matrix(&rotation_matrix_from_vector(v));
    Tilt {
        x: orientation.roll.to_degrees() / 90.0,
        y: orientation.pitch.to_degrees() / 90.0,
    }
}

/// Build the rotation vector of a device with zero azimuth and the given
/// pitch and roll (radians).
pub fn vector_from_pitch_roll(pitch: f32, roll: f32) -> RotationVector {
    // Rotation about x by -pitch followed by rotation about y by roll.
    let (sa, ca) = (-pitch / 2.0).sin_cos();
    let (sb, cb) = (roll / 2.0).sin_cos();
    RotationVector::new(sa * cb, ca * sb, sa * sb, ca * cb)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_identity_vector_is_level() {
        let tilt = tilt_from_vector(&RotationVector::new(0.0, 0.0, 0.0, 1.0));
        assert!(tilt.x.abs() < EPS);
        assert!(tilt.y.abs() < EPS);
    }

    #[test]
    fn test_missing_scalar_is_reconstructed() {
        let with = vector_from_pitch_roll(0.3, -0.4);
        let without = RotationVector::from_xyz(with.x, with.y, with.z);
        assert!((without.scalar() - with.scalar()).abs() < EPS);
    }

    #[test]
    fn test_overlong_vector_scalar_is_zero() {
        assert_eq!(RotationVector::from_xyz(1.0, 1.0, 0.0).scalar(), 0.0);
    }

    #[test]
    fn test_roll_ninety_degrees_is_unit_tilt_x() {
        let v = vector_from_pitch_roll(0.0, std::f32::consts::FRAC_PI_2);
        let tilt = tilt_from_vector(&v);
        assert!((tilt.x - 1.0).abs() < EPS, "tilt.x = {}", tilt.x);
        assert!(tilt.y.abs() < EPS);
    }

    #[test]
    fn test_pitch_and_roll_recovered() {
        for (pitch_deg, roll_deg) in [(10.0f32, 0.0f32), (-30.0, 45.0), (60.0, -20.0), (0.0, -85.0)] {
            let v = vector_from_pitch_roll(pitch_deg.to_radians(), roll_deg.to_radians());
            let o = orientation_from_matrix(&rotation_matrix_from_vector(&v));
            assert!(o.azimuth.abs() < EPS, "azimuth {}", o.azimuth);
            assert!((o.pitch.to_degrees() - pitch_deg).abs() < 0.01);
            assert!((o.roll.to_degrees() - roll_deg).abs() < 0.01);

            let tilt = tilt_from_vector(&v);
            assert!((tilt.x - roll_deg / 90.0).abs() < EPS);
            assert!((tilt.y - pitch_deg / 90.0).abs() < EPS);
        }
    }

    #[test]
    fn test_azimuth_is_discarded() {
        // Pure rotation about the vertical axis.
        let half = 0.6f32 / 2.0;
        let v = RotationVector::new(0.0, 0.0, half.sin(), half.cos());
        let o = orientation_from_matrix(&rotation_matrix_from_vector(&v));
        assert!(o.azimuth.abs() > 0.1);
        let tilt = tilt_from_vector(&v);
        assert!(tilt.x.abs() < EPS);
        assert!(tilt.y.abs() < EPS);
    }
}

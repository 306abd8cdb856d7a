//! Last-write-wins tilt cell.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use snowtilt_core::Tilt;

/// Shared cell holding the latest tilt reading.
///
/// Both axes live in one atomic word so a reader always sees a pair written
/// by the same store. Cloning yields another handle to the same cell.
#[derive(Debug, Clone, Default)]
pub struct TiltCell {
    bits: Arc<AtomicU64>,
}

impl TiltCell {
    /// Create a cell holding a level tilt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current reading.
    pub fn store(&self, tilt: Tilt) {
        self.bits.store(pack(tilt), Ordering::Release);
    }

    /// Snapshot of the latest reading.
    pub fn load(&self) -> Tilt {
        unpack(self.bits.load(Ordering::Acquire))
    }
}

fn pack(tilt: Tilt) -> u64 {
    ((tilt.x.to_bits() as u64) << 32) | tilt.y.to_bits() as u64
}

fn unpack(bits: u64) -> Tilt {
    Tilt {
        x: f32::from_bits((bits >> 32) as u32),
        y: f32::from_bits(bits as u32),
    }
}

//! Tilt-driven snowfall simulation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use snowtilt_core::{Particle, SurfaceSize, Tilt};

/// Uniform random sampling used by the simulation.
pub trait RandomSource {
    /// Sample from `[lo, hi)`; returns `lo` when the range is empty.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if !(hi > lo) {
            return lo;
        }
        // `lo + u * (hi - lo)` can round up to `hi` for `u` just below 1
        (lo + self.random::<f32>() * (hi - lo)).min(hi.next_down())
    }
}

/// Create `count` fresh particles along the top edge of `surface`.
pub fn initialize<R: RandomSource + ?Sized>(
    surface: SurfaceSize,
    count: usize,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            x: rng.uniform(0.0, surface.width),
            y: 0.0,
            size: rng.uniform(0.0, 10.0) + 5.0,
            speed: rng.uniform(0.0, 1.0) + 1.0,
        })
        .collect()
}

/// Produce the next particle set without touching the current one.
pub fn tick<R: RandomSource + ?Sized>(
    particles: &[Particle],
    tilt: Tilt,
    surface: SurfaceSize,
    rng: &mut R,
) -> Vec<Particle> {
    let mut next = particles.to_vec();
    advance(&mut next, tilt, surface, rng);
    next
}

/// Advance every particle by one tick in place.
///
/// A particle pushed sideways off the surface is respawned at a random
/// column; one falling past the bottom wraps to the top. Size and speed are
/// kept in both cases.
pub fn advance<R: RandomSource + ?Sized>(
    particles: &mut [Particle],
    tilt: Tilt,
    surface: SurfaceSize,
    rng: &mut R,
) {
    for p in particles {
        let new_x = p.x + p.speed * tilt.x;
        let new_y = p.y + p.speed;

        p.x = if new_x > surface.width || new_x < 0.0 {
            rng.uniform(0.0, surface.width)
        } else {
            new_x
        };
        p.y = if new_y > surface.height { 0.0 } else { new_y };
    }
}

/// Snowfall simulator owning a fixed-count particle set.
///
/// Stays empty until the surface size is first reported through
/// [`on_surface_resize`](Self::on_surface_resize).
#[derive(Debug, Clone)]
pub struct Snowfall<R = Pcg32> {
    particles: Vec<Particle>,
    surface: Option<SurfaceSize>,
    count: usize,
    rng: R,
}

impl Snowfall<Pcg32> {
    /// Simulator with a deterministic generator seeded from `seed`.
    pub fn seeded(count: usize, seed: u64) -> Self {
        Self::new(count, Pcg32::seed_from_u64(seed))
    }
}

impl<R: RandomSource> Snowfall<R> {
    pub fn new(count: usize, rng: R) -> Self {
        Self {
            particles: Vec::new(),
            surface: None,
            count,
            rng,
        }
    }

    /// Report the drawing surface size.
    ///
    /// The first report, and any later one with a different size, discards
    /// the particle set and seeds a fresh one. Returns whether that happened.
    pub fn on_surface_resize(&mut self, size: SurfaceSize) -> bool {
        if self.surface == Some(size) {
            return false;
        }
        log::debug!(
            "reinitializing {} particles for {}x{} surface",
            self.count,
            size.width,
            size.height
        );
        self.surface = Some(size);
        self.particles = initialize(size, self.count, &mut self.rng);
        true
    }

    /// Advance one tick with the given tilt. Does nothing before the surface
    /// size is known.
    pub fn step(&mut self, tilt: Tilt) {
        if let Some(surface) = self.surface {
            advance(&mut self.particles, tilt, surface, &mut self.rng);
        }
    }

    /// Current particle set.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Surface size the particles live in, if known.
    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

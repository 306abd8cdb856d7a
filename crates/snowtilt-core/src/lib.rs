//! Core types shared by the snowtilt crates.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A single simulated snowflake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Horizontal position in logical surface units.
    pub x: f32,
    /// Vertical position in logical surface units, growing downwards.
    pub y: f32,
    /// Drawn radius, fixed at creation.
    pub size: f32,
    /// Fall distance per tick, fixed at creation.
    pub speed: f32,
}

/// Normalized two-axis device tilt; ±1 corresponds to ±90° of roll/pitch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    /// Roll component (left/right).
    pub x: f32,
    /// Pitch component (forward/back).
    pub y: f32,
}

impl Tilt {
    /// A device lying flat.
    pub const LEVEL: Tilt = Tilt { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Logical size of the drawing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a point lies inside the surface, edges included.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

/// Color palette for the snowfall band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Dark,
    Light,
    Frost,
    Midnight,
}

impl Palette {
    /// Cycle to the next palette.
    pub fn next(&self) -> Self {
        match self {
            Palette::Dark => Palette::Light,
            Palette::Light => Palette::Frost,
            Palette::Frost => Palette::Midnight,
            Palette::Midnight => Palette::Dark,
        }
    }

    /// Background color the band fades into.
    pub fn container_color(self) -> Color {
        match self {
            Palette::Dark => Color::Rgb(28, 27, 31),
            Palette::Light => Color::Rgb(255, 251, 254),
            Palette::Frost => Color::Rgb(16, 42, 67),
            Palette::Midnight => Color::Rgb(5, 5, 20),
        }
    }

    /// Foreground color of the snowflakes.
    pub fn snowflake_color(self) -> Color {
        match self {
            Palette::Dark => Color::Rgb(230, 225, 229),
            Palette::Light => Color::Rgb(28, 27, 31),
            Palette::Frost => Color::Rgb(173, 216, 230),
            Palette::Midnight => Color::Rgb(150, 150, 200),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Dark => "dark",
            Palette::Light => "light",
            Palette::Frost => "frost",
            Palette::Midnight => "midnight",
        }
    }
}

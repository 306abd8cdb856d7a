//! Tilt-responsive snowfall for the snowtilt app.
//!
//! [`Snowfall`] is the pure simulation: a fixed-count particle set advanced
//! one tick at a time from the latest tilt. [`SnowfallLoop`] drives it at a
//! fixed cadence on its own thread and publishes snapshots for the renderer,
//! and [`render_snowfall`] draws a snapshot into a terminal band with the
//! edge fade applied.

mod chars;
mod color;
mod render;
mod snow;
mod state;

pub use chars::{DEFAULT_GLYPH, SNOW_CHARS, next_glyph};
pub use color::{blend, fade_alpha};
pub use render::{SnowfallStyle, render_snowfall};
pub use snow::{RandomSource, Snowfall, advance, initialize, tick};
pub use state::{DEFAULT_COUNT, SnowfallLoop, TICK_INTERVAL};

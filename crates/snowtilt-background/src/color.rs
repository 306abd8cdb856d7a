//! Color helpers for the snowfall fade.

use ratatui::style::Color;

/// Opacity of the container color at the top and bottom edges.
pub const EDGE_FADE: f32 = 0.7;

/// Blend `overlay` over `base` with the given opacity.
///
/// Only RGB colors can be mixed; any other pair yields `base` unchanged.
pub fn blend(base: Color, overlay: Color, alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    match (base, overlay) {
        (Color::Rgb(br, bg, bb), Color::Rgb(or, og, ob)) => Color::Rgb(
            mix(br, or, alpha),
            mix(bg, og, alpha),
            mix(bb, ob, alpha),
        ),
        _ => base,
    }
}

fn mix(base: u8, overlay: u8, alpha: f32) -> u8 {
    (base as f32 * (1.0 - alpha) + overlay as f32 * alpha).round() as u8
}

/// Opacity of the container overlay at relative height `t` (0 = top, 1 = bottom).
///
/// Four evenly spaced stops: [`EDGE_FADE`], clear, clear, [`EDGE_FADE`].
pub fn fade_alpha(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 1.0 / 3.0 {
        EDGE_FADE * (1.0 - t * 3.0)
    } else if t <= 2.0 / 3.0 {
        0.0
    } else {
        EDGE_FADE * (t * 3.0 - 2.0)
    }
}

//! Snowflake glyphs.

/// Glyph drawn for every snowflake unless configured otherwise.
pub const DEFAULT_GLYPH: char = '❄';

/// Glyphs offered as alternatives on terminals without the default.
pub const SNOW_CHARS: &[char] = &['❄', '❅', '❆', '*', '•', '·'];

/// Glyph following `current` in [`SNOW_CHARS`], wrapping around.
pub fn next_glyph(current: char) -> char {
    let idx = SNOW_CHARS
        .iter()
        .position(|&c| c == current)
        .map_or(0, |i| i + 1);
    SNOW_CHARS[idx % SNOW_CHARS.len()]
}

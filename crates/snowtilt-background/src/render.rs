//! Terminal rendering of the snowfall band.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use snowtilt_core::{Palette, Particle, SurfaceSize};

use crate::chars::DEFAULT_GLYPH;
use crate::color::{blend, fade_alpha};

/// How the snowfall band is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SnowfallStyle {
    /// Color the band fades into near its edges.
    pub container_color: Color,
    /// Color of the snowflakes.
    pub snowflake_color: Color,
    /// Glyph drawn for every snowflake.
    pub glyph: char,
    /// Logical surface units covered by one terminal column.
    pub cell_width: f32,
    /// Logical surface units covered by one terminal row.
    pub cell_height: f32,
}

impl Default for SnowfallStyle {
    fn default() -> Self {
        Self::from_palette(Palette::default())
    }
}

impl SnowfallStyle {
    pub fn from_palette(palette: Palette) -> Self {
        Self {
            container_color: palette.container_color(),
            snowflake_color: palette.snowflake_color(),
            glyph: DEFAULT_GLYPH,
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }

    /// Logical surface covered by `area`.
    pub fn surface_for(&self, area: Rect) -> SurfaceSize {
        SurfaceSize::new(
            area.width as f32 * self.cell_width,
            area.height as f32 * self.cell_height,
        )
    }

    /// Cell (column, row) inside a `width` x `height` grid holding `p`.
    fn cell_of(&self, p: &Particle, width: u16, height: u16) -> (u16, u16) {
        // Float-to-int casts saturate, so negatives land on 0
        let col = ((p.x / self.cell_width) as u16).min(width - 1);
        let row = ((p.y / self.cell_height) as u16).min(height - 1);
        (col, row)
    }
}

/// Draw `particles` into `area` with the edge fade applied.
pub fn render_snowfall(frame: &mut Frame, area: Rect, particles: &[Particle], style: &SnowfallStyle) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let lines = build_lines(area.width, area.height, particles, style);
    frame.render_widget(Paragraph::new(lines), area);
}

fn build_lines(
    width: u16,
    height: u16,
    particles: &[Particle],
    style: &SnowfallStyle,
) -> Vec<Line<'static>> {
    let mut occupied = vec![false; width as usize * height as usize];
    for p in particles {
        let (col, row) = style.cell_of(p, width, height);
        occupied[row as usize * width as usize + col as usize] = true;
    }

    let background = Style::new().bg(style.container_color);

    (0..height)
        .map(|row| {
            let t = (row as f32 + 0.5) / height as f32;
            let flake_color = blend(style.snowflake_color, style.container_color, fade_alpha(t));
            let flake_style = background.fg(flake_color);

            let spans: Vec<Span> = (0..width)
                .map(|col| {
                    if occupied[row as usize * width as usize + col as usize] {
                        Span::styled(style.glyph.to_string(), flake_style)
                    } else {
                        Span::styled(" ", background)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn flake(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            size: 10.0,
            speed: 1.0,
        }
    }

    fn draw(width: u16, height: u16, particles: &[Particle], style: &SnowfallStyle) -> ratatui::buffer::Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| render_snowfall(frame, frame.area(), particles, style))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_surface_for_area() {
        let style = SnowfallStyle::default();
        let surface = style.surface_for(Rect::new(0, 0, 40, 8));
        assert_eq!(surface, SurfaceSize::new(320.0, 128.0));
    }

    #[test]
    fn test_particles_land_in_cells() {
        let style = SnowfallStyle::default();
        let buffer = draw(10, 6, &[flake(17.0, 40.0)], &style);
        // 17 / 8 -> column 2, 40 / 16 -> row 2
        assert_eq!(buffer[(2, 2)].symbol(), DEFAULT_GLYPH.to_string());
        assert_eq!(buffer[(3, 2)].symbol(), " ");
    }

    #[test]
    fn test_far_edge_particle_is_clamped_into_band() {
        let style = SnowfallStyle::default();
        let surface = style.surface_for(Rect::new(0, 0, 10, 6));
        let buffer = draw(10, 6, &[flake(surface.width, surface.height)], &style);
        assert_eq!(buffer[(9, 5)].symbol(), DEFAULT_GLYPH.to_string());
    }

    #[test]
    fn test_edges_fade_toward_container() {
        let style = SnowfallStyle::default();
        let buffer = draw(4, 6, &[flake(0.0, 0.0), flake(0.0, 40.0)], &style);
        let top = buffer[(0, 0)].fg;
        let middle = buffer[(0, 2)].fg;
        assert_eq!(middle, style.snowflake_color);
        assert_ne!(top, style.snowflake_color);
        assert_eq!(buffer[(1, 1)].bg, style.container_color);
    }

    #[test]
    fn test_custom_glyph() {
        let style = SnowfallStyle {
            glyph: '*',
            ..Default::default()
        };
        let buffer = draw(4, 4, &[flake(0.0, 20.0)], &style);
        assert_eq!(buffer[(0, 1)].symbol(), "*");
    }

    #[test]
    fn test_empty_area_is_ignored() {
        let style = SnowfallStyle::default();
        let mut terminal = Terminal::new(TestBackend::new(4, 4)).unwrap();
        terminal
            .draw(|frame| render_snowfall(frame, Rect::new(0, 0, 0, 0), &[flake(0.0, 0.0)], &style))
            .unwrap();
        assert_eq!(terminal.backend().buffer()[(0, 0)].symbol(), " ");
    }
}

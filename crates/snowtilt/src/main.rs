mod logging;

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::Paragraph,
};
use snowtilt_background::{SnowfallLoop, SnowfallStyle, next_glyph, render_snowfall};
use snowtilt_config::Config;
use snowtilt_core::{Palette, Tilt};
use snowtilt_sensor::{
    ManualSensorHandle, SubscriptionHandle, TiltCell, TiltSource, default_rotation_sensor,
};

/// Degrees the keyboard sensor tips per key press.
const NUDGE_DEG: f32 = 5.0;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let log_path = logging::init();
    let config = Config::load()?;
    log::info!("snowtilt starting with {config:?}");
    if let Some(path) = log_path {
        log::debug!("logging to {}", path.display());
    }

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Current palette.
    palette: Palette,
    /// How the band is drawn.
    style: SnowfallStyle,
    /// Latest tilt reading, written by the sensor subscription.
    tilt: TiltCell,
    /// Simulation loop.
    snow: SnowfallLoop,
    /// Sensor subscription, held while the screen is up.
    subscription: Option<SubscriptionHandle>,
    /// Controls of the keyboard sensor, if that is the active one.
    controls: Option<ManualSensorHandle>,
    /// One-line message shown in the status bar.
    notice: Option<String>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        let palette = config.display.palette;
        let style = SnowfallStyle {
            container_color: config.display.container_color(),
            snowflake_color: config.display.snowflake_color(),
            glyph: config.display.glyph,
            cell_width: config.display.cell_width,
            cell_height: config.display.cell_height,
        };
        let snow = SnowfallLoop::new(config.count, config.tick_interval(), config.seed);

        Self {
            running: false,
            config,
            palette,
            style,
            tilt: TiltCell::new(),
            snow,
            subscription: None,
            controls: None,
            notice: None,
        }
    }

    /// Run the application's main loop.
    ///
    /// The sensor subscription and the simulation loop live as long as `self`;
    /// both are released on drop, whichever way this returns.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.acquire();
        self.running = true;
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        self.release();
        Ok(())
    }

    /// Subscribe to the tilt sensor and start the simulation.
    fn acquire(&mut self) {
        let selection = default_rotation_sensor(self.config.sensor.kind);
        self.controls = selection.controls;
        let source = TiltSource::new(selection.sensor, self.config.sensor_delay());
        self.subscription = Some(source.start_into(self.tilt.clone()));
        self.snow.start(self.tilt.clone());
    }

    /// Stop the simulation and release the sensor.
    fn release(&mut self) {
        self.snow.stop();
        if let Some(subscription) = self.subscription.take() {
            subscription.stop();
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(self.config.display.band_height), // Snowfall band
            Constraint::Length(1),                               // Status
            Constraint::Fill(1),                                 // Body
            Constraint::Length(1),                               // Help text
        ])
        .split(frame.area());

        self.render_band(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.render_help(frame, chunks[3]);
    }

    /// Snowfall with the title bar drawn over it.
    fn render_band(&mut self, frame: &mut Frame, area: Rect) {
        self.snow.on_surface_resize(self.style.surface_for(area));
        let particles = self.snow.snapshot();
        render_snowfall(frame, area, &particles, &self.style);

        if area.height == 0 {
            return;
        }
        let title_row = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        let title = Paragraph::new(self.config.display.title.as_str())
            .style(
                Style::new()
                    .fg(self.style.snowflake_color)
                    .bg(self.style.container_color)
                    .bold(),
            )
            .alignment(Alignment::Center);
        frame.render_widget(title, title_row);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let tilt = self.tilt.load();
        let sensor = self
            .subscription
            .as_ref()
            .and_then(|s| s.sensor_name())
            .unwrap_or("none");

        let mut text = format!(
            "{}  sensor: {}  palette: {}",
            format_tilt(tilt),
            sensor,
            self.palette.name()
        );
        if self.snow.is_paused() {
            text.push_str("  [paused]");
        }
        if let Some(notice) = &self.notice {
            text.push_str("  ");
            text.push_str(notice);
        }

        frame.render_widget(Paragraph::new(text).dark_gray().alignment(Alignment::Center), area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let color = self.style.snowflake_color;
        let mut spans = vec!["q".bold().fg(color), " quit  ".dark_gray()];
        if self.controls.is_some() {
            spans.extend([
                "←↑↓→".bold().fg(color),
                " tilt  ".dark_gray(),
                "0".bold().fg(color),
                " level  ".dark_gray(),
            ]);
        }
        spans.extend([
            "c".bold().fg(color),
            " palette  ".dark_gray(),
            "g".bold().fg(color),
            " glyph  ".dark_gray(),
            "p".bold().fg(color),
            " pause  ".dark_gray(),
            "w".bold().fg(color),
            " save".dark_gray(),
        ]);
        frame.render_widget(Line::from(spans).centered(), area);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the tick interval as timeout so the band keeps moving.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        let timeout = self.config.tick_interval().min(Duration::from_millis(100));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Left) => self.nudge(0.0, -NUDGE_DEG),
            (_, KeyCode::Right) => self.nudge(0.0, NUDGE_DEG),
            (_, KeyCode::Up) => self.nudge(NUDGE_DEG, 0.0),
            (_, KeyCode::Down) => self.nudge(-NUDGE_DEG, 0.0),
            (_, KeyCode::Char('0')) => self.level(),
            (_, KeyCode::Char('c')) => self.cycle_palette(),
            (_, KeyCode::Char('g')) => self.cycle_glyph(),
            (_, KeyCode::Char('p')) => self.toggle_pause(),
            (_, KeyCode::Char('w')) => self.save_config(),
            _ => {}
        }
    }

    /// Tip the keyboard sensor, if it is the active one.
    fn nudge(&mut self, pitch_deg: f32, roll_deg: f32) {
        if let Some(controls) = &self.controls {
            controls.nudge(pitch_deg, roll_deg);
        }
    }

    fn level(&mut self) {
        if let Some(controls) = &self.controls {
            controls.level();
        }
    }

    /// Cycle through palettes; explicit color overrides give way to the palette.
    fn cycle_palette(&mut self) {
        self.palette = self.palette.next();
        self.config.display.palette = self.palette;
        self.config.display.container_color = None;
        self.config.display.snowflake_color = None;
        self.style.container_color = self.palette.container_color();
        self.style.snowflake_color = self.palette.snowflake_color();
    }

    fn cycle_glyph(&mut self) {
        self.style.glyph = next_glyph(self.style.glyph);
        self.config.display.glyph = self.style.glyph;
    }

    fn toggle_pause(&mut self) {
        self.snow.set_paused(!self.snow.is_paused());
    }

    fn save_config(&mut self) {
        self.notice = Some(match self.config.save() {
            Ok(path) => format!("saved {}", path.display()),
            Err(e) => {
                log::error!("saving config failed: {e:?}");
                "save failed".to_string()
            }
        });
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// Signed tilt readout for the status bar.
fn format_tilt(tilt: Tilt) -> String {
    format!("tilt x {:+.2} y {:+.2}", tilt.x, tilt.y)
}

//! Configuration for the snowtilt app.
//!
//! Read from `config.toml` in the platform config directory (or the file
//! named by `SNOWTILT_CONFIG`). Every field is optional; a missing file means
//! defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use snowtilt_core::Palette;
use snowtilt_sensor::SensorKind;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SNOWTILT_CONFIG";

/// Upper bound on the number of snowflakes.
pub const MAX_COUNT: usize = 10_000;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of snowflakes.
    pub count: usize,
    /// Milliseconds between simulation ticks.
    pub tick_ms: u64,
    /// Fixed random seed; taken from the clock when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub sensor: SensorConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: 10,
            tick_ms: 30,
            seed: None,
            sensor: SensorConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Tilt sensor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub kind: SensorKind,
    /// Milliseconds between sensor polls.
    pub delay_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            kind: SensorKind::default(),
            delay_ms: 60,
        }
    }
}

/// Snowfall band appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows taken by the snowfall band.
    pub band_height: u16,
    /// Logical units per terminal column.
    pub cell_width: f32,
    /// Logical units per terminal row.
    pub cell_height: f32,
    pub glyph: char,
    pub palette: Palette,
    /// Overrides the palette's container color (`#rrggbb` or a color name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_color: Option<String>,
    /// Overrides the palette's snowflake color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snowflake_color: Option<String>,
    /// Text shown in the title bar over the band.
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            band_height: 8,
            cell_width: 8.0,
            cell_height: 16.0,
            glyph: '❄',
            palette: Palette::default(),
            container_color: None,
            snowflake_color: None,
            title: "@".to_string(),
        }
    }
}

impl DisplayConfig {
    /// Container color: the override if it parses, else the palette's.
    pub fn container_color(&self) -> Color {
        resolve_color(self.container_color.as_deref(), self.palette.container_color())
    }

    /// Snowflake color: the override if it parses, else the palette's.
    pub fn snowflake_color(&self) -> Color {
        resolve_color(self.snowflake_color.as_deref(), self.palette.snowflake_color())
    }
}

fn resolve_color(value: Option<&str>, fallback: Color) -> Color {
    match value {
        Some(s) => parse_color(s).unwrap_or_else(|| {
            log::warn!("unrecognized color {s:?}, using palette color");
            fallback
        }),
        None => fallback,
    }
}

/// Parse `#rrggbb`, an indexed color, or a color name.
pub fn parse_color(s: &str) -> Option<Color> {
    Color::from_str(s.trim()).ok()
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "snowtilt").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when there
    /// is no file.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config.validated())
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("no config directory on this platform"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).wrap_err("failed to serialize config")?;
        fs::write(path, text).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        log::info!("config saved to {}", path.display());
        Ok(())
    }

    /// Bring out-of-range values back to something usable.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.count > MAX_COUNT {
            log::warn!("count {} capped at {MAX_COUNT}", self.count);
            self.count = MAX_COUNT;
        }
        self.tick_ms = self.tick_ms.max(1);
        self.sensor.delay_ms = self.sensor.delay_ms.max(1);
        if !(self.display.cell_width > 0.0) {
            self.display.cell_width = defaults.display.cell_width;
        }
        if !(self.display.cell_height > 0.0) {
            self.display.cell_height = defaults.display.cell_height;
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn sensor_delay(&self) -> Duration {
        Duration::from_millis(self.sensor.delay_ms)
    }
}

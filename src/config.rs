//! Application configuration.
//!
//! Every field has a default, so an empty or partial YAML file is valid and
//! running without any config file at all gives the stock demo scene.
//!
//! ```yaml
//! window:
//!   title: Horizon Engine - No Limits
//!   width: 1280
//!   height: 720
//! timing:
//!   render_rate_hz: null   # uncapped
//! render:
//!   use_perspective: true
//!   fov_degrees: 60.0
//! scene:
//!   columns: 10
//!   rows: 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::RenderSettings;
use crate::error::ConfigError;
use crate::fps::DEFAULT_REPORT_INTERVAL;
use crate::logging::LoggingConfig;
use crate::registry::GridConfig;
use crate::scheduler::{MAX_RATE_HZ, MIN_RATE_HZ};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "horizon.yaml";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_ENV_VAR: &str = "HORIZON_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Horizon Engine - No Limits".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Update and render rates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub update_rate_hz: f64,
    /// `None` renders as fast as the event loop spins.
    pub render_rate_hz: Option<f64>,
    /// Seconds between average-FPS log lines.
    pub fps_report_interval: f64,
}

impl TimingConfig {
    /// Rejects rates outside `MIN_RATE_HZ..=MAX_RATE_HZ` and report intervals
    /// that are not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("timing.update_rate_hz", self.update_rate_hz)?;
        if let Some(hz) = self.render_rate_hz {
            check_rate("timing.render_rate_hz", hz)?;
        }
        if !(self.fps_report_interval.is_finite() && self.fps_report_interval > 0.0) {
            return Err(ConfigError::Invalid {
                field: "timing.fps_report_interval",
                reason: format!(
                    "{} is not a positive number of seconds",
                    self.fps_report_interval
                ),
            });
        }
        Ok(())
    }
}

fn check_rate(field: &'static str, hz: f64) -> Result<(), ConfigError> {
    if (MIN_RATE_HZ..=MAX_RATE_HZ).contains(&hz) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{hz} Hz is outside {MIN_RATE_HZ}..={MAX_RATE_HZ} Hz"),
        })
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 100.0,
            render_rate_hz: Some(100.0),
            fps_report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

/// Paths to the WGSL sources of the scene program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/base_vertex.wgsl"),
            fragment: PathBuf::from("shaders/base_fragment.wgsl"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub render: RenderSettings,
    pub scene: GridConfig,
    pub shaders: ShaderPaths,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Parses a YAML document. Values are not validated; see
    /// [`validate`](Self::validate).
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not an empty map
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source)
    }

    /// Checks values serde cannot: timing rates and intervals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()
    }

    /// Reads, parses and validates the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    ///
    /// A file that exists but cannot be read, parsed or validated is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Path named by `HORIZON_CONFIG`, or `horizon.yaml`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

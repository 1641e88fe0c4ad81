//! Configuration for the demo widget.
//!
//! Every field has a default, so a page can embed a partial
//! `<script id="demo-config" type="application/json">` block (or nothing at
//! all). The native player reads the same format from the user's config
//! directory.

use std::time::Duration;

use qw_dom::{Document, Element, ViewportOptions};
use serde::{Deserialize, Serialize};

use crate::constants::dom;

/// Log level setting for the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Lowercase form accepted by `env_logger` filters.
    pub fn filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Speed of the SQL reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Fastest per-character delay, in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: f64,

    /// Slowest per-character delay, in milliseconds
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: f64,

    /// SQL length is divided by this to get the raw delay
    #[serde(default = "default_length_divisor")]
    pub length_divisor: f64,
}

fn default_min_interval_ms() -> f64 {
    15.0
}

fn default_max_interval_ms() -> f64 {
    40.0
}

fn default_length_divisor() -> f64 {
    20.0
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            length_divisor: default_length_divisor(),
        }
    }
}

/// Delays around the animations, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,

    #[serde(default = "default_reduced_motion_success_delay_ms")]
    pub reduced_motion_success_delay_ms: u64,

    /// How long the question keeps its `updated` highlight
    #[serde(default = "default_question_pulse_ms")]
    pub question_pulse_ms: u64,

    #[serde(default = "default_focus_delay_ms")]
    pub focus_delay_ms: u64,

    /// Measured from the focus, not from the question update
    #[serde(default = "default_blur_delay_ms")]
    pub blur_delay_ms: u64,

    /// Wait after a tab switch before scrolling the demo card into view
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,
}

fn default_success_delay_ms() -> u64 {
    200
}

fn default_reduced_motion_success_delay_ms() -> u64 {
    100
}

fn default_question_pulse_ms() -> u64 {
    300
}

fn default_focus_delay_ms() -> u64 {
    100
}

fn default_blur_delay_ms() -> u64 {
    100
}

fn default_scroll_delay_ms() -> u64 {
    100
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            success_delay_ms: default_success_delay_ms(),
            reduced_motion_success_delay_ms: default_reduced_motion_success_delay_ms(),
            question_pulse_ms: default_question_pulse_ms(),
            focus_delay_ms: default_focus_delay_ms(),
            blur_delay_ms: default_blur_delay_ms(),
            scroll_delay_ms: default_scroll_delay_ms(),
        }
    }
}

impl TimingConfig {
    /// Delay before the success indicator appears.
    pub fn success_delay(&self, reduced_motion: bool) -> Duration {
        if reduced_motion {
            Duration::from_millis(self.reduced_motion_success_delay_ms)
        } else {
            Duration::from_millis(self.success_delay_ms)
        }
    }

    pub fn question_pulse(&self) -> Duration {
        Duration::from_millis(self.question_pulse_ms)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    pub fn blur_delay(&self) -> Duration {
        Duration::from_millis(self.blur_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

/// Scroll-reveal of the cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "default_root_margin")]
    pub root_margin: String,

    /// Extra delay per card, by the card's position among the animated ones
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
}

fn default_threshold() -> f64 {
    ViewportOptions::default().threshold
}

fn default_root_margin() -> String {
    ViewportOptions::default().root_margin
}

fn default_stagger_ms() -> u64 {
    150
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin: default_root_margin(),
            stagger_ms: default_stagger_ms(),
        }
    }
}

impl ViewportConfig {
    pub fn options(&self) -> ViewportOptions {
        ViewportOptions {
            threshold: self.threshold,
            root_margin: self.root_margin.clone(),
        }
    }

    /// Delay for the card at `position`.
    pub fn stagger(&self, position: usize) -> Duration {
        Duration::from_millis(self.stagger_ms.saturating_mul(position as u64))
    }
}

/// Demo configuration that can be embedded in the page or read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Version of the configuration format
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub typing: TypingConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Project link offered when the demo cannot start
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_fallback_url() -> String {
    "https://github.com/FalkorDB/falkordb".to_string()
}

impl DemoConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            typing: TypingConfig::default(),
            timing: TimingConfig::default(),
            viewport: ViewportConfig::default(),
            fallback_url: default_fallback_url(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let typing = &self.typing;
        if typing.length_divisor.is_nan() || typing.length_divisor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "typing.length_divisor must be positive, got {}",
                typing.length_divisor
            )));
        }
        let min = typing.min_interval_ms;
        if min.is_nan() || min < 0.0 || min > typing.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "typing interval bounds out of order: min {} max {}",
                typing.min_interval_ms, typing.max_interval_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.viewport.threshold) {
            return Err(ConfigError::Invalid(format!(
                "viewport.threshold must be within [0, 1], got {}",
                self.viewport.threshold
            )));
        }
        Ok(())
    }

    /// Read the configuration embedded in the page, falling back to the
    /// defaults when it is missing or unusable.
    pub fn from_page<D: Document>(doc: &D) -> Self {
        let Some(element) = doc.element_by_id(dom::CONFIG_ID) else {
            log::debug!("No #{} block on the page, using defaults", dom::CONFIG_ID);
            return Self::new();
        };

        match Self::from_json(&element.text_content()) {
            Ok(config) => {
                log::info!("Loaded configuration from #{}", dom::CONFIG_ID);
                config
            }
            Err(e) => {
                log::warn!("Ignoring #{}: {}", dom::CONFIG_ID, e);
                Self::new()
            }
        }
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "demo-config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(
                config_dir
                    .join("queryweaver-demo")
                    .join(Self::default_filename()),
            )
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("queryweaver-demo")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from the default path.
    ///
    /// Returns `Ok(None)` when there is no file. Runs before the logger is
    /// up, so reporting is left to the caller.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_default_path() -> Result<Option<Self>, ConfigError> {
        let Some(path) = Self::default_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::read_path(&path).map(Some)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

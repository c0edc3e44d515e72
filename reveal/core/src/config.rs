//! Configuration
//!
//! Loads the overlay configuration from defaults, an optional TOML file at
//! `~/.config/reveal-message/config.toml`, environment variables and CLI
//! overrides, then validates everything into an immutable [`OverlayConfig`].
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied with [`ConfigOverrides`])
//! 2. Environment variables (`REVEAL_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [reveal]
//! mode = "word"
//! speed = 6.0
//! exit_after = 2.5
//! reveal_position = "center"
//!
//! [style]
//! font_size = 96
//! color = "#ffcc00"
//! background = "rgba(0, 0, 0, 0.4)"
//!
//! [display]
//! all_monitors = false
//! namespace = "reveal-message"
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{ColorError, CssColor, Rgba};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

impl ConfigError {
    fn invalid(what: impl fmt::Display) -> Self {
        Self::ValidationError(what.to_string())
    }

    fn color(field: &str, err: &ColorError) -> Self {
        Self::ValidationError(format!("{field}: {err}"))
    }
}

// =============================================================================
// Value Enums
// =============================================================================

/// How the message is split into reveal units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealMode {
    /// One grapheme per unit
    #[default]
    Char,
    /// One word plus its trailing whitespace per unit
    Word,
}

impl FromStr for RevealMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "char" => Ok(Self::Char),
            "word" => Ok(Self::Word),
            other => Err(ConfigError::invalid(format_args!(
                "unknown mode '{other}' (expected char or word)"
            ))),
        }
    }
}

impl fmt::Display for RevealMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char => write!(f, "char"),
            Self::Word => write!(f, "word"),
        }
    }
}

/// Where text sits while it is being revealed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentPolicy {
    /// Left-anchored while revealing, centered once complete
    #[default]
    LeftToCenter,
    /// Always centered
    Center,
    /// Always left-anchored
    Left,
}

impl FromStr for AlignmentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left-to-center" => Ok(Self::LeftToCenter),
            "center" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            other => Err(ConfigError::invalid(format_args!(
                "unknown reveal position '{other}' (expected left-to-center, center or left)"
            ))),
        }
    }
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftToCenter => write!(f, "left-to-center"),
            Self::Center => write!(f, "center"),
            Self::Left => write!(f, "left"),
        }
    }
}

/// Which monitors get a surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MonitorSelection {
    /// One surface per attached monitor
    #[default]
    All,
    /// A single surface on the focused monitor
    Focused,
}

impl MonitorSelection {
    /// Map the `all_monitors` flag onto a selection
    #[must_use]
    pub fn from_all_monitors(all: bool) -> Self {
        if all {
            Self::All
        } else {
            Self::Focused
        }
    }
}

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Validated Configuration
// =============================================================================

/// Default reveal rate in units per second
pub const DEFAULT_SPEED: f64 = 15.0;
/// Default font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 72;
/// Default text colour
pub const DEFAULT_COLOR: &str = "#ffffff";
/// Default surface background
pub const DEFAULT_BACKGROUND: &str = "rgba(0, 0, 0, 0.0)";
/// Default hold time after the reveal completes, in seconds
pub const DEFAULT_EXIT_AFTER_SECS: f64 = 1.0;
/// Default surface namespace
pub const DEFAULT_NAMESPACE: &str = "reveal-message";

/// Immutable configuration snapshot, read once at startup
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Tokenization mode
    pub mode: RevealMode,
    /// Units per second; `<= 0` reveals everything in one tick
    pub speed: f64,
    /// Font size in pixels
    pub font_size: u32,
    /// Text colour
    pub color: CssColor,
    /// Surface background
    pub background: CssColor,
    /// Auto-close delay after completion; `None` waits for an external close
    pub exit_after: Option<Duration>,
    /// Alignment policy while revealing
    pub alignment: AlignmentPolicy,
    /// Monitor targets
    pub monitors: MonitorSelection,
    /// Namespace given to every surface
    pub namespace: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mode: RevealMode::Char,
            speed: DEFAULT_SPEED,
            font_size: DEFAULT_FONT_SIZE,
            color: CssColor::known(DEFAULT_COLOR, Rgba::rgb(255, 255, 255)),
            background: CssColor::known(
                DEFAULT_BACKGROUND,
                Rgba {
                    r: 0,
                    g: 0,
                    b: 0,
                    a: 0,
                },
            ),
            exit_after: Some(Duration::from_secs(1)),
            alignment: AlignmentPolicy::LeftToCenter,
            monitors: MonitorSelection::All,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[reveal]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// `char` or `word`
    pub mode: Option<RevealMode>,
    /// Units per second
    pub speed: Option<f64>,
    /// Seconds to hold after completion (0 disables auto-close)
    pub exit_after: Option<f64>,
    /// `left-to-center`, `center` or `left`
    pub reveal_position: Option<AlignmentPolicy>,
}

/// `[style]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleToml {
    /// Font size in pixels
    pub font_size: Option<u32>,
    /// CSS text colour
    pub color: Option<String>,
    /// CSS background colour
    pub background: Option<String>,
}

/// `[display]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// One surface per monitor
    pub all_monitors: Option<bool>,
    /// Surface namespace
    pub namespace: Option<String>,
}

/// Root TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfigToml {
    /// Reveal timing settings
    pub reveal: RevealToml,
    /// Text styling
    pub style: StyleToml,
    /// Monitor selection
    pub display: DisplayToml,
}

/// Raw, merged configuration before validation
///
/// Values here are still unchecked; [`ConfigFile::validate`] turns them
/// into an [`OverlayConfig`].
#[derive(Clone, Debug)]
pub struct ConfigFile {
    /// Tokenization mode
    pub mode: RevealMode,
    /// Units per second
    pub speed: f64,
    /// Font size in pixels
    pub font_size: u32,
    /// CSS text colour
    pub color: String,
    /// CSS background colour
    pub background: String,
    /// Seconds to hold after completion
    pub exit_after: f64,
    /// Alignment policy
    pub reveal_position: AlignmentPolicy,
    /// One surface per monitor
    pub all_monitors: bool,
    /// Surface namespace
    pub namespace: String,
    /// Path of the file that was loaded, if any
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            mode: RevealMode::Char,
            speed: DEFAULT_SPEED,
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_COLOR.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            exit_after: DEFAULT_EXIT_AFTER_SECS,
            reveal_position: AlignmentPolicy::LeftToCenter,
            all_monitors: true,
            namespace: DEFAULT_NAMESPACE.to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ConfigFile {
    /// Highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check every value and freeze the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<OverlayConfig, ConfigError> {
        if !self.speed.is_finite() {
            return Err(ConfigError::invalid(format_args!(
                "speed must be a finite number, got {}",
                self.speed
            )));
        }
        if self.font_size == 0 {
            return Err(ConfigError::invalid("font size must be at least 1"));
        }
        if !self.exit_after.is_finite() {
            return Err(ConfigError::invalid(format_args!(
                "exit-after must be a finite number of seconds, got {}",
                self.exit_after
            )));
        }

        let exit_after = if self.exit_after > 0.0 {
            Some(Duration::try_from_secs_f64(self.exit_after).map_err(|e| {
                ConfigError::invalid(format_args!("exit-after {}: {e}", self.exit_after))
            })?)
        } else {
            None
        };

        let color = CssColor::parse(&self.color).map_err(|e| ConfigError::color("color", &e))?;
        let background =
            CssColor::parse(&self.background).map_err(|e| ConfigError::color("background", &e))?;

        let namespace = self.namespace.trim();
        if namespace.is_empty() {
            return Err(ConfigError::invalid("namespace must not be empty"));
        }

        Ok(OverlayConfig {
            mode: self.mode,
            speed: self.speed,
            font_size: self.font_size,
            color,
            background,
            exit_after,
            alignment: self.reveal_position,
            monitors: MonitorSelection::from_all_monitors(self.all_monitors),
            namespace: namespace.to_string(),
        })
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/reveal-message/config.toml` when a config
/// directory is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("reveal-message").join("config.toml"))
}

/// Load configuration from the default file and the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// an environment variable holds an unusable value.
pub fn load_config() -> Result<ConfigFile, ConfigError> {
    load_config_from_path(default_config_path(), false)
}

/// Load configuration from a specific path and the environment
///
/// When `required` is true a missing file is an error; otherwise it is
/// skipped and defaults are used.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if an
/// environment variable holds an unusable value.
pub fn load_config_from_path(
    path: Option<PathBuf>,
    required: bool,
) -> Result<ConfigFile, ConfigError> {
    load_layers(path, required, |name| std::env::var(name).ok())
}

/// File layer then environment layer, with the environment injected
fn load_layers<F>(
    path: Option<PathBuf>,
    required: bool,
    env: F,
) -> Result<ConfigFile, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ConfigFile::default();

    if let Some(ref config_path) = path {
        if config_path.exists() || required {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: RevealConfigToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConfigFile, toml: &RevealConfigToml) {
    if let Some(mode) = toml.reveal.mode {
        config.mode = mode;
    }
    if let Some(speed) = toml.reveal.speed {
        config.speed = speed;
    }
    if let Some(exit_after) = toml.reveal.exit_after {
        config.exit_after = exit_after;
    }
    if let Some(position) = toml.reveal.reveal_position {
        config.reveal_position = position;
    }

    if let Some(size) = toml.style.font_size {
        config.font_size = size;
    }
    if let Some(ref color) = toml.style.color {
        config.color.clone_from(color);
    }
    if let Some(ref background) = toml.style.background {
        config.background.clone_from(background);
    }

    if let Some(all) = toml.display.all_monitors {
        config.all_monitors = all;
    }
    if let Some(ref namespace) = toml.display.namespace {
        config.namespace.clone_from(namespace);
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(format_args!("{name}={raw:?} is not a valid value")))
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(format_args!(
            "{name}={raw:?} is not a boolean"
        ))),
    }
}

/// Apply environment variable overrides to the config
///
/// The lookup is injected so tests do not have to touch the process
/// environment.
fn apply_env_config<F>(config: &mut ConfigFile, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut touched = false;

    if let Some(raw) = lookup("REVEAL_MODE") {
        config.mode = raw.parse()?;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_SPEED") {
        config.speed = parse_env("REVEAL_SPEED", &raw)?;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_FONT_SIZE") {
        config.font_size = parse_env("REVEAL_FONT_SIZE", &raw)?;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_COLOR") {
        config.color = raw;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_BACKGROUND") {
        config.background = raw;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_EXIT_AFTER") {
        config.exit_after = parse_env("REVEAL_EXIT_AFTER", &raw)?;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_POSITION") {
        config.reveal_position = raw.parse()?;
        touched = true;
    }
    if let Some(raw) = lookup("REVEAL_ALL_MONITORS") {
        config.all_monitors = parse_env_bool("REVEAL_ALL_MONITORS", &raw)?;
        touched = true;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Mode override
    pub mode: Option<RevealMode>,
    /// Speed override
    pub speed: Option<f64>,
    /// Font size override
    pub font_size: Option<u32>,
    /// Colour override
    pub color: Option<String>,
    /// Background override
    pub background: Option<String>,
    /// Exit-after override (seconds)
    pub exit_after: Option<f64>,
    /// Reveal position override
    pub reveal_position: Option<AlignmentPolicy>,
    /// Monitor selection override
    pub all_monitors: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set mode override
    #[must_use]
    pub fn with_mode(mut self, mode: RevealMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set speed override
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Set exit-after override
    #[must_use]
    pub fn with_exit_after(mut self, secs: f64) -> Self {
        self.exit_after = Some(secs);
        self
    }

    /// Set reveal position override
    #[must_use]
    pub fn with_reveal_position(mut self, position: AlignmentPolicy) -> Self {
        self.reveal_position = Some(position);
        self
    }

    /// Set monitor selection override
    #[must_use]
    pub fn with_all_monitors(mut self, all: bool) -> Self {
        self.all_monitors = Some(all);
        self
    }

    fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.speed.is_none()
            && self.font_size.is_none()
            && self.color.is_none()
            && self.background.is_none()
            && self.exit_after.is_none()
            && self.reveal_position.is_none()
            && self.all_monitors.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ConfigFile) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(ref color) = self.color {
            config.color.clone_from(color);
        }
        if let Some(ref background) = self.background {
            config.background.clone_from(background);
        }
        if let Some(secs) = self.exit_after {
            config.exit_after = secs;
        }
        if let Some(position) = self.reveal_position {
            config.reveal_position = position;
        }
        if let Some(all) = self.all_monitors {
            config.all_monitors = all;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

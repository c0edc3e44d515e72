//! reveal-message - Typewriter Message Overlay
//!
//! Shows a message full-screen, reveals it a character or word at a time,
//! holds it for a moment, and exits.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: character mode, 15 units/s, close 1s after the reveal
//! reveal-message "Build finished"
//!
//! # Word by word, stay up until dismissed
//! reveal-message --mode word --speed 4 --exit-after 0 "Time for a break"
//!
//! # Verbose logging to a chosen file
//! reveal-message --log-level debug --log-file /tmp/reveal.log "hello"
//! ```
//!
//! # Logs
//!
//! The overlay owns the terminal, so when stderr is a terminal logs go to
//! `$XDG_STATE_HOME/reveal-message/reveal-message.log` instead. Redirected
//! stderr (a pipe or file) receives the logs directly.
//!
//! # Configuration
//!
//! Command-line flags override `REVEAL_*` environment variables, which
//! override `$XDG_CONFIG_HOME/reveal-message/config.toml`.
//!
//! # Exit codes
//!
//! - `0`: the overlay closed normally (timeout, dismissal, signal)
//! - `1`: no surface could be shown, or the overlay failed while running
//! - `2`: invalid arguments or configuration

mod signals;

use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use reveal_core::error::EXIT_CONFIG;
use reveal_core::{
    event_loop, load_config, load_config_from_path, AlignmentPolicy, ConfigError,
    ConfigOverrides, LifecycleController, Outcome, OverlayConfig, RevealError, RevealMode,
};
use reveal_tui::TerminalBackend;

use signals::Signals;

/// reveal-message - Show a message as a full-screen typewriter overlay
#[derive(Parser, Debug)]
#[command(name = "reveal-message")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Message to show
    #[arg(value_name = "MESSAGE")]
    message: String,

    /// Reveal one character or one word at a time
    #[arg(short = 'm', long, value_enum, value_name = "MODE")]
    mode: Option<ModeArg>,

    /// Units revealed per second (0 or less shows everything at once)
    #[arg(short = 's', long, value_name = "RATE", allow_negative_numbers = true)]
    speed: Option<f64>,

    /// Font size in pixels
    #[arg(long, value_name = "PX")]
    font_size: Option<u32>,

    /// Text colour (CSS)
    #[arg(long, value_name = "CSS_COLOR")]
    color: Option<String>,

    /// Background colour (CSS)
    #[arg(long, value_name = "CSS_COLOR")]
    background: Option<String>,

    /// Seconds to keep the message up after the reveal (0 disables)
    #[arg(short = 'e', long, value_name = "SECONDS", allow_negative_numbers = true)]
    exit_after: Option<f64>,

    /// Where the text sits while it is being revealed
    #[arg(long, value_enum, value_name = "POSITION")]
    reveal_position: Option<PositionArg>,

    /// Show the message on every monitor
    #[arg(long, overrides_with = "no_all_monitors")]
    all_monitors: bool,

    /// Show the message on the focused monitor only
    #[arg(long, overrides_with = "all_monitors")]
    no_all_monitors: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "REVEAL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "REVEAL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Write logs to this file [default: state-dir log when stderr is a terminal]
    #[arg(long, env = "REVEAL_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Char,
    Word,
}

impl From<ModeArg> for RevealMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Char => Self::Char,
            ModeArg::Word => Self::Word,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PositionArg {
    LeftToCenter,
    Center,
    Left,
}

impl From<PositionArg> for AlignmentPolicy {
    fn from(position: PositionArg) -> Self {
        match position {
            PositionArg::LeftToCenter => Self::LeftToCenter,
            PositionArg::Center => Self::Center,
            PositionArg::Left => Self::Left,
        }
    }
}

impl Args {
    /// `--all-monitors` / `--no-all-monitors`, whichever came last
    fn all_monitors(&self) -> Option<bool> {
        if self.all_monitors {
            Some(true)
        } else if self.no_all_monitors {
            Some(false)
        } else {
            None
        }
    }

    /// Flags the user actually passed, as configuration overrides
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mode: self.mode.map(Into::into),
            speed: self.speed,
            font_size: self.font_size,
            color: self.color.clone(),
            background: self.background.clone(),
            exit_after: self.exit_after,
            reveal_position: self.reveal_position.map(Into::into),
            all_monitors: self.all_monitors(),
        }
    }
}

/// Merge file, environment and flags into the run configuration
fn resolve_config(args: &Args) -> Result<OverlayConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(Some(path.clone()), true)?,
        None => load_config()?,
    };
    args.overrides().apply(&mut config);

    let overlay = config.validate()?;
    info!(
        source = %config.source(),
        mode = %overlay.mode,
        speed = overlay.speed,
        exit_after = ?overlay.exit_after,
        alignment = %overlay.alignment,
        monitors = ?overlay.monitors,
        "Configuration resolved"
    );
    Ok(overlay)
}

/// Log file used when stderr shares the terminal with the overlay
fn default_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("reveal-message").join("reveal-message.log"))
}

/// Where logs go: an explicit file, the default file when stderr is a
/// terminal, or stderr (`None`)
fn log_destination(
    explicit: Option<&Path>,
    stderr_is_terminal: bool,
    fallback: Option<PathBuf>,
) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if stderr_is_terminal => fallback,
        None => None,
    }
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Initialize logging with the specified level
fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "reveal_message={level},reveal_core={level},reveal_tui={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let destination = log_destination(
        log_file,
        std::io::stderr().is_terminal(),
        default_log_path(),
    );

    let file = match destination {
        Some(path) => match open_log_file(&path) {
            Ok(file) => Some(file),
            Err(e) if log_file.is_some() => return Err(e),
            // Default location unusable: keep logging to stderr
            Err(_) => None,
        },
        None => None,
    };

    match file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

async fn run(args: Args) -> Result<Outcome, RevealError> {
    let config = resolve_config(&args)?;

    let signals = match Signals::install() {
        Ok(signals) => Some(signals),
        Err(e) => {
            warn!(error = %e, "Failed to install signal handlers");
            None
        }
    };

    reveal_tui::install_panic_hook();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut backend = TerminalBackend::new(events_tx);
    let mut controller = LifecycleController::new(config, args.message);

    event_loop::run(
        &mut controller,
        &mut backend,
        events_rx,
        signals::shutdown(signals),
    )
    .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, args.log_file.as_deref()) {
        eprintln!("error: {e:#}");
        return ExitCode::from(EXIT_CONFIG);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "reveal-message starting");

    match run(args).await {
        Ok(outcome) => {
            info!(%outcome, "reveal-message finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "reveal-message failed");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

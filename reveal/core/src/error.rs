//! Run-level errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::surface_set::CreationFailure;
use crate::timer::TimerError;

/// Exit code for configuration errors (usage)
pub const EXIT_CONFIG: u8 = 2;

/// Exit code for every other fatal error
pub const EXIT_FAILURE: u8 = 1;

/// Fatal errors that end a run
#[derive(Debug, Error)]
pub enum RevealError {
    /// Invalid flag, environment variable or config file value
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// No surface could be created on any target
    #[error("could not create a surface on any monitor ({})", describe_failures(.failures))]
    SurfaceCreation {
        /// Every target that was tried
        failures: Vec<CreationFailure>,
    },

    /// A timer needed by the reveal or auto-close could not be scheduled
    #[error("timer scheduling failed: {0}")]
    TimerScheduling(#[from] TimerError),

    /// Every surface was dropped after render failures
    #[error("every surface failed while rendering")]
    AllSurfacesLost,
}

impl RevealError {
    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => EXIT_CONFIG,
            Self::SurfaceCreation { .. } | Self::TimerScheduling(_) | Self::AllSurfacesLost => {
                EXIT_FAILURE
            }
        }
    }
}

fn describe_failures(failures: &[CreationFailure]) -> String {
    if failures.is_empty() {
        return "no targets".to_string();
    }
    failures
        .iter()
        .map(|f| format!("{}: {}", f.target, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MonitorRef, SurfaceError};

    #[test]
    fn test_exit_codes() {
        let config = RevealError::from(ConfigError::ValidationError("speed".into()));
        assert_eq!(config.exit_code(), 2);
        assert_eq!(RevealError::AllSurfacesLost.exit_code(), 1);
        assert_eq!(RevealError::from(TimerError::Closed).exit_code(), 1);
    }

    #[test]
    fn test_surface_creation_message_lists_targets() {
        let err = RevealError::SurfaceCreation {
            failures: vec![CreationFailure {
                target: MonitorRef::Focused,
                error: SurfaceError::Unavailable("not a terminal".into()),
            }],
        };
        let message = err.to_string();
        assert!(message.contains("focused monitor"));
        assert!(message.contains("not a terminal"));
    }
}

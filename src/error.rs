//! Error types shared across the crate

use thiserror::Error;

/// Countdown timer contract violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("countdown duration must be greater than zero")]
    ZeroDuration,
}

/// Why a wallpaper fetch produced no image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("wallpaper request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("wallpaper fetch timed out after {0:?}")]
    TimedOut(std::time::Duration),
    #[error("wallpaper payload is not a recognised image ({0} bytes)")]
    NotAnImage(usize),
    #[error("wallpaper source unavailable: {0}")]
    Unavailable(String),
}

/// Surface creation failures reported by a presenter
#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("display {0} is not available")]
    DisplayUnavailable(usize),
    #[error("presenter backend error: {0}")]
    Backend(String),
}

/// Session lock failures
#[derive(Debug, Error)]
pub enum LockError {
    #[error("no lock command configured")]
    NotConfigured,
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    Failed { command: String, status: String },
}

/// Invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} duration must be a positive number of seconds")]
    NonPositiveDuration(&'static str),
    #[error("invalid display '{0}', expected WIDTHxHEIGHT or WIDTHxHEIGHT@SCALE")]
    InvalidDisplay(String),
}

/// The orchestration loop is no longer receiving events
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("orchestration loop has shut down")]
pub struct LoopClosed;

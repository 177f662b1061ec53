//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{error::ConfigError, services::Display};

pub const DEFAULT_WORK_SECS: u64 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u64 = 7 * 60;
pub const DEFAULT_SNOOZE_SECS: u64 = 60;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "tomatillo")]
#[command(about = "Counts down work intervals and curtains every display for a break")]
#[command(version)]
pub struct Config {
    /// Work interval in seconds
    #[arg(long, env = "TOMATILLO_WORK_SECS", default_value_t = DEFAULT_WORK_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub work_secs: u64,

    /// Break interval in seconds
    #[arg(long, env = "TOMATILLO_BREAK_SECS", default_value_t = DEFAULT_BREAK_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub break_secs: u64,

    /// Snooze delay in seconds
    #[arg(long, env = "TOMATILLO_SNOOZE_SECS", default_value_t = DEFAULT_SNOOZE_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub snooze_secs: u64,

    /// Host address the status API binds to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port the status API binds to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Displays to curtain, as WIDTHxHEIGHT[@SCALE]; the first one is primary
    #[arg(long, env = "TOMATILLO_DISPLAYS", value_delimiter = ',', default_value = "1920x1080")]
    pub displays: Vec<Display>,

    /// Directory holding local fallback wallpapers
    #[arg(long, env = "TOMATILLO_WALLPAPER_DIR", default_value = "/usr/share/backgrounds")]
    pub wallpaper_dir: PathBuf,

    /// Base URL of the remote wallpaper service
    #[arg(long, env = "TOMATILLO_WALLPAPER_URL", default_value = "https://picsum.photos")]
    pub wallpaper_url: String,

    /// Command line used to lock the session
    #[arg(long, env = "TOMATILLO_LOCK_COMMAND", default_value = "loginctl lock-session")]
    pub lock_command: String,

    /// Do not start the work timer on launch
    #[arg(long)]
    pub paused: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn durations(&self) -> Result<Durations, ConfigError> {
        Durations::from_secs(self.work_secs, self.break_secs, self.snooze_secs)
    }

    /// Split the lock command line into program and arguments
    pub fn lock_command_parts(&self) -> Option<(String, Vec<String>)> {
        let mut parts = self.lock_command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

/// The three cycle durations, all guaranteed positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    work: Duration,
    brk: Duration,
    snooze: Duration,
}

impl Durations {
    pub fn new(work: Duration, brk: Duration, snooze: Duration) -> Result<Self, ConfigError> {
        if work.is_zero() {
            return Err(ConfigError::NonPositiveDuration("work"));
        }
        if brk.is_zero() {
            return Err(ConfigError::NonPositiveDuration("break"));
        }
        if snooze.is_zero() {
            return Err(ConfigError::NonPositiveDuration("snooze"));
        }
        Ok(Self { work, brk, snooze })
    }

    pub fn from_secs(work: u64, brk: u64, snooze: u64) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_secs(work),
            Duration::from_secs(brk),
            Duration::from_secs(snooze),
        )
    }

    pub fn work(&self) -> Duration {
        self.work
    }

    pub fn break_duration(&self) -> Duration {
        self.brk
    }

    pub fn snooze(&self) -> Duration {
        self.snooze
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work: Duration::from_secs(DEFAULT_WORK_SECS),
            brk: Duration::from_secs(DEFAULT_BREAK_SECS),
            snooze: Duration::from_secs(DEFAULT_SNOOZE_SECS),
        }
    }
}

//! Tomatillo - work/break cycles enforced by a full-screen curtain
//!
//! A work countdown runs; when it expires a curtain covers every display for
//! the break, with snooze, skip and lock actions. The next break's wallpaper
//! is prefetched while the user works.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, Durations};
pub use state::{SessionStatus, StatusSnapshot};
pub use tasks::{Orchestrator, OrchestratorHandle};
pub use utils::signals::shutdown_signal;

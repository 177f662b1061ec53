//! State management module
//!
//! Countdown timers and the values the orchestrator projects outward.

pub mod countdown;
pub mod readout;
pub mod status;

// Re-export main types
pub use countdown::{CountdownTimer, TickOutcome, TimerPhase};
pub use readout::Readout;
pub use status::{SessionStatus, StatusSnapshot};

//! Orchestration module
//!
//! The event loop and the components it drives: curtain controller and
//! wallpaper prefetcher.

pub mod curtain;
pub mod events;
pub mod orchestrator;
pub mod prefetch;

// Re-export main types
pub use curtain::CurtainController;
pub use events::{Command, Event, EventSender, TimerSlot};
pub use orchestrator::{Orchestrator, OrchestratorHandle};
pub use prefetch::{prefetch_timeout, Prefetcher};

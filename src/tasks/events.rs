//! Events drained by the orchestration loop

use tokio::sync::{mpsc, oneshot};

use crate::{error::FetchError, services::Wallpaper, state::StatusSnapshot};

/// Which countdown a tick belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    Work,
    Break,
}

/// Host actions accepted by the orchestrator
#[derive(Debug)]
pub enum Command {
    Start,
    Stop,
    Snooze,
    Next,
    Lock,
    Status(oneshot::Sender<StatusSnapshot>),
    Shutdown,
}

/// Everything that can change orchestration state
#[derive(Debug)]
pub enum Event {
    Tick { slot: TimerSlot, generation: u64 },
    WallpaperFetched {
        request: u64,
        result: Result<Wallpaper, FetchError>,
    },
    SnoozeElapsed { token: u64 },
    Command(Command),
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

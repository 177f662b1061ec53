//! Session orchestrator: the single loop that owns every timer

use std::{ops::ControlFlow, sync::Arc};

use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tracing::{debug, error, info};

use super::{
    curtain::CurtainController,
    events::{Command, Event, EventReceiver, EventSender, TimerSlot},
    prefetch::Prefetcher,
};
use crate::{
    config::Durations,
    error::LoopClosed,
    services::{ImageSource, LocalWallpapers, Presenter, SessionLock},
    state::{countdown::ceil_secs, CountdownTimer, SessionStatus, StatusSnapshot, TickOutcome},
};

/// Owns the work countdown and the curtain; every state change happens in
/// [`Orchestrator::handle_event`], called from one task.
pub struct Orchestrator<P: Presenter> {
    durations: Durations,
    work: CountdownTimer,
    curtain: CurtainController<P>,
    events: EventSender,
    inbox: EventReceiver,
}

impl<P: Presenter> Orchestrator<P> {
    pub fn new(
        durations: Durations,
        presenter: P,
        images: Arc<dyn ImageSource>,
        fallback: LocalWallpapers,
        lock: Arc<dyn SessionLock>,
    ) -> Self {
        let (events, inbox) = mpsc::unbounded_channel();
        let prefetcher = Prefetcher::new(images, events.clone());
        let curtain =
            CurtainController::new(presenter, &durations, prefetcher, fallback, lock, events.clone());
        Self {
            durations,
            work: CountdownTimer::new(TimerSlot::Work),
            curtain,
            events,
            inbox,
        }
    }

    pub fn handle(&self) -> OrchestratorHandle {
        OrchestratorHandle {
            events: self.events.clone(),
        }
    }

    /// Drain events until shutdown, then take the curtain down.
    pub async fn run(mut self) {
        info!(
            "Orchestrator running (work={:?}, break={:?}, snooze={:?})",
            self.durations.work(),
            self.durations.break_duration(),
            self.durations.snooze()
        );
        while let Some(event) = self.inbox.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
        self.shutdown();
        info!("Orchestrator stopped");
    }

    pub fn handle_event(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Tick {
                slot: TimerSlot::Work,
                generation,
            } => match self.work.tick(generation, Instant::now()) {
                TickOutcome::Finished => self.on_work_finished(),
                TickOutcome::Running(remaining) => {
                    debug!("Work remaining: {}s", ceil_secs(remaining))
                }
                TickOutcome::Ignored => {}
            },
            Event::Tick {
                slot: TimerSlot::Break,
                generation,
            } => {
                if self.curtain.on_break_tick(generation) {
                    self.on_break_over();
                }
            }
            Event::WallpaperFetched { request, result } => {
                self.curtain.complete_prefetch(request, result)
            }
            Event::SnoozeElapsed { token } => self.curtain.on_snooze_elapsed(token),
            Event::Command(command) => return self.handle_command(command),
        }
        ControlFlow::Continue(())
    }

    fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Start => {
                if self.work.is_running() || self.curtain.is_showing() || self.curtain.is_snoozed() {
                    info!("Cycle already in progress, ignoring start");
                } else {
                    self.start_work();
                }
            }
            Command::Stop => self.stop(),
            Command::Snooze => {
                self.curtain.snooze();
            }
            Command::Next => {
                if self.curtain.is_showing() {
                    info!("Break skipped");
                    self.on_break_over();
                } else {
                    debug!("No curtain showing, ignoring next");
                }
            }
            Command::Lock => self.curtain.lock(),
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown => {
                info!("Shutdown requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Project the current state for the status UI
    pub fn status(&self) -> StatusSnapshot {
        let now = Instant::now();
        let status = SessionStatus::project(
            self.work.is_running(),
            self.curtain.is_showing(),
            self.curtain.is_snoozed(),
        );
        let remaining = match status {
            SessionStatus::Idle => None,
            SessionStatus::WorkRunning => Some(self.work.remaining_at(now)),
            SessionStatus::BreakActive => Some(self.curtain.break_remaining(now)),
            SessionStatus::Snoozed => self.curtain.snooze_remaining(now),
        };
        StatusSnapshot {
            status,
            remaining_seconds: remaining.map(ceil_secs),
            work_seconds: self.durations.work().as_secs(),
            break_seconds: self.durations.break_duration().as_secs(),
            snooze_seconds: self.durations.snooze().as_secs(),
        }
    }

    fn start_work(&mut self) {
        if let Err(e) = self.work.start(self.durations.work(), &self.events) {
            error!("Cannot start work countdown: {}", e);
            return;
        }
        info!("Work interval started ({:?})", self.durations.work());
        self.curtain.prefetch_wallpaper(self.durations.work());
    }

    fn on_work_finished(&mut self) {
        info!("Work interval finished, time for a break");
        self.curtain.show(None, false);
    }

    fn on_break_over(&mut self) {
        self.curtain.teardown();
        self.start_work();
    }

    fn stop(&mut self) {
        self.work.stop();
        self.curtain.teardown();
        self.curtain.cancel_prefetch();
        info!("Cycle stopped");
    }

    fn shutdown(&mut self) {
        self.work.stop();
        self.curtain.teardown();
        self.curtain.cancel_prefetch();
    }
}

/// Cloneable front door to a running [`Orchestrator`]
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    events: EventSender,
}

impl OrchestratorHandle {
    fn send(&self, command: Command) -> Result<(), LoopClosed> {
        self.events
            .send(Event::Command(command))
            .map_err(|_| LoopClosed)
    }

    pub fn start(&self) -> Result<(), LoopClosed> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> Result<(), LoopClosed> {
        self.send(Command::Stop)
    }

    pub fn snooze(&self) -> Result<(), LoopClosed> {
        self.send(Command::Snooze)
    }

    pub fn next(&self) -> Result<(), LoopClosed> {
        self.send(Command::Next)
    }

    pub fn lock(&self) -> Result<(), LoopClosed> {
        self.send(Command::Lock)
    }

    pub fn shutdown(&self) -> Result<(), LoopClosed> {
        self.send(Command::Shutdown)
    }

    /// Ask the loop for a fresh status snapshot
    pub async fn status(&self) -> Result<StatusSnapshot, LoopClosed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Status(reply))?;
        response.await.map_err(|_| LoopClosed)
    }
}

//! Deadline-based countdown timer

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::{
    error::TimerError,
    tasks::events::{Event, EventSender, TimerSlot},
};

/// Interval between remaining-time updates
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Finished,
}

/// Result of feeding a tick to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale tick from an earlier start, or timer not running
    Ignored,
    Running(Duration),
    /// Deadline reached; reported once per start
    Finished,
}

/// A restartable countdown whose remaining time is always derived from an
/// absolute deadline. Ticks are generated on a spawned task and delivered to
/// the orchestration loop as [`Event::Tick`]; the loop feeds them back through
/// [`CountdownTimer::tick`].
#[derive(Debug)]
pub struct CountdownTimer {
    slot: TimerSlot,
    phase: TimerPhase,
    duration: Duration,
    remaining: Duration,
    deadline: Option<Instant>,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new(slot: TimerSlot) -> Self {
        Self {
            slot,
            phase: TimerPhase::Idle,
            duration: Duration::ZERO,
            remaining: Duration::ZERO,
            deadline: None,
            generation: 0,
            ticker: None,
        }
    }

    /// Start (or restart) the countdown and spawn its ticker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, duration: Duration, events: &EventSender) -> Result<(), TimerError> {
        let now = Instant::now();
        self.arm(now, duration)?;
        self.ticker = Some(spawn_ticker(self.slot, self.generation, now, events.clone()));
        debug!(slot = ?self.slot, ?duration, generation = self.generation, "countdown started");
        Ok(())
    }

    /// Set a fresh deadline without spawning a ticker.
    pub fn arm(&mut self, now: Instant, duration: Duration) -> Result<(), TimerError> {
        if duration.is_zero() {
            return Err(TimerError::ZeroDuration);
        }
        self.cancel_ticker();
        self.generation += 1;
        self.phase = TimerPhase::Running;
        self.duration = duration;
        self.remaining = duration;
        self.deadline = Some(now + duration);
        Ok(())
    }

    /// Recompute the remaining time for a tick of the given generation.
    pub fn tick(&mut self, generation: u64, now: Instant) -> TickOutcome {
        if generation != self.generation || self.phase != TimerPhase::Running {
            return TickOutcome::Ignored;
        }
        let Some(deadline) = self.deadline else {
            return TickOutcome::Ignored;
        };

        self.remaining = deadline.saturating_duration_since(now);
        if self.remaining.is_zero() {
            self.cancel_ticker();
            self.phase = TimerPhase::Finished;
            debug!(slot = ?self.slot, "countdown finished");
            TickOutcome::Finished
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    /// Cancel ticking and return to idle. Safe to call in any state.
    pub fn stop(&mut self) {
        self.cancel_ticker();
        if self.phase != TimerPhase::Idle {
            debug!(slot = ?self.slot, "countdown stopped");
        }
        self.phase = TimerPhase::Idle;
        self.remaining = Duration::ZERO;
        self.deadline = None;
    }

    /// Remaining time as of `now`, without mutating the timer.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        match (self.phase, self.deadline) {
            (TimerPhase::Running, Some(deadline)) => deadline.saturating_duration_since(now),
            _ => Duration::ZERO,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

/// Send a tick for `slot` every [`TICK_PERIOD`] until the receiver goes away
/// or the task is aborted.
fn spawn_ticker(slot: TimerSlot, generation: u64, started: Instant, events: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(started + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if events.send(Event::Tick { slot, generation }).is_err() {
                break;
            }
        }
    })
}

/// Whole seconds left, rounded up so a partial second still reads as one.
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

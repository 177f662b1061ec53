//! Curtain controller
//!
//! Owns the break countdown and the curtain surfaces. States are
//! `Hidden -> Showing { snoozed } -> Hidden`; a snooze hides the curtain and
//! schedules a single re-show without the snooze button.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

use super::{
    events::{Event, EventSender, TimerSlot},
    prefetch::Prefetcher,
};
use crate::{
    config::Durations,
    error::FetchError,
    services::{
        Controls, LocalWallpapers, Presenter, SessionLock, SurfaceContent, SurfaceHandle, Wallpaper,
    },
    state::{CountdownTimer, Readout, TickOutcome},
};

/// What is on screen for the current break
#[derive(Debug)]
struct CurtainSession {
    snoozed: bool,
    wallpaper: Option<Wallpaper>,
    surfaces: Vec<SurfaceHandle>,
    primary: Option<SurfaceHandle>,
    exclusive: bool,
}

/// A scheduled re-show after a snooze
#[derive(Debug)]
struct PendingSnooze {
    token: u64,
    wallpaper: Option<Wallpaper>,
    deadline: Instant,
    task: JoinHandle<()>,
}

pub struct CurtainController<P: Presenter> {
    presenter: P,
    break_timer: CountdownTimer,
    break_duration: Duration,
    snooze_duration: Duration,
    prefetcher: Prefetcher,
    fallback: LocalWallpapers,
    lock: Arc<dyn SessionLock>,
    events: EventSender,
    session: Option<CurtainSession>,
    snooze: Option<PendingSnooze>,
    next_snooze_token: u64,
}

impl<P: Presenter> CurtainController<P> {
    pub fn new(
        presenter: P,
        durations: &Durations,
        prefetcher: Prefetcher,
        fallback: LocalWallpapers,
        lock: Arc<dyn SessionLock>,
        events: EventSender,
    ) -> Self {
        Self {
            presenter,
            break_timer: CountdownTimer::new(TimerSlot::Break),
            break_duration: durations.break_duration(),
            snooze_duration: durations.snooze(),
            prefetcher,
            fallback,
            lock,
            events,
            session: None,
            snooze: None,
            next_snooze_token: 0,
        }
    }

    /// Start the break and put a curtain on every display.
    ///
    /// The wallpaper is, in order of preference: `wallpaper`, the prefetched
    /// image, a random local image, plain black.
    pub fn show(&mut self, wallpaper: Option<Wallpaper>, snoozed: bool) {
        self.cancel_snooze();
        self.close_session();

        if let Err(e) = self.break_timer.start(self.break_duration, &self.events) {
            warn!("Cannot start break countdown: {}", e);
            return;
        }

        let displays = self.presenter.displays();
        if displays.is_empty() {
            warn!("No displays available, break runs without a curtain");
            self.session = Some(CurtainSession {
                snoozed,
                wallpaper,
                surfaces: Vec::new(),
                primary: None,
                exclusive: false,
            });
            return;
        }

        let wallpaper = match wallpaper {
            Some(wallpaper) => Some(wallpaper),
            None => {
                self.prefetcher.cancel();
                self.prefetcher.consume().or_else(|| self.fallback.random())
            }
        };

        self.presenter.enter_exclusive_presentation();

        let readout = Readout::new(self.break_timer.remaining(), self.break_duration);
        let mut surfaces = Vec::with_capacity(displays.len());
        let mut primary = None;
        // controls go to the first surface that actually comes up
        for screen in &displays {
            let content = if primary.is_none() {
                SurfaceContent::Primary {
                    controls: Controls::for_break(snoozed),
                    readout: readout.clone(),
                    wallpaper: wallpaper.clone(),
                }
            } else {
                SurfaceContent::Background {
                    wallpaper: wallpaper.clone(),
                }
            };
            match self.presenter.create_surface(screen, content) {
                Ok(handle) => {
                    if primary.is_none() {
                        primary = Some(handle);
                    }
                    surfaces.push(handle);
                }
                Err(e) => warn!("No curtain on display {}: {}", screen.index, e),
            }
        }

        let exclusive = match primary {
            Some(primary) => {
                self.presenter.activate_and_focus(primary);
                true
            }
            None => {
                warn!("No curtain surface could be created, leaving exclusive presentation");
                self.presenter.exit_exclusive_presentation();
                false
            }
        };

        info!(
            "Curtain shown on {} display(s) for {:?}{}",
            surfaces.len(),
            self.break_duration,
            if snoozed { " (after snooze)" } else { "" }
        );
        self.session = Some(CurtainSession {
            snoozed,
            wallpaper,
            surfaces,
            primary,
            exclusive,
        });
    }

    /// Hide now and come back after the snooze delay. Only the first showing
    /// of a break can be snoozed; returns whether the snooze was accepted.
    pub fn snooze(&mut self) -> bool {
        let wallpaper = match &self.session {
            Some(session) if !session.snoozed => session.wallpaper.clone(),
            Some(_) => {
                debug!("Break was already snoozed once, ignoring snooze");
                return false;
            }
            None => {
                debug!("No curtain showing, ignoring snooze");
                return false;
            }
        };

        self.hide();

        self.next_snooze_token += 1;
        let token = self.next_snooze_token;
        let delay = self.snooze_duration;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::SnoozeElapsed { token });
        });

        info!("Curtain snoozed for {:?}", delay);
        self.snooze = Some(PendingSnooze {
            token,
            wallpaper,
            deadline: Instant::now() + delay,
            task,
        });
        true
    }

    /// Re-show the curtain if `token` is the pending snooze.
    pub fn on_snooze_elapsed(&mut self, token: u64) {
        match self.snooze.take() {
            Some(pending) if pending.token == token => {
                info!("Snooze over, showing curtain again");
                self.show(pending.wallpaper, true);
            }
            other => {
                debug!("Ignoring stale snooze {}", token);
                self.snooze = other;
            }
        }
    }

    /// Feed a break tick. Returns `true` once, when the break is over.
    pub fn on_break_tick(&mut self, generation: u64) -> bool {
        match self.break_timer.tick(generation, Instant::now()) {
            TickOutcome::Ignored => false,
            TickOutcome::Running(remaining) => {
                self.push_readout(remaining);
                false
            }
            TickOutcome::Finished => {
                self.push_readout(Duration::ZERO);
                info!("Break finished");
                true
            }
        }
    }

    /// Stop the break and take every surface down. Safe to call when hidden.
    pub fn hide(&mut self) {
        self.break_timer.stop();
        self.close_session();
    }

    /// [`hide`](Self::hide) and forget any scheduled re-show.
    pub fn teardown(&mut self) {
        self.cancel_snooze();
        self.hide();
    }

    /// Ask the OS to lock the session. Failures are logged and dropped.
    pub fn lock(&self) {
        if self.session.is_none() {
            debug!("No curtain showing, ignoring lock");
            return;
        }
        let lock = self.lock.lock_now();
        tokio::spawn(async move {
            if let Err(e) = lock.await {
                warn!("Session lock failed: {}", e);
            }
        });
    }

    /// Start fetching the next break's wallpaper for the primary display.
    pub fn prefetch_wallpaper(&mut self, work: Duration) -> Option<u64> {
        let Some(primary) = self.presenter.displays().into_iter().next() else {
            debug!("No displays, skipping wallpaper prefetch");
            return None;
        };
        Some(self.prefetcher.prefetch(primary.pixel_size(), work))
    }

    pub fn complete_prefetch(&mut self, request: u64, result: Result<Wallpaper, FetchError>) {
        self.prefetcher.complete(request, result);
    }

    pub fn cancel_prefetch(&mut self) {
        self.prefetcher.cancel();
    }

    pub fn is_showing(&self) -> bool {
        self.session.is_some()
    }

    /// Waiting out a snooze
    pub fn is_snoozed(&self) -> bool {
        self.snooze.is_some()
    }

    /// Whether the current showing is the post-snooze one
    pub fn showing_snoozed(&self) -> Option<bool> {
        self.session.as_ref().map(|s| s.snoozed)
    }

    pub fn break_remaining(&self, now: Instant) -> Duration {
        self.break_timer.remaining_at(now)
    }

    pub fn snooze_remaining(&self, now: Instant) -> Option<Duration> {
        self.snooze
            .as_ref()
            .map(|pending| pending.deadline.saturating_duration_since(now))
    }

    pub fn break_timer(&self) -> &CountdownTimer {
        &self.break_timer
    }

    pub fn prefetcher(&self) -> &Prefetcher {
        &self.prefetcher
    }

    fn push_readout(&mut self, remaining: Duration) {
        let Some(primary) = self.session.as_ref().and_then(|s| s.primary) else {
            return;
        };
        let readout = Readout::new(remaining, self.break_duration);
        self.presenter.update_readout(primary, &readout);
    }

    fn close_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        for surface in session.surfaces {
            self.presenter.dismiss(surface);
        }
        if session.exclusive {
            self.presenter.exit_exclusive_presentation();
        }
        debug!("Curtain hidden");
    }

    fn cancel_snooze(&mut self) {
        if let Some(pending) = self.snooze.take() {
            debug!("Cancelling pending snooze {}", pending.token);
            pending.task.abort();
        }
    }
}

impl<P: Presenter> Drop for CurtainController<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//! Recording fakes for the curtain's capabilities
#![allow(dead_code)]

use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use tomatillo::{
    config::Durations,
    error::{FetchError, LockError, PresenterError},
    services::{
        Controls, Display, LocalWallpapers, Presenter, Resolution, SessionLock, SurfaceContent,
        SurfaceHandle, Wallpaper, WallpaperOrigin,
    },
    state::Readout,
    tasks::{CurtainController, Event, Prefetcher},
};

/// One presenter call, as observed by the test
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enter,
    Exit,
    Create {
        display: usize,
        handle: SurfaceHandle,
        controls: Option<Controls>,
        wallpaper: Option<WallpaperOrigin>,
    },
    Dismiss(SurfaceHandle),
    Focus(SurfaceHandle),
    Readout(SurfaceHandle, u64),
}

pub struct RecordingPresenter {
    displays: Vec<Display>,
    failing: Option<usize>,
    calls: Arc<Mutex<Vec<Call>>>,
    next_handle: u64,
}

/// Test-side view of what a [`RecordingPresenter`] was asked to do
#[derive(Clone)]
pub struct PresenterProbe {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingPresenter {
    pub fn new(displays: usize) -> (Self, PresenterProbe) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let presenter = Self {
            displays: (0..displays)
                .map(|index| Display::new(index, 1440, 900, 2.0))
                .collect(),
            failing: None,
            calls: Arc::clone(&calls),
            next_handle: 1,
        };
        (presenter, PresenterProbe { calls })
    }

    /// Refuse to create surfaces on display `index`
    pub fn failing_on(mut self, index: usize) -> Self {
        self.failing = Some(index);
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }

    fn create_surface(
        &mut self,
        screen: &Display,
        content: SurfaceContent,
    ) -> Result<SurfaceHandle, PresenterError> {
        if self.failing == Some(screen.index) {
            return Err(PresenterError::Backend("refused".into()));
        }
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.record(Call::Create {
            display: screen.index,
            handle,
            controls: content.controls(),
            wallpaper: content.wallpaper().map(|w| w.origin().clone()),
        });
        Ok(handle)
    }

    fn dismiss(&mut self, surface: SurfaceHandle) {
        self.record(Call::Dismiss(surface));
    }

    fn enter_exclusive_presentation(&mut self) {
        self.record(Call::Enter);
    }

    fn exit_exclusive_presentation(&mut self) {
        self.record(Call::Exit);
    }

    fn activate_and_focus(&mut self, surface: SurfaceHandle) {
        self.record(Call::Focus(surface));
    }

    fn update_readout(&mut self, surface: SurfaceHandle, readout: &Readout) {
        self.record(Call::Readout(surface, readout.remaining_secs));
    }
}

impl PresenterProbe {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Every `Create` call in order: (display, controls, wallpaper)
    pub fn created(&self) -> Vec<(usize, Option<Controls>, Option<WallpaperOrigin>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create {
                    display,
                    controls,
                    wallpaper,
                    ..
                } => Some((display, controls, wallpaper)),
                _ => None,
            })
            .collect()
    }

    /// Surfaces created and not yet dismissed
    pub fn live_surfaces(&self) -> Vec<SurfaceHandle> {
        let mut live = Vec::new();
        for call in self.calls() {
            match call {
                Call::Create { handle, .. } => live.push(handle),
                Call::Dismiss(handle) => live.retain(|h| *h != handle),
                _ => {}
            }
        }
        live
    }

    pub fn exclusive(&self) -> bool {
        self.calls().iter().fold(false, |exclusive, call| match call {
            Call::Enter => true,
            Call::Exit => false,
            _ => exclusive,
        })
    }

    pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| wanted(call)).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FetchMode {
    /// Answer right away with a tiny image
    Immediate,
    /// Never answer
    Hang,
    /// Fail right away
    Fail,
}

/// Image source that records every request
#[derive(Clone)]
pub struct FakeSource {
    mode: FetchMode,
    requests: Arc<Mutex<Vec<(Resolution, Duration)>>>,
}

impl FakeSource {
    pub fn new(mode: FetchMode) -> Self {
        Self {
            mode,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<(Resolution, Duration)> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn remote_origin(resolution: Resolution) -> WallpaperOrigin {
    WallpaperOrigin::Remote(format!("fake://{}x{}", resolution.width, resolution.height))
}

impl tomatillo::services::ImageSource for FakeSource {
    fn fetch(
        &self,
        resolution: Resolution,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<Wallpaper, FetchError>> {
        self.requests.lock().unwrap().push((resolution, timeout));
        let mode = self.mode;
        Box::pin(async move {
            match mode {
                FetchMode::Immediate => Ok(Wallpaper::new(vec![0x89, b'P', b'N', b'G'], remote_origin(resolution))),
                FetchMode::Hang => futures::future::pending().await,
                FetchMode::Fail => Err(FetchError::Unavailable("offline".into())),
            }
        })
    }
}

/// Session lock that counts calls and always fails
#[derive(Clone, Default)]
pub struct FakeLock {
    calls: Arc<AtomicUsize>,
}

impl FakeLock {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SessionLock for FakeLock {
    fn lock_now(&self) -> BoxFuture<'static, Result<(), LockError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(LockError::NotConfigured) })
    }
}

pub fn durations(work: u64, brk: u64, snooze: u64) -> Durations {
    Durations::from_secs(work, brk, snooze).unwrap()
}

/// A curtain wired to fakes, plus the receiving end of its event channel
pub struct CurtainRig {
    pub curtain: CurtainController<RecordingPresenter>,
    pub probe: PresenterProbe,
    pub source: FakeSource,
    pub lock: FakeLock,
    pub events: mpsc::UnboundedReceiver<Event>,
}

pub fn curtain_rig(
    presenter: RecordingPresenter,
    probe: PresenterProbe,
    durations: &Durations,
    mode: FetchMode,
    fallback_dir: &Path,
) -> CurtainRig {
    let (tx, events) = mpsc::unbounded_channel();
    let source = FakeSource::new(mode);
    let lock = FakeLock::default();
    let prefetcher = Prefetcher::new(Arc::new(source.clone()), tx.clone());
    let curtain = CurtainController::new(
        presenter,
        durations,
        prefetcher,
        LocalWallpapers::new(fallback_dir),
        Arc::new(lock.clone()),
        tx,
    );
    CurtainRig {
        curtain,
        probe,
        source,
        lock,
        events,
    }
}

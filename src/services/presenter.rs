//! Presenter capability: full-screen surfaces on every display

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use super::wallpaper::Wallpaper;
use crate::{
    error::{ConfigError, PresenterError},
    state::Readout,
};

/// Size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// A display as reported by the presenter, in logical points plus scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Display {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Display {
    pub fn new(index: usize, width: u32, height: u32, scale: f64) -> Self {
        Self { index, width, height, scale }
    }

    pub fn pixel_size(&self) -> Resolution {
        Resolution {
            width: (f64::from(self.width) * self.scale).round() as u32,
            height: (f64::from(self.height) * self.scale).round() as u32,
        }
    }
}

impl FromStr for Display {
    type Err = ConfigError;

    /// Parses `WIDTHxHEIGHT` or `WIDTHxHEIGHT@SCALE`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidDisplay(s.to_string());
        let (size, scale) = match s.trim().split_once('@') {
            Some((size, scale)) => (size, scale.parse::<f64>().map_err(|_| invalid())?),
            None => (s.trim(), 1.0),
        };
        let (width, height) = size.split_once(|c: char| c == 'x' || c == 'X').ok_or_else(invalid)?;
        let width = width.parse::<u32>().map_err(|_| invalid())?;
        let height = height.parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 || !(scale.is_finite() && scale > 0.0) {
            return Err(invalid());
        }
        Ok(Self::new(0, width, height, scale))
    }
}

/// Opaque handle to a surface owned by the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceHandle(pub u64);

/// Buttons offered on the primary surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub snooze: bool,
    pub next: bool,
    pub lock: bool,
}

impl Controls {
    pub fn for_break(snoozed: bool) -> Self {
        Self {
            snooze: !snoozed,
            next: true,
            lock: true,
        }
    }
}

/// What a surface should display. `None` wallpaper means plain black.
#[derive(Debug, Clone)]
pub enum SurfaceContent {
    Primary {
        controls: Controls,
        readout: Readout,
        wallpaper: Option<Wallpaper>,
    },
    Background {
        wallpaper: Option<Wallpaper>,
    },
}

impl SurfaceContent {
    pub fn controls(&self) -> Option<Controls> {
        match self {
            Self::Primary { controls, .. } => Some(*controls),
            Self::Background { .. } => None,
        }
    }

    pub fn wallpaper(&self) -> Option<&Wallpaper> {
        match self {
            Self::Primary { wallpaper, .. } | Self::Background { wallpaper } => wallpaper.as_ref(),
        }
    }
}

/// Window-system backend that puts curtain surfaces on screen.
///
/// All calls come from the orchestration loop.
pub trait Presenter: Send + 'static {
    fn displays(&self) -> Vec<Display>;

    fn create_surface(
        &mut self,
        screen: &Display,
        content: SurfaceContent,
    ) -> Result<SurfaceHandle, PresenterError>;

    fn dismiss(&mut self, surface: SurfaceHandle);

    /// Block app switching and keep surfaces topmost
    fn enter_exclusive_presentation(&mut self);

    fn exit_exclusive_presentation(&mut self);

    fn activate_and_focus(&mut self, surface: SurfaceHandle);

    fn update_readout(&mut self, surface: SurfaceHandle, readout: &Readout);
}

/// Presenter without a window system. Tracks surfaces and logs every call.
#[derive(Debug)]
pub struct HeadlessPresenter {
    displays: Vec<Display>,
    surfaces: Vec<SurfaceHandle>,
    next_handle: u64,
    exclusive: bool,
}

impl HeadlessPresenter {
    pub fn new(displays: Vec<Display>) -> Self {
        let displays = displays
            .into_iter()
            .enumerate()
            .map(|(index, display)| Display { index, ..display })
            .collect();
        Self {
            displays,
            surfaces: Vec::new(),
            next_handle: 1,
            exclusive: false,
        }
    }

    pub fn surfaces(&self) -> &[SurfaceHandle] {
        &self.surfaces
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}

impl Presenter for HeadlessPresenter {
    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }

    fn create_surface(
        &mut self,
        screen: &Display,
        content: SurfaceContent,
    ) -> Result<SurfaceHandle, PresenterError> {
        if !self.displays.iter().any(|d| d.index == screen.index) {
            return Err(PresenterError::DisplayUnavailable(screen.index));
        }
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.surfaces.push(handle);

        let wallpaper = content
            .wallpaper()
            .map(|w| w.origin().to_string())
            .unwrap_or_else(|| "black".to_string());
        match content.controls() {
            Some(controls) => info!(
                "Curtain surface {:?} on display {} ({}x{}), wallpaper={}, snooze={}",
                handle, screen.index, screen.width, screen.height, wallpaper, controls.snooze
            ),
            None => info!(
                "Background surface {:?} on display {} ({}x{}), wallpaper={}",
                handle, screen.index, screen.width, screen.height, wallpaper
            ),
        }
        Ok(handle)
    }

    fn dismiss(&mut self, surface: SurfaceHandle) {
        self.surfaces.retain(|s| *s != surface);
        debug!("Dismissed surface {:?}", surface);
    }

    fn enter_exclusive_presentation(&mut self) {
        self.exclusive = true;
        info!("Entering exclusive presentation");
    }

    fn exit_exclusive_presentation(&mut self) {
        self.exclusive = false;
        info!("Leaving exclusive presentation");
    }

    fn activate_and_focus(&mut self, surface: SurfaceHandle) {
        debug!("Focusing surface {:?}", surface);
    }

    fn update_readout(&mut self, surface: SurfaceHandle, readout: &Readout) {
        debug!("Surface {:?} readout {}", surface, readout.text);
    }
}

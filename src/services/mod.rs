//! External capabilities module
//!
//! Presenter, image sources and session lock: the pieces the curtain drives
//! but does not implement itself.

pub mod lock;
pub mod presenter;
pub mod wallpaper;

// Re-export main types
pub use lock::{CommandLock, NoLock, SessionLock};
pub use presenter::{
    Controls, Display, HeadlessPresenter, Presenter, Resolution, SurfaceContent, SurfaceHandle,
};
pub use wallpaper::{ImageSource, LocalWallpapers, RemoteImageSource, Wallpaper, WallpaperOrigin};

//! Wallpaper sources: remote fetch by resolution, local random fallback

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use futures::future::BoxFuture;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use super::presenter::Resolution;
use crate::error::FetchError;

/// Extensions accepted from the local wallpaper directory
pub const WALLPAPER_EXTENSIONS: &[&str] = &["heic", "jpg", "jpeg", "png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallpaperOrigin {
    Remote(String),
    Local(PathBuf),
}

impl fmt::Display for WallpaperOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Encoded image bytes plus where they came from. Cheap to clone.
#[derive(Clone)]
pub struct Wallpaper {
    data: Arc<[u8]>,
    origin: WallpaperOrigin,
}

impl Wallpaper {
    pub fn new(data: impl Into<Arc<[u8]>>, origin: WallpaperOrigin) -> Self {
        Self {
            data: data.into(),
            origin,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn origin(&self) -> &WallpaperOrigin {
        &self.origin
    }
}

impl fmt::Debug for Wallpaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallpaper")
            .field("origin", &self.origin)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PartialEq for Wallpaper {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.data == other.data
    }
}

/// Somewhere a wallpaper for a given resolution can be fetched from
pub trait ImageSource: Send + Sync + 'static {
    fn fetch(
        &self,
        resolution: Resolution,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<Wallpaper, FetchError>>;
}

/// HTTP image service addressed as `{base}/{width}/{height}`
#[derive(Debug, Clone)]
pub struct RemoteImageSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteImageSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tomatillo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, resolution: Resolution) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            resolution.width,
            resolution.height
        )
    }
}

impl ImageSource for RemoteImageSource {
    fn fetch(
        &self,
        resolution: Resolution,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<Wallpaper, FetchError>> {
        let client = self.client.clone();
        let url = self.url_for(resolution);
        Box::pin(async move {
            debug!("Fetching wallpaper from {} (timeout: {:?})", url, timeout);
            let response = client
                .get(&url)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            let bytes = response.bytes().await?;
            if image::guess_format(&bytes).is_err() {
                return Err(FetchError::NotAnImage(bytes.len()));
            }
            Ok(Wallpaper::new(bytes.to_vec(), WallpaperOrigin::Remote(url)))
        })
    }
}

/// Random pick from a directory of wallpapers
#[derive(Debug, Clone)]
pub struct LocalWallpapers {
    dir: PathBuf,
}

impl LocalWallpapers {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Files in the directory with a supported extension
    pub fn candidates(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot read wallpaper dir {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_wallpaper_extension(path))
            .collect()
    }

    pub fn random(&self) -> Option<Wallpaper> {
        let candidates = self.candidates();
        let pick = candidates.choose(&mut rand::rng())?;
        match fs::read(pick) {
            Ok(data) => Some(Wallpaper::new(data, WallpaperOrigin::Local(pick.clone()))),
            Err(e) => {
                warn!("Failed to read wallpaper {}: {}", pick.display(), e);
                None
            }
        }
    }
}

fn has_wallpaper_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WALLPAPER_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

//! Wallpaper prefetcher
//!
//! Fetches the next break's wallpaper while the user works. At most one fetch
//! is in flight; its result comes back through the event channel and is only
//! accepted if it still belongs to the current request.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::{Event, EventSender};
use crate::{
    error::FetchError,
    services::{ImageSource, Resolution, Wallpaper},
};

/// Upper bound on any prefetch timeout
pub const MAX_PREFETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Half the work interval, capped at [`MAX_PREFETCH_TIMEOUT`]
pub fn prefetch_timeout(work: Duration) -> Duration {
    (work / 2).min(MAX_PREFETCH_TIMEOUT)
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    resolution: Resolution,
    timeout: Duration,
    task: JoinHandle<()>,
}

pub struct Prefetcher {
    source: Arc<dyn ImageSource>,
    events: EventSender,
    in_flight: Option<InFlight>,
    cached: Option<Wallpaper>,
    next_id: u64,
}

impl Prefetcher {
    pub fn new(source: Arc<dyn ImageSource>, events: EventSender) -> Self {
        Self {
            source,
            events,
            in_flight: None,
            cached: None,
            next_id: 0,
        }
    }

    /// Replace any previous request with a fresh fetch and return its id.
    pub fn prefetch(&mut self, resolution: Resolution, work: Duration) -> u64 {
        self.cancel();
        self.cached = None;

        self.next_id += 1;
        let id = self.next_id;
        let timeout = prefetch_timeout(work);
        info!(
            "Prefetching {}x{} wallpaper (timeout: {:?})",
            resolution.width, resolution.height, timeout
        );

        let fetch = self.source.fetch(resolution, timeout);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, fetch).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::TimedOut(timeout)),
            };
            let _ = events.send(Event::WallpaperFetched { request: id, result });
        });

        self.in_flight = Some(InFlight {
            id,
            resolution,
            timeout,
            task,
        });
        id
    }

    /// Accept the result of request `id` if it is still the current one.
    pub fn complete(&mut self, id: u64, result: Result<Wallpaper, FetchError>) {
        match &self.in_flight {
            Some(in_flight) if in_flight.id == id => {
                self.in_flight = None;
            }
            _ => {
                debug!("Discarding result of superseded prefetch {}", id);
                return;
            }
        }

        match result {
            Ok(wallpaper) => {
                info!("Wallpaper prefetched from {}", wallpaper.origin());
                self.cached = Some(wallpaper);
            }
            Err(e) => warn!("Wallpaper prefetch failed: {}", e),
        }
    }

    /// Take the cached wallpaper, if any.
    pub fn consume(&mut self) -> Option<Wallpaper> {
        self.cached.take()
    }

    /// Abort the in-flight fetch. Its result, if already queued, is discarded.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!("Cancelling prefetch {}", in_flight.id);
            in_flight.task.abort();
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Resolution and timeout of the in-flight request
    pub fn in_flight_request(&self) -> Option<(Resolution, Duration)> {
        self.in_flight.as_ref().map(|r| (r.resolution, r.timeout))
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::WallpaperOrigin;
    use futures::future::BoxFuture;
    use tokio::sync::mpsc;

    const RES: Resolution = Resolution {
        width: 100,
        height: 50,
    };

    /// Answers after `delay` with a wallpaper named after the request count
    struct DelayedSource {
        delay: Duration,
    }

    impl ImageSource for DelayedSource {
        fn fetch(
            &self,
            resolution: Resolution,
            _timeout: Duration,
        ) -> BoxFuture<'static, Result<Wallpaper, FetchError>> {
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(Wallpaper::new(
                    vec![1, 2, 3],
                    WallpaperOrigin::Remote(format!("{}x{}", resolution.width, resolution.height)),
                ))
            })
        }
    }

    async fn next_result(rx: &mut mpsc::UnboundedReceiver<Event>) -> (u64, Result<Wallpaper, FetchError>) {
        match rx.recv().await {
            Some(Event::WallpaperFetched { request, result }) => (request, result),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn timeout_is_half_the_work_interval_capped_at_a_minute() {
        assert_eq!(prefetch_timeout(Duration::from_secs(2)), Duration::from_secs(1));
        assert_eq!(prefetch_timeout(Duration::from_secs(90)), Duration::from_secs(45));
        assert_eq!(prefetch_timeout(Duration::from_secs(1500)), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn successful_fetch_fills_the_cache_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut prefetcher = Prefetcher::new(Arc::new(DelayedSource { delay: Duration::from_secs(1) }), tx);

        let id = prefetcher.prefetch(RES, Duration::from_secs(10));
        assert_eq!(prefetcher.in_flight_request(), Some((RES, Duration::from_secs(5))));

        let (request, result) = next_result(&mut rx).await;
        assert_eq!(request, id);
        prefetcher.complete(request, result);

        assert!(!prefetcher.is_in_flight());
        assert!(prefetcher.consume().is_some());
        assert!(prefetcher.consume().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out_and_leaves_cache_empty() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut prefetcher = Prefetcher::new(Arc::new(DelayedSource { delay: Duration::from_secs(30) }), tx);

        prefetcher.prefetch(RES, Duration::from_secs(4));
        let (request, result) = next_result(&mut rx).await;
        assert!(matches!(result, Err(FetchError::TimedOut(t)) if t == Duration::from_secs(2)));
        prefetcher.complete(request, result);
        assert!(prefetcher.consume().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn second_prefetch_supersedes_the_first() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut prefetcher = Prefetcher::new(Arc::new(DelayedSource { delay: Duration::from_secs(1) }), tx);

        let first = prefetcher.prefetch(RES, Duration::from_secs(10));
        let second = prefetcher.prefetch(Resolution { width: 7, height: 7 }, Duration::from_secs(10));
        assert_ne!(first, second);

        let (request, result) = next_result(&mut rx).await;
        assert_eq!(request, second);
        prefetcher.complete(request, result);

        let wallpaper = prefetcher.consume().unwrap();
        assert_eq!(wallpaper.origin(), &WallpaperOrigin::Remote("7x7".into()));
    }

    #[tokio::test]
    async fn stale_results_are_discarded() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut prefetcher = Prefetcher::new(Arc::new(DelayedSource { delay: Duration::from_secs(1) }), tx);

        let first = prefetcher.prefetch(RES, Duration::from_secs(10));
        prefetcher.prefetch(RES, Duration::from_secs(10));
        let late = Wallpaper::new(vec![9], WallpaperOrigin::Remote("late".into()));
        prefetcher.complete(first, Ok(late));

        assert!(!prefetcher.has_cached());
        assert!(prefetcher.is_in_flight());
    }

    #[tokio::test]
    async fn new_prefetch_clears_the_previous_image() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut prefetcher = Prefetcher::new(Arc::new(DelayedSource { delay: Duration::from_secs(1) }), tx);

        let id = prefetcher.prefetch(RES, Duration::from_secs(10));
        prefetcher.complete(id, Ok(Wallpaper::new(vec![1], WallpaperOrigin::Remote("a".into()))));
        assert!(prefetcher.has_cached());

        prefetcher.prefetch(RES, Duration::from_secs(10));
        assert!(!prefetcher.has_cached());
    }

    #[tokio::test]
    async fn cancel_drops_the_in_flight_request() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut prefetcher = Prefetcher::new(Arc::new(DelayedSource { delay: Duration::from_secs(1) }), tx);

        let id = prefetcher.prefetch(RES, Duration::from_secs(10));
        prefetcher.cancel();
        prefetcher.cancel();
        prefetcher.complete(id, Ok(Wallpaper::new(vec![1], WallpaperOrigin::Remote("a".into()))));
        assert!(!prefetcher.has_cached());
    }
}

//! Tomatillo - work/break cycles enforced by a full-screen curtain
//!
//! This is the main entry point for the tomatillo application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use tomatillo::{
    api::create_router,
    config::Config,
    services::{CommandLock, HeadlessPresenter, LocalWallpapers, NoLock, RemoteImageSource, SessionLock},
    tasks::Orchestrator,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tomatillo={},tower_http=info", config.log_level()))
        .init();

    let durations = config.durations()?;
    info!("Starting tomatillo v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: work={}s, break={}s, snooze={}s, displays={}",
        config.work_secs,
        config.break_secs,
        config.snooze_secs,
        config.displays.len()
    );

    let lock: Arc<dyn SessionLock> = match config.lock_command_parts() {
        Some((program, args)) => Arc::new(CommandLock::new(program, args)),
        None => {
            warn!("No lock command configured, Lock will do nothing");
            Arc::new(NoLock)
        }
    };

    let orchestrator = Orchestrator::new(
        durations,
        HeadlessPresenter::new(config.displays.clone()),
        Arc::new(RemoteImageSource::new(config.wallpaper_url.clone())?),
        LocalWallpapers::new(config.wallpaper_dir.clone()),
        lock,
    );
    let handle = orchestrator.handle();
    let orchestrator_task = tokio::spawn(orchestrator.run());

    if config.paused {
        info!("Starting paused; POST /start to begin");
    } else {
        handle.start()?;
    }

    let app = create_router(handle.clone());

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start  - Start the work timer");
    info!("  POST /stop   - Stop the cycle");
    info!("  POST /snooze - Snooze the current break");
    info!("  POST /next   - Skip the rest of the break");
    info!("  POST /lock   - Lock the session");
    info!("  GET  /status - Current session status");
    info!("  GET  /health - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to install signal handler: {}", e),
            }
        }
    }

    // Always leave exclusive presentation before exiting
    if handle.shutdown().is_ok() {
        let _ = orchestrator_task.await;
    }

    info!("Shutdown complete");
    Ok(())
}

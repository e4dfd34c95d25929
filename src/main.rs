//! Pomodoro Sync - A Pomodoro timer kept in sync across clients
//!
//! This is the main entry point for the pomodoro-sync application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pomodoro_sync::{
    api::create_router,
    config::Config,
    state::AppState,
    sync::{websocket, SyncLink},
    tasks::{notification_task, TimerController},
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_sync={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-sync v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, work={}min, break={}min, cycles={}, relay={}",
        config.host,
        config.port,
        config.work_minutes,
        config.break_minutes,
        config.cycles,
        config.relay.as_deref().unwrap_or("none")
    );

    // Connect to the relay once; fall back to local-only on failure
    let link = match &config.relay {
        Some(url) => match websocket::connect(url).await {
            Ok(link) => link,
            Err(e) => {
                warn!("{}, running offline", e);
                SyncLink::offline()
            }
        },
        None => SyncLink::offline(),
    };

    let (controller, timer) = TimerController::new(
        config.initial_timer(),
        link,
        config.controller_options(),
    );
    let controller_task = tokio::spawn(controller.run());
    tokio::spawn(notification_task(timer.subscribe()));

    let state = Arc::new(AppState::new(
        timer.clone(),
        config.port,
        config.host.clone(),
        config.relay.clone(),
    ));
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start   - Start the countdown");
    info!("  POST /pause   - Pause the countdown");
    info!("  POST /toggle  - Start or pause");
    info!("  POST /reset   - Back to cycle 1, work phase");
    info!("  PUT  /config  - Set workMinutes, breakMinutes, cycles (while paused)");
    info!("  GET  /status  - Current timer and server status");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Release the relay subscription before exiting
    if timer.shutdown().await.is_ok() {
        let _ = controller_task.await;
    }

    info!("Shutdown complete");
    Ok(())
}

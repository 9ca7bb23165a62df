//! Twenty-Twenty - A 20-20-20 eye-strain reminder daemon
//!
//! This is the main entry point for the twenty-twenty application.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};

use twenty_twenty::{
    api::create_router,
    config::Config,
    services::{check_command_available, CommandNotifier, Notifier},
    state::AppState,
    store::{JsonFileStore, KeyValueStore, MemoryStore},
    tasks::{schedule_poll_task, tick_task},
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("twenty_twenty={},tower_http=info", config.log_level()))
        .init();

    info!("Starting twenty-twenty v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, work={}min, break={}s",
        config.host, config.port, config.work_minutes, config.break_seconds
    );

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Using in-memory state; nothing will persist");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::open(config.state_path())?)
    };

    // Desktop alerts are optional; a missing program only disables them
    let notifier: Option<Arc<dyn Notifier>> = match &config.notify_command {
        Some(program) => match check_command_available(program).await {
            Ok(()) => Some(Arc::new(CommandNotifier::new(program.clone()))),
            Err(e) => {
                warn!("{}", e);
                None
            }
        },
        None => None,
    };

    // Create application state
    let state = Arc::new(AppState::new(
        store,
        Arc::new(SystemClock),
        notifier,
        config.durations(),
        config.port,
        config.host.clone(),
    ));
    state.bootstrap().map_err(anyhow::Error::msg)?;

    // Start the tick and schedule background tasks
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_task(tick_state).await;
    });

    let poll_state = Arc::clone(&state);
    let poll_period = Duration::from_secs(config.schedule_poll_seconds);
    tokio::spawn(async move {
        schedule_poll_task(poll_state, poll_period).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timer/start   - Start the work timer");
    info!("  POST   /timer/pause   - Pause the timer");
    info!("  POST   /timer/resume  - Resume a paused timer");
    info!("  POST   /timer/reset   - Reset to a full interval");
    info!("  GET    /timer/state   - Current countdown");
    info!("  GET    /schedule      - Read the daily window");
    info!("  POST   /schedule      - Save the daily window");
    info!("  DELETE /schedule      - Clear the daily window");
    info!("  POST   /message       - Send a {{\"type\": ...}} command");
    info!("  GET    /events        - Server-sent timer events");
    info!("  GET    /status        - Daemon status");
    info!("  GET    /health        - Health check");

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

    info!("Server shutdown complete");
    Ok(())
}

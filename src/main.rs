//! Application entry point for EchoVerse.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime (multi-thread, 1 worker).
//! 4. Build the HTTP backend and the shared session state.
//! 5. Create the command and event channels.
//! 6. Spawn the [`WorkflowOrchestrator`] on the runtime.
//! 7. Run [`eframe::run_native`], which blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use anyhow::Context;
use eframe::egui;
use echoverse::{
    app::EchoVerseApp,
    config::AppConfig,
    service::HttpBackend,
    workflow::{new_shared_state, Workflow, WorkflowCommand, WorkflowEvent, WorkflowOrchestrator},
};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title("EchoVerse")
        .with_inner_size([width, height])
        .with_min_inner_size([640.0, 480.0])
        .with_drag_and_drop(true);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("EchoVerse starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (requests are I/O bound; one worker is plenty)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Backend + state
    let backend = Arc::new(HttpBackend::from_config(&config.service));
    log::info!("EchoVerse backend at {}", backend.base_url());
    let state = new_shared_state(&config);
    let workflow = Workflow::with_backend(state.clone(), backend);

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<WorkflowCommand>(16);
    let (event_tx, event_rx) = mpsc::channel::<WorkflowEvent>(4);

    // 6. Orchestrator
    let orchestrator = WorkflowOrchestrator::new(workflow, config.download.clone(), event_tx);
    rt.spawn(orchestrator.run(command_rx));

    // 7. Build the egui app and run it (blocks until the window is closed)
    let options = native_options(&config);
    let app = EchoVerseApp::new(state, command_tx, event_rx, config);

    eframe::run_native("EchoVerse", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))?;

    rt.shutdown_timeout(std::time::Duration::from_secs(2));
    log::info!("EchoVerse shut down");
    Ok(())
}

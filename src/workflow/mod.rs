//! Request/response state machine for the EchoVerse client.
//!
//! This module wires the two backend calls to the session stores and exposes
//! the shared state the UI reads every frame.
//!
//! # Architecture
//!
//! ```text
//! WorkflowCommand (mpsc, from the egui thread)
//!        │
//!        ▼
//! WorkflowOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ OpenFile(path)  → Workflow::open_file (.txt or PDF)
//!        ├─ IngestPdf(file) → Workflow::ingest    [UploadingPdf]
//!        ├─ LoadText{..}    → Workflow::load_text
//!        ├─ Generate        → Workflow::generate  [Generating]
//!        ├─ Download        → Workflow::download
//!        └─ LoadAudio       → Workflow::load_audio ─▶ WorkflowEvent
//!
//! SharedState (Arc<Mutex<AppState>>) ←─── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use echoverse::config::AppConfig;
//! use echoverse::service::HttpBackend;
//! use echoverse::workflow::{lock_state, new_shared_state, Workflow};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let state = new_shared_state(&config);
//!     let backend = Arc::new(HttpBackend::from_config(&config.service));
//!     let workflow = Workflow::with_backend(state.clone(), backend);
//!
//!     lock_state(&state).input.set_text("The storm approached.");
//!     if let Ok(result) = workflow.generate().await {
//!         println!("{} → {}", result.rewritten_text, result.audio_reference);
//!     }
//! }
//! ```

mod generate;
mod ingest;
mod open;
pub mod runner;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{Workflow, WorkflowCommand, WorkflowError, WorkflowEvent, WorkflowOrchestrator};
pub use state::{
    lock_state, new_shared_state, AppState, Notice, NoticeKind, SharedState, UiPhase,
};

//! UI phase and shared application state.
//!
//! [`UiPhase`] is the single busy flag gating both controllers.  The UI reads
//! it via [`SharedState`] to disable conflicting actions.
//!
//! [`AppState`] is the single source of truth for everything the UI needs:
//! the phase, the input and output stores, and the pending notice.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>`; cheap to clone
//! and safe to share across threads.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::config::AppConfig;
use crate::session::{InputStore, OutputStore};

// ---------------------------------------------------------------------------
// UiPhase
// ---------------------------------------------------------------------------

/// Which request, if any, is outstanding.
///
/// ```text
/// Idle ──ingest()───▶ UploadingPdf ──success/failure──▶ Idle
/// Idle ──generate()─▶ Generating   ──success/failure──▶ Idle
/// ```
///
/// No other transitions exist; a busy phase rejects both entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiPhase {
    #[default]
    Idle,
    /// A PDF is with the extraction service.
    UploadingPdf,
    /// A generation request is with the rewrite/synthesis service.
    Generating,
}

impl UiPhase {
    /// Returns `true` while a request is outstanding.
    ///
    /// ```
    /// use echoverse::workflow::UiPhase;
    ///
    /// assert!(!UiPhase::Idle.is_busy());
    /// assert!(UiPhase::UploadingPdf.is_busy());
    /// assert!(UiPhase::Generating.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, UiPhase::Idle)
    }

    /// A short human-readable label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            UiPhase::Idle => "Idle",
            UiPhase::UploadingPdf => "Extracting PDF text",
            UiPhase::Generating => "Generating audiobook",
        }
    }
}

impl fmt::Display for UiPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-visible notification.  Only the latest one is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub posted_at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            posted_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            posted_at: Instant::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state.
///
/// Held behind [`SharedState`].  The workflow mutates it; the egui update
/// loop reads it each frame and routes edits through the store setters.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The busy flag gating ingestion and generation.
    pub phase: UiPhase,
    pub input: InputStore,
    pub output: OutputStore,
    /// Latest notification, cleared when the user dismisses it.
    pub notice: Option<Notice>,
}

impl AppState {
    /// Fresh session state with the configured default tone and voice.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            input: InputStore::new(config.defaults.tone, config.defaults.voice),
            ..Self::default()
        }
    }

    /// The submit action is enabled.
    pub fn is_ready(&self) -> bool {
        self.input.is_ready(self.phase)
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Lock with [`lock_state`] for a short critical section; do **not** hold the
/// guard across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] for a fresh session.
pub fn new_shared_state(config: &AppConfig) -> SharedState {
    Arc::new(Mutex::new(AppState::new(config)))
}

/// Lock the state, recovering the data if a previous holder panicked.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Tone, Voice};

    #[test]
    fn idle_is_not_busy() {
        assert!(!UiPhase::Idle.is_busy());
    }

    #[test]
    fn uploading_and_generating_are_busy() {
        assert!(UiPhase::UploadingPdf.is_busy());
        assert!(UiPhase::Generating.is_busy());
    }

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(UiPhase::default(), UiPhase::Idle);
    }

    #[test]
    fn labels() {
        assert_eq!(UiPhase::Idle.label(), "Idle");
        assert_eq!(UiPhase::UploadingPdf.to_string(), "Extracting PDF text");
        assert_eq!(UiPhase::Generating.to_string(), "Generating audiobook");
    }

    #[test]
    fn new_state_uses_configured_defaults() {
        let mut config = AppConfig::default();
        config.defaults.tone = Tone::Inspiring;
        config.defaults.voice = Voice::Lisa;

        let state = AppState::new(&config);
        assert_eq!(state.phase, UiPhase::Idle);
        assert_eq!(state.input.tone(), Tone::Inspiring);
        assert_eq!(state.input.voice(), Voice::Lisa);
        assert_eq!(state.input.text(), "");
        assert!(state.output.result().is_none());
        assert!(state.notice.is_none());
        assert!(!state.is_ready());
    }

    #[test]
    fn ready_tracks_text_and_phase() {
        let mut state = AppState::default();
        state.input.set_text("Call me Ishmael.");
        assert!(state.is_ready());

        state.phase = UiPhase::UploadingPdf;
        assert!(!state.is_ready());
    }

    #[test]
    fn notices_and_dismissal() {
        let mut state = AppState::default();
        state.notice = Some(Notice::error("boom"));
        assert!(state.notice.as_ref().is_some_and(Notice::is_error));

        state.dismiss_notice();
        assert!(state.notice.is_none());
        assert!(!Notice::success("ok").is_error());
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state(&AppConfig::default());
        let state2 = Arc::clone(&state);

        lock_state(&state).phase = UiPhase::Generating;
        assert_eq!(lock_state(&state2).phase, UiPhase::Generating);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let state = new_shared_state(&AppConfig::default());
        let poisoner = Arc::clone(&state);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(state.is_poisoned());
        assert_eq!(lock_state(&state).phase, UiPhase::Idle);
    }
}

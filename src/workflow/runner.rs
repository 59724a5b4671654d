//! Workflow controllers and the command loop that drives them.
//!
//! [`Workflow`] owns the [`SharedState`] and the three service handles.  The
//! ingestion and generation controllers live in `ingest.rs` / `generate.rs`
//! as further `impl Workflow` blocks; this file holds the shared busy-flag
//! guard, the download / playback fetches and [`WorkflowOrchestrator`].
//!
//! # Command flow
//!
//! ```text
//! WorkflowCommand::OpenFile(path)
//!   └─▶ spawn Workflow::open_file   (.txt → load_text, else ingest)
//! WorkflowCommand::IngestPdf(file)
//!   └─▶ spawn Workflow::ingest      [UploadingPdf → Idle]
//! WorkflowCommand::LoadText { .. }
//!   └─▶ spawn Workflow::load_text   (phase untouched)
//! WorkflowCommand::Generate
//!   └─▶ spawn Workflow::generate    [Generating → Idle]
//! WorkflowCommand::Download
//!   └─▶ spawn Workflow::download    (phase untouched)
//! WorkflowCommand::LoadAudio
//!   └─▶ spawn Workflow::load_audio  ─▶ WorkflowEvent::AudioReady
//! ```
//!
//! Every command runs in its own task so the loop keeps receiving while a
//! request is outstanding; a conflicting command is rejected by the busy
//! guard instead of queueing behind it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::DownloadConfig;
use crate::service::{AudioSource, ExtractionService, GenerationService, HttpBackend, ServiceError};
use crate::session::PdfFile;

use super::state::{lock_state, Notice, SharedState, UiPhase};

// ---------------------------------------------------------------------------
// WorkflowError
// ---------------------------------------------------------------------------

/// Why a controller call did not complete.
///
/// `Busy` and `EmptyText` are local rejections: no request was sent and no
/// notice is posted.  Everything else has already been reported to the user
/// and rolled back by the time it is returned.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("another request is outstanding ({0})")]
    Busy(UiPhase),

    #[error("there is no text to narrate")]
    EmptyText,

    #[error("no audiobook has been generated yet")]
    NoAudio,

    #[error("{0} is not UTF-8 text")]
    NotText(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkflowError {
    /// Local rejection: nothing was sent.
    pub fn is_rejection(&self) -> bool {
        matches!(self, WorkflowError::Busy(_) | WorkflowError::EmptyText)
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Shared handle to the session state and the backend services.
///
/// Cheap to clone; every clone drives the same state.
#[derive(Clone)]
pub struct Workflow {
    pub(super) state: SharedState,
    pub(super) extractor: Arc<dyn ExtractionService>,
    pub(super) generator: Arc<dyn GenerationService>,
    pub(super) audio: Arc<dyn AudioSource>,
    /// Origin that relative `audio_url`s are resolved against.
    pub(super) base_url: String,
}

impl Workflow {
    pub fn new(
        state: SharedState,
        extractor: Arc<dyn ExtractionService>,
        generator: Arc<dyn GenerationService>,
        audio: Arc<dyn AudioSource>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            state,
            extractor,
            generator,
            audio,
            base_url: base_url.into(),
        }
    }

    /// Wire every service to one [`HttpBackend`].
    pub fn with_backend(state: SharedState, backend: Arc<HttpBackend>) -> Self {
        let base_url = backend.base_url().to_string();
        Self::new(
            state,
            backend.clone(),
            backend.clone(),
            backend,
            base_url,
        )
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Move `Idle → phase`, or reject if a request is already outstanding.
    ///
    /// Check and set happen under one lock, so two callers can never both
    /// succeed.
    pub(super) fn claim(&self, phase: UiPhase) -> Result<(), WorkflowError> {
        let mut st = lock_state(&self.state);
        if st.phase.is_busy() {
            log::debug!("workflow: {phase} rejected, {} in progress", st.phase);
            return Err(WorkflowError::Busy(st.phase));
        }
        log::debug!("workflow: Idle → {phase}");
        st.phase = phase;
        Ok(())
    }

    /// Current non-empty audio reference.
    fn audio_reference(&self) -> Result<String, WorkflowError> {
        lock_state(&self.state)
            .output
            .audio_reference()
            .map(str::to_string)
            .ok_or(WorkflowError::NoAudio)
    }

    // -----------------------------------------------------------------------
    // Download / playback
    // -----------------------------------------------------------------------

    /// Save the current audiobook to `target`.
    ///
    /// An existing file is never overwritten: the name gets a ` (1)`,
    /// ` (2)`, … suffix instead.  Does not touch the UI phase.  Returns the
    /// path actually written.
    pub async fn download(&self, target: &Path) -> Result<PathBuf, WorkflowError> {
        let url = self.audio_reference()?;

        match self.save(&url, target).await {
            Ok(saved) => {
                log::info!("download: saved {url} to {}", saved.display());
                lock_state(&self.state).notice = Some(Notice::success(format!(
                    "Saved audiobook to {}",
                    saved.display()
                )));
                Ok(saved)
            }
            Err(e) => {
                log::warn!("download: {url} → {} failed: {e}", target.display());
                Err(e)
            }
        }
    }

    async fn save(&self, url: &str, target: &Path) -> Result<PathBuf, WorkflowError> {
        let bytes = self.audio.fetch_audio(url).await?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        for n in 0..=MAX_NAME_SUFFIX {
            let candidate = numbered_path(target, n);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(&bytes).await?;
                    file.flush().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("too many copies of {}", target.display()),
        )
        .into())
    }

    /// Fetch the current audiobook for the inline player.
    pub async fn load_audio(&self) -> Result<(String, Vec<u8>), WorkflowError> {
        let url = self.audio_reference()?;

        match self.audio.fetch_audio(&url).await {
            Ok(bytes) => {
                log::debug!("player: fetched {} bytes from {url}", bytes.len());
                Ok((url, bytes))
            }
            Err(e) => {
                log::warn!("player: fetching {url} failed: {e}");
                lock_state(&self.state).notice =
                    Some(Notice::error("Could not load the audiobook for playback"));
                Err(e.into())
            }
        }
    }
}

const MAX_NAME_SUFFIX: u32 = 999;

/// `book.mp3` for `n == 0`, then `book (1).mp3`, `book (2).mp3`, …
fn numbered_path(target: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return target.to_path_buf();
    }
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    };
    target.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Commands / events
// ---------------------------------------------------------------------------

/// Actions sent from the UI thread to the orchestrator.
#[derive(Debug, Clone)]
pub enum WorkflowCommand {
    /// Read a `.pdf` or `.txt` from disk off the UI thread.
    OpenFile(PathBuf),
    IngestPdf(PdfFile),
    /// A text file already in memory (dropped onto the window).
    LoadText { file_name: String, bytes: Vec<u8> },
    Generate,
    Download,
    /// Fetch the current audio so the UI can play it.
    LoadAudio,
}

/// Results the orchestrator hands back to the UI thread.
///
/// Everything else travels through [`SharedState`]; only audio bytes, which
/// the UI-owned output device consumes, use this channel.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    AudioReady { url: String, bytes: Vec<u8> },
    /// The fetch failed; the error notice is already posted.
    AudioFailed,
}

// ---------------------------------------------------------------------------
// WorkflowOrchestrator
// ---------------------------------------------------------------------------

/// Receives [`WorkflowCommand`]s and runs each on its own task.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use echoverse::config::AppConfig;
/// use echoverse::service::HttpBackend;
/// use echoverse::workflow::{new_shared_state, Workflow, WorkflowCommand, WorkflowOrchestrator};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let state = new_shared_state(&config);
/// let backend = Arc::new(HttpBackend::from_config(&config.service));
/// let workflow = Workflow::with_backend(state, backend);
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
/// let (event_tx, _event_rx) = tokio::sync::mpsc::channel(4);
/// let orchestrator = WorkflowOrchestrator::new(workflow, config.download.clone(), event_tx);
/// tokio::spawn(orchestrator.run(command_rx));
///
/// command_tx.send(WorkflowCommand::Generate).await.unwrap();
/// # }
/// ```
pub struct WorkflowOrchestrator {
    workflow: Workflow,
    download: DownloadConfig,
    event_tx: mpsc::Sender<WorkflowEvent>,
}

impl WorkflowOrchestrator {
    pub fn new(
        workflow: Workflow,
        download: DownloadConfig,
        event_tx: mpsc::Sender<WorkflowEvent>,
    ) -> Self {
        Self {
            workflow,
            download,
            event_tx,
        }
    }

    /// Run until `command_rx` is closed, then wait for in-flight tasks.
    pub async fn run(self, mut command_rx: mpsc::Receiver<WorkflowCommand>) {
        let mut tasks = JoinSet::new();

        while let Some(command) = command_rx.recv().await {
            while tasks.try_join_next().is_some() {}

            let workflow = self.workflow.clone();
            match command {
                WorkflowCommand::OpenFile(path) => {
                    tasks.spawn(async move {
                        report("open", workflow.open_file(&path).await);
                    });
                }
                WorkflowCommand::IngestPdf(file) => {
                    tasks.spawn(async move {
                        report("ingest", workflow.ingest(file).await);
                    });
                }
                WorkflowCommand::LoadText { file_name, bytes } => {
                    tasks.spawn(async move {
                        report("load text", workflow.load_text(file_name, bytes));
                    });
                }
                WorkflowCommand::Generate => {
                    tasks.spawn(async move {
                        report("generate", workflow.generate().await);
                    });
                }
                WorkflowCommand::Download => {
                    let target = self.download.target_path();
                    tasks.spawn(async move {
                        report("download", workflow.download(&target).await);
                    });
                }
                WorkflowCommand::LoadAudio => {
                    let event_tx = self.event_tx.clone();
                    tasks.spawn(async move {
                        let event = match workflow.load_audio().await {
                            Ok((url, bytes)) => WorkflowEvent::AudioReady { url, bytes },
                            Err(_) => WorkflowEvent::AudioFailed,
                        };
                        let _ = event_tx.send(event).await;
                    });
                }
            }
        }

        while tasks.join_next().await.is_some() {}
        log::info!("workflow: command channel closed, orchestrator shutting down");
    }
}

/// Errors are already on screen by the time a task ends; only log them.
fn report<T>(what: &str, result: Result<T, WorkflowError>) {
    match result {
        Ok(_) => {}
        Err(e) if e.is_rejection() => log::info!("workflow: {what} ignored: {e}"),
        Err(e) => log::debug!("workflow: {what} finished with error: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

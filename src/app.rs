//! EchoVerse window: the egui/eframe application.
//!
//! # Architecture
//!
//! [`EchoVerseApp`] is the top-level [`eframe::App`].  Each frame it:
//!
//! 1. drains [`WorkflowEvent`]s (fetched audio for the player),
//! 2. takes a snapshot of [`SharedState`] and renders it,
//! 3. turns user gestures into [`UiAction`]s and applies them: store edits go
//!    straight through the setters, everything that talks to the backend is
//!    sent to the orchestrator as a [`WorkflowCommand`].
//!
//! The submit and upload affordances are disabled while [`UiPhase`] is busy;
//! the workflow's own guard rejects anything that slips through.
//!
//! # Layout
//!
//! | Area | Content |
//! |------|---------|
//! | Top | Title, phase indicator, current notice |
//! | Left | PDF picker, text, tone, voice, submit, player + download |
//! | Centre | Original vs. tone-adapted text once a result exists |

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::player::AudioPlayer;
use crate::session::{is_text_file, PdfFile, Tone, Voice};
use crate::workflow::{
    lock_state, AppState, Notice, NoticeKind, SharedState, UiPhase, WorkflowCommand,
    WorkflowEvent,
};

// ---------------------------------------------------------------------------
// UiAction
// ---------------------------------------------------------------------------

/// A user gesture collected while rendering, applied after the frame's
/// widgets are laid out.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SetText(String),
    SetTone(Tone),
    SetVoice(Voice),
    /// Open the `.pdf` or `.txt` at the typed (or dropped) path.
    OpenFile(PathBuf),
    /// A file dropped onto the window with its contents already in memory.
    DropFile(PdfFile),
    Generate,
    Download,
    Play,
    Pause,
    Stop,
    DismissNotice,
}

// ---------------------------------------------------------------------------
// EchoVerseApp
// ---------------------------------------------------------------------------

pub struct EchoVerseApp {
    state: SharedState,
    command_tx: mpsc::Sender<WorkflowCommand>,
    event_rx: mpsc::Receiver<WorkflowEvent>,
    config: AppConfig,
    player: AudioPlayer,

    /// Contents of the PDF path field.
    pdf_path: String,
    /// A `LoadAudio` command is outstanding.
    audio_pending: bool,
    /// Spinner animation phase (increases each frame).
    spinner_phase: f32,
}

impl EchoVerseApp {
    /// * `state`      — shared session state, also driven by the workflow.
    /// * `command_tx` — sender end of the workflow command channel.
    /// * `event_rx`   — receiver end of the workflow event channel.
    /// * `config`     — loaded application configuration.
    pub fn new(
        state: SharedState,
        command_tx: mpsc::Sender<WorkflowCommand>,
        event_rx: mpsc::Receiver<WorkflowEvent>,
        config: AppConfig,
    ) -> Self {
        Self {
            state,
            command_tx,
            event_rx,
            config,
            player: AudioPlayer::new(),
            pdf_path: String::new(),
            audio_pending: false,
            spinner_phase: 0.0,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending workflow events (non-blocking).
    fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                WorkflowEvent::AudioReady { url, bytes } => {
                    self.audio_pending = false;
                    let current = lock_state(&self.state)
                        .output
                        .audio_reference()
                        .map(str::to_string);
                    if current.as_deref() != Some(url.as_str()) {
                        log::debug!("player: dropping stale clip {url}");
                        continue;
                    }
                    if let Err(e) = self.player.play(&url, bytes) {
                        log::warn!("player: {e}");
                        lock_state(&self.state).notice = Some(Notice::error(e.to_string()));
                    }
                }
                WorkflowEvent::AudioFailed => self.audio_pending = false,
            }
        }
    }

    /// Collect files dropped onto the window.  Only the first one is used.
    fn take_dropped_file(&self, ctx: &egui::Context) -> Option<UiAction> {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned())?;

        let file = if let Some(bytes) = dropped.bytes {
            PdfFile::new(dropped.name, bytes.to_vec())
        } else if let Some(path) = dropped.path {
            return Some(UiAction::OpenFile(path));
        } else {
            return None;
        };
        Some(UiAction::DropFile(file))
    }

    fn send(&self, command: WorkflowCommand) {
        if let Err(e) = self.command_tx.try_send(command) {
            log::error!("workflow command not delivered: {e}");
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn apply(&mut self, action: UiAction, snapshot: &AppState) {
        match action {
            UiAction::SetText(text) => lock_state(&self.state).input.set_text(text),
            UiAction::SetTone(tone) => lock_state(&self.state).input.set_tone(tone),
            UiAction::SetVoice(voice) => lock_state(&self.state).input.set_voice(voice),
            UiAction::OpenFile(path) => {
                if self.idle_for_upload(&path.display().to_string(), snapshot) {
                    self.send(WorkflowCommand::OpenFile(path));
                }
            }
            UiAction::DropFile(file) => {
                if !self.idle_for_upload(&file.file_name, snapshot) {
                    return;
                }
                if is_text_file(&file.file_name) {
                    self.send(WorkflowCommand::LoadText {
                        file_name: file.file_name,
                        bytes: file.bytes,
                    });
                } else {
                    self.send(WorkflowCommand::IngestPdf(file));
                }
            }
            UiAction::Generate => {
                if snapshot.is_ready() {
                    self.send(WorkflowCommand::Generate);
                }
            }
            UiAction::Download => self.send(WorkflowCommand::Download),
            UiAction::Play => {
                let current = snapshot.output.audio_reference();
                if self.player.is_paused() && current.is_some() && current == self.player.loaded_url() {
                    self.player.resume();
                } else if !self.audio_pending {
                    self.audio_pending = true;
                    self.send(WorkflowCommand::LoadAudio);
                }
            }
            UiAction::Pause => self.player.pause(),
            UiAction::Stop => self.player.stop(),
            UiAction::DismissNotice => lock_state(&self.state).dismiss_notice(),
        }
    }

    /// File loads are refused while a request is outstanding.
    fn idle_for_upload(&self, what: &str, snapshot: &AppState) -> bool {
        if snapshot.phase.is_busy() {
            log::debug!("ui: ignoring {what:?}, {} in progress", snapshot.phase);
            return false;
        }
        true
    }

    /// Stop the player when its clip has ended or the result it was playing
    /// has been replaced.
    fn sync_player(&mut self, snapshot: &AppState) {
        if let Some(loaded) = self.player.loaded_url() {
            if self.player.is_finished() || snapshot.output.audio_reference() != Some(loaded) {
                self.player.stop();
            }
        }
    }

    /// Clear a success notice once it has been visible long enough.
    fn expire_notice(&self, snapshot: &AppState) {
        let Some(notice) = &snapshot.notice else {
            return;
        };
        if notice.kind != NoticeKind::Success
            || notice.posted_at.elapsed() < Duration::from_secs(self.config.ui.notice_secs)
        {
            return;
        }
        let mut st = lock_state(&self.state);
        if st.notice.as_ref().is_some_and(|n| n.posted_at == notice.posted_at) {
            st.dismiss_notice();
        }
    }

    /// Persist the current tone and voice as next session's defaults.
    fn save_selection(&mut self) {
        let (tone, voice) = {
            let st = lock_state(&self.state);
            (st.input.tone(), st.input.voice())
        };
        if !self.config.remember_selection(tone, voice) {
            return;
        }
        match self.config.save() {
            Ok(()) => log::info!("Saved tone={tone}, voice={voice} as defaults"),
            Err(e) => log::warn!("Failed to save config: {e}"),
        }
    }

    // ── Panel renderers ──────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui, snapshot: &AppState, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.heading("EchoVerse");
            ui.label(
                egui::RichText::new("AI-Powered Audiobook Creation")
                    .color(egui::Color32::from_rgb(150, 150, 150)),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if snapshot.phase.is_busy() {
                    format!("{} {}...", self.spinner_char(), snapshot.phase.label())
                } else {
                    snapshot.phase.label().to_string()
                };
                ui.label(egui::RichText::new(label).color(phase_color(snapshot.phase)));
            });
        });

        if let Some(notice) = &snapshot.notice {
            let color = match notice.kind {
                NoticeKind::Success => egui::Color32::from_rgb(80, 200, 120),
                NoticeKind::Error => egui::Color32::from_rgb(255, 136, 68),
            };
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(notice.message.as_str()).color(color));
                if ui.small_button("Dismiss").clicked() {
                    actions.push(UiAction::DismissNotice);
                }
            });
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui, snapshot: &AppState, actions: &mut Vec<UiAction>) {
        let busy = snapshot.phase.is_busy();

        // File picker
        ui.label("Upload a PDF or .txt file:");
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.pdf_path)
                    .hint_text("/path/to/book.pdf")
                    .desired_width(220.0),
            );
            let can_load = !busy && !self.pdf_path.trim().is_empty();
            if ui.add_enabled(can_load, egui::Button::new("Load")).clicked() {
                actions.push(UiAction::OpenFile(PathBuf::from(self.pdf_path.trim())));
            }
        });
        match snapshot.input.source_file() {
            Some(name) => {
                let kind = if snapshot.input.pdf_text().is_some() {
                    "PDF"
                } else {
                    "Text file"
                };
                ui.label(
                    egui::RichText::new(format!("✓ {kind} loaded ({name})"))
                        .color(egui::Color32::from_rgb(80, 200, 120)),
                );
            }
            None => {
                ui.label(
                    egui::RichText::new("…or drop a file onto the window")
                        .color(egui::Color32::from_rgb(130, 130, 130))
                        .italics(),
                );
            }
        }

        ui.add_space(8.0);

        // Text
        ui.label("Or paste your text:");
        let mut text = snapshot.input.text().to_string();
        let response = ui.add(
            egui::TextEdit::multiline(&mut text)
                .hint_text("Paste your text here or upload a PDF above...")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            actions.push(UiAction::SetText(text));
        }

        ui.add_space(8.0);

        // Tone / voice
        let mut tone = snapshot.input.tone();
        egui::ComboBox::from_label("Tone")
            .selected_text(tone.label())
            .show_ui(ui, |ui| {
                for option in Tone::ALL {
                    ui.selectable_value(&mut tone, option, option.label());
                }
            });
        if tone != snapshot.input.tone() {
            actions.push(UiAction::SetTone(tone));
        }

        let mut voice = snapshot.input.voice();
        egui::ComboBox::from_label("Voice")
            .selected_text(voice.label())
            .show_ui(ui, |ui| {
                for option in Voice::ALL {
                    ui.selectable_value(&mut voice, option, option.label());
                }
            });
        if voice != snapshot.input.voice() {
            actions.push(UiAction::SetVoice(voice));
        }

        ui.add_space(8.0);

        // Submit
        let submit_label = if snapshot.phase == UiPhase::Generating {
            "Generating..."
        } else {
            "Generate Audiobook"
        };
        if ui
            .add_enabled(snapshot.is_ready(), egui::Button::new(submit_label))
            .clicked()
        {
            actions.push(UiAction::Generate);
        }

        // Player + download
        if let Some(url) = snapshot.output.audio_reference() {
            ui.add_space(12.0);
            ui.separator();
            ui.label(
                egui::RichText::new(url)
                    .color(egui::Color32::from_rgb(130, 130, 130))
                    .size(11.0),
            );
            ui.horizontal(|ui| {
                if self.audio_pending {
                    ui.label(format!("{} loading audio", self.spinner_char()));
                } else if self.player.is_playing() {
                    if ui.button("Pause").clicked() {
                        actions.push(UiAction::Pause);
                    }
                } else if ui.button("Play").clicked() {
                    actions.push(UiAction::Play);
                }
                if ui
                    .add_enabled(self.player.loaded_url().is_some(), egui::Button::new("Stop"))
                    .clicked()
                {
                    actions.push(UiAction::Stop);
                }
                if ui.button("Download MP3").clicked() {
                    actions.push(UiAction::Download);
                }
            });
        }
    }

    fn draw_comparison(&self, ui: &mut egui::Ui, snapshot: &AppState) {
        if !snapshot.output.comparison_visible() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new(
                        "Your generated audiobook will appear here. Paste some text and click 'Generate Audiobook' to get started.",
                    )
                    .color(egui::Color32::from_rgb(120, 120, 120)),
                );
            });
            return;
        }

        ui.heading("Text Comparison");
        ui.columns(2, |columns| {
            columns[0].strong("Original Text");
            egui::ScrollArea::vertical()
                .id_salt("original")
                .show(&mut columns[0], |ui| {
                    ui.label(snapshot.output.source_text().unwrap_or_default());
                });

            columns[1].strong("Tone-Adapted Text");
            egui::ScrollArea::vertical()
                .id_salt("rewritten")
                .show(&mut columns[1], |ui| {
                    ui.label(snapshot.output.rewritten_text().unwrap_or_default());
                });
        });
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// A simple rotating ASCII spinner character driven by `spinner_phase`.
    fn spinner_char(&self) -> char {
        let chars = ['|', '/', '-', '\\'];
        let idx = (self.spinner_phase as usize) % chars.len();
        chars[idx]
    }
}

fn phase_color(phase: UiPhase) -> egui::Color32 {
    match phase {
        UiPhase::Idle => egui::Color32::from_rgb(100, 100, 100),
        UiPhase::UploadingPdf | UiPhase::Generating => egui::Color32::from_rgb(68, 136, 255),
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for EchoVerseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Poll non-blocking channels ------------------------------------
        self.poll_events();

        let snapshot = lock_state(&self.state).clone();
        self.sync_player(&snapshot);
        self.expire_notice(&snapshot);

        // --- Advance spinner animation -------------------------------------
        self.spinner_phase += 0.08;
        if self.spinner_phase >= 4.0 {
            self.spinner_phase = 0.0;
        }

        // --- Schedule repaints while something is in flight ---------------
        if snapshot.phase.is_busy() || self.audio_pending {
            ctx.request_repaint_after(Duration::from_millis(66));
        } else if self.player.is_playing() || snapshot.notice.is_some() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        let mut actions = Vec::new();
        actions.extend(self.take_dropped_file(ctx));

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.draw_header(ui, &snapshot, &mut actions);
        });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_controls(ui, &snapshot, &mut actions);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_comparison(ui, &snapshot);
        });

        for action in actions {
            self.apply(action, &snapshot);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.player.stop();
        self.save_selection();
        log::info!("EchoVerse window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

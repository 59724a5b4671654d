//! Input and output stores plus the request/result value types.
//!
//! [`InputStore`] holds what the user is editing; [`OutputStore`] holds the
//! last successful generation.  Neither type knows about the network: the
//! workflow controllers are the only writers besides the plain setters.

use crate::session::catalog::{Tone, Voice};
use crate::workflow::UiPhase;

// ---------------------------------------------------------------------------
// PdfFile
// ---------------------------------------------------------------------------

/// A user-selected document, handed to the extraction service unchanged.
///
/// No MIME or content check is made locally; the service is the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its final path component as the
    /// upload name.
    pub async fn read(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// `true` for names ending in `.txt` (any case).  Such files are loaded
/// locally instead of going to the extraction service.
pub fn is_text_file(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

// ---------------------------------------------------------------------------
// GenerationRequest / GenerationResult
// ---------------------------------------------------------------------------

/// Immutable snapshot of the input taken when generation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
    pub tone: Tone,
    pub voice: Voice,
}

/// Payload of a successful generation.  Both fields are always set together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub rewritten_text: String,
    /// Absolute, fetchable location of the synthesized audio.
    pub audio_reference: String,
}

// ---------------------------------------------------------------------------
// InputStore
// ---------------------------------------------------------------------------

/// The session's editable input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputStore {
    text: String,
    tone: Tone,
    voice: Voice,
    /// Text of the most recently extracted PDF.
    pdf_text: Option<String>,
    /// File name of the most recently loaded PDF or text file.
    source_file: Option<String>,
}

impl InputStore {
    pub fn new(tone: Tone, voice: Voice) -> Self {
        Self {
            tone,
            voice,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    pub fn pdf_text(&self) -> Option<&str> {
        self.pdf_text.as_deref()
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn set_voice(&mut self, voice: Voice) {
        self.voice = voice;
    }

    /// `true` when the trimmed text is non-empty.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Generation may start: there is text and nothing is outstanding.
    pub fn is_ready(&self, phase: UiPhase) -> bool {
        self.has_text() && !phase.is_busy()
    }

    /// Snapshot the fields sent to the generation service.
    pub fn snapshot(&self) -> GenerationRequest {
        GenerationRequest {
            text: self.text.clone(),
            tone: self.tone,
            voice: self.voice,
        }
    }

    /// Replace the live text with freshly extracted PDF text.  Anything the
    /// user typed before is discarded.
    pub(crate) fn apply_extraction(&mut self, file_name: String, extracted: String) {
        self.text = extracted.clone();
        self.pdf_text = Some(extracted);
        self.source_file = Some(file_name);
    }

    /// Replace the live text with the contents of a local text file.
    pub(crate) fn apply_text_file(&mut self, file_name: String, text: String) {
        self.text = text;
        self.pdf_text = None;
        self.source_file = Some(file_name);
    }
}

// ---------------------------------------------------------------------------
// OutputStore
// ---------------------------------------------------------------------------

/// The last successful generation and the text it was produced from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputStore {
    result: Option<GenerationResult>,
    source_text: Option<String>,
    comparison_visible: bool,
}

impl OutputStore {
    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn rewritten_text(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.rewritten_text.as_str())
    }

    /// Non-empty audio reference, if a result exists.
    pub fn audio_reference(&self) -> Option<&str> {
        self.result
            .as_ref()
            .map(|r| r.audio_reference.as_str())
            .filter(|url| !url.is_empty())
    }

    /// Text the current result was generated from.
    pub fn source_text(&self) -> Option<&str> {
        self.source_text.as_deref()
    }

    pub fn comparison_visible(&self) -> bool {
        self.comparison_visible
    }

    /// Replace the previous result in one step.
    pub(crate) fn publish(&mut self, request: &GenerationRequest, result: GenerationResult) {
        self.result = Some(result);
        self.source_text = Some(request.text.clone());
        self.comparison_visible = true;
    }
}

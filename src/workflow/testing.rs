//! Test doubles for the three service traits and a ready-wired [`Workflow`].

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::service::{AudioSource, ExtractionService, GenerationResponse, GenerationService, ServiceError};
use crate::session::{GenerationRequest, GenerationResult, PdfFile};

use super::runner::Workflow;
use super::state::{lock_state, new_shared_state};

pub const BASE_URL: &str = "http://localhost:5000";

async fn pause(delay_ms: &AtomicU64) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

pub struct MockExtractor {
    text: Mutex<String>,
    failure: Mutex<Option<ServiceError>>,
    calls: AtomicUsize,
    delay_ms: AtomicU64,
}

impl MockExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay_ms: AtomicU64::new(0),
        }
    }

    pub fn fail_next(&self, err: ServiceError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionService for MockExtractor {
    async fn extract_text(&self, _file: &PdfFile) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(&self.delay_ms).await;
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.text.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

pub struct MockGenerator {
    response: Mutex<GenerationResponse>,
    failure: Mutex<Option<ServiceError>>,
    last_request: Mutex<Option<GenerationRequest>>,
    calls: AtomicUsize,
    delay_ms: AtomicU64,
}

impl MockGenerator {
    pub fn new(rewritten_text: &str, audio_url: &str) -> Self {
        Self {
            response: Mutex::new(GenerationResponse {
                rewritten_text: rewritten_text.to_string(),
                audio_url: audio_url.to_string(),
            }),
            failure: Mutex::new(None),
            last_request: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay_ms: AtomicU64::new(0),
        }
    }

    pub fn respond_with(&self, rewritten_text: &str, audio_url: &str) {
        *self.response.lock().unwrap() = GenerationResponse {
            rewritten_text: rewritten_text.to_string(),
            audio_url: audio_url.to_string(),
        };
    }

    pub fn fail_next(&self, err: ServiceError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for MockGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        pause(&self.delay_ms).await;
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.response.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// MockAudio
// ---------------------------------------------------------------------------

pub struct MockAudio {
    fail: AtomicBool,
    last_url: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MockAudio {
    pub const BYTES: &'static [u8] = b"ID3\x03\x00fake-mp3";

    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            last_url: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioSource for MockAudio {
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(ServiceError::Status {
                status: 404,
                message: None,
            });
        }
        Ok(Self::BYTES.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub workflow: Workflow,
    pub extractor: Arc<MockExtractor>,
    pub generator: Arc<MockGenerator>,
    pub audio: Arc<MockAudio>,
}

/// A fresh session wired to mocks that succeed by default.
pub fn harness() -> Harness {
    let extractor = Arc::new(MockExtractor::new("Hello world"));
    let generator = Arc::new(MockGenerator::new(
        "A storm loomed, dark and threatening.",
        "/files/abc.mp3",
    ));
    let audio = Arc::new(MockAudio::new());

    let workflow = Workflow::new(
        new_shared_state(&AppConfig::default()),
        extractor.clone(),
        generator.clone(),
        audio.clone(),
        BASE_URL,
    );

    Harness {
        workflow,
        extractor,
        generator,
        audio,
    }
}

/// Put a finished generation into the output store.
pub fn publish_result(workflow: &Workflow, audio_reference: &str) {
    let mut st = lock_state(workflow.state());
    let request = st.input.snapshot();
    st.output.publish(
        &request,
        GenerationResult {
            rewritten_text: "rewritten".into(),
            audio_reference: audio_reference.into(),
        },
    );
}

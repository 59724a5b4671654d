//! Backend service contracts.
//!
//! This module provides:
//! * [`ExtractionService`] — PDF → text (`POST /api/upload-pdf`, multipart).
//! * [`GenerationService`] — text → rewritten text + audio URL
//!   (`POST /api/generate-audiobook`, JSON).
//! * [`AudioSource`] — fetches the synthesized audio bytes.
//! * [`HttpBackend`] — `reqwest` implementation of all three.
//! * [`ServiceError`] — transport, status and decoding failures.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use echoverse::config::AppConfig;
//! use echoverse::service::{ExtractionService, HttpBackend};
//! use echoverse::session::PdfFile;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let backend = HttpBackend::from_config(&config.service);
//!
//!     let file = PdfFile::read("chapter-1.pdf".as_ref()).await.unwrap();
//!     let text = backend.extract_text(&file).await.unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod client;
pub mod wire;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{AudioSource, ExtractionService, GenerationService, HttpBackend, ServiceError};
pub use wire::{resolve_audio_url, GenerationResponse};

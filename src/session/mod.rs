//! Session data model: the tone/voice catalog and the input/output stores.
//!
//! * [`Tone`] / [`Voice`] — the fixed selector catalogs.
//! * [`InputStore`] — text, tone, voice and the last extracted PDF.
//! * [`OutputStore`] — the last [`GenerationResult`] and its source text.
//! * [`GenerationRequest`] — immutable snapshot sent to the generator.
//! * [`PdfFile`] — the blob handed to the extraction service.

pub mod catalog;
pub mod store;

pub use catalog::{CatalogError, Tone, Voice};
pub use store::{
    is_text_file, GenerationRequest, GenerationResult, InputStore, OutputStore, PdfFile,
};

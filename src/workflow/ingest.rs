//! PDF ingestion controller.

use crate::session::PdfFile;

use super::runner::{Workflow, WorkflowError};
use super::state::{lock_state, Notice, UiPhase};

const INGEST_SUCCESS: &str = "PDF text extracted successfully!";
const INGEST_FAILED: &str = "Failed to upload PDF";

impl Workflow {
    /// Send `file` to the extraction service and, on success, replace the
    /// session text with the extracted text.
    ///
    /// Rejected with [`WorkflowError::Busy`] while another request is
    /// outstanding.  On failure the input is left untouched and an error
    /// notice carries the service's message (or a generic one).  Either way
    /// the phase is back to `Idle` when this returns.
    pub async fn ingest(&self, file: PdfFile) -> Result<String, WorkflowError> {
        self.claim(UiPhase::UploadingPdf)?;
        log::info!(
            "ingest: uploading {:?} ({} bytes)",
            file.file_name,
            file.bytes.len()
        );

        let outcome = self.extractor.extract_text(&file).await;

        let mut st = lock_state(&self.state);
        st.phase = UiPhase::Idle;
        match outcome {
            Ok(text) => {
                log::info!(
                    "ingest: extracted {} chars from {:?}",
                    text.chars().count(),
                    file.file_name
                );
                st.input.apply_extraction(file.file_name, text.clone());
                st.notice = Some(Notice::success(INGEST_SUCCESS));
                Ok(text)
            }
            Err(e) => {
                log::warn!("ingest: {:?} failed: {e}", file.file_name);
                let message = e
                    .service_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| INGEST_FAILED.to_string());
                st.notice = Some(Notice::error(message));
                Err(e.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Opening local files: PDFs go to the extraction service, `.txt` files are
//! read straight into the input.

use std::path::Path;

use crate::session::{is_text_file, PdfFile};

use super::runner::{Workflow, WorkflowError};
use super::state::{lock_state, Notice};

const TEXT_LOADED: &str = "Text file loaded successfully!";

impl Workflow {
    /// Read `path` and load it by extension.
    ///
    /// The read happens here, on the runtime, so a large file never stalls
    /// the window.  A read failure posts an error notice and leaves the
    /// session untouched.
    pub async fn open_file(&self, path: &Path) -> Result<(), WorkflowError> {
        let file = match PdfFile::read(path).await {
            Ok(file) => file,
            Err(e) => {
                log::warn!("open: cannot read {}: {e}", path.display());
                lock_state(&self.state).notice = Some(Notice::error(format!(
                    "Could not read {}: {e}",
                    path.display()
                )));
                return Err(e.into());
            }
        };

        if is_text_file(&file.file_name) {
            self.load_text(file.file_name, file.bytes).map(|_| ())
        } else {
            self.ingest(file).await.map(|_| ())
        }
    }

    /// Replace the session text with the contents of a UTF-8 text file.
    ///
    /// No request is sent and the phase is not touched.
    pub fn load_text(&self, file_name: String, bytes: Vec<u8>) -> Result<String, WorkflowError> {
        let mut st = lock_state(&self.state);
        match String::from_utf8(bytes) {
            Ok(text) => {
                log::info!(
                    "open: loaded {} chars from {file_name:?}",
                    text.chars().count()
                );
                st.input.apply_text_file(file_name, text.clone());
                st.notice = Some(Notice::success(TEXT_LOADED));
                Ok(text)
            }
            Err(_) => {
                log::warn!("open: {file_name:?} is not UTF-8");
                let err = WorkflowError::NotText(file_name);
                st.notice = Some(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }
}

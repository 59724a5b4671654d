//! Audiobook generation controller.

use crate::service::resolve_audio_url;
use crate::session::GenerationResult;

use super::runner::{Workflow, WorkflowError};
use super::state::{lock_state, Notice, UiPhase};

const GENERATE_SUCCESS: &str = "Audiobook generated successfully!";
const GENERATE_FAILED: &str = "Failed to generate audiobook";

impl Workflow {
    /// Snapshot the input, ask the service for a rewritten narration and
    /// publish the result.
    ///
    /// Blank text is rejected with [`WorkflowError::EmptyText`] and a busy
    /// phase with [`WorkflowError::Busy`]; neither sends a request.  The
    /// readiness check and the move to `Generating` happen under one lock.
    ///
    /// On failure the output store keeps whatever result it had and an error
    /// notice carries the service's message (or a generic one).
    pub async fn generate(&self) -> Result<GenerationResult, WorkflowError> {
        let request = {
            let mut st = lock_state(&self.state);
            if !st.input.has_text() {
                log::debug!("generate: rejected, no text");
                return Err(WorkflowError::EmptyText);
            }
            if st.phase.is_busy() {
                log::debug!("generate: rejected, {} in progress", st.phase);
                return Err(WorkflowError::Busy(st.phase));
            }
            st.phase = UiPhase::Generating;
            st.input.snapshot()
        };
        log::info!(
            "generate: {} chars, tone={}, voice={}",
            request.text.chars().count(),
            request.tone,
            request.voice
        );

        let outcome = match self.generator.generate(&request).await {
            Ok(response) => resolve_audio_url(&self.base_url, &response.audio_url).map(
                |audio_reference| GenerationResult {
                    rewritten_text: response.rewritten_text,
                    audio_reference,
                },
            ),
            Err(e) => Err(e),
        };

        let mut st = lock_state(&self.state);
        st.phase = UiPhase::Idle;
        match outcome {
            Ok(result) => {
                log::info!("generate: audio at {}", result.audio_reference);
                st.output.publish(&request, result.clone());
                st.notice = Some(Notice::success(GENERATE_SUCCESS));
                Ok(result)
            }
            Err(e) => {
                log::warn!("generate: failed: {e}");
                let message = e
                    .service_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| GENERATE_FAILED.to_string());
                st.notice = Some(Notice::error(message));
                Err(e.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceError;
    use crate::session::{GenerationRequest, PdfFile, Tone, Voice};
    use crate::workflow::testing::{harness, publish_result, Harness};
    use crate::workflow::NoticeKind;

    fn set_input(workflow: &Workflow, text: &str, tone: Tone, voice: Voice) {
        let mut st = lock_state(workflow.state());
        st.input.set_text(text);
        st.input.set_tone(tone);
        st.input.set_voice(voice);
    }

    #[tokio::test]
    async fn storm_scenario_publishes_absolute_audio_url() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(
            &workflow,
            "The storm approached.",
            Tone::Suspenseful,
            Voice::Michael,
        );

        let result = workflow.generate().await.unwrap();

        assert_eq!(result.rewritten_text, "A storm loomed, dark and threatening.");
        assert_eq!(result.audio_reference, "http://localhost:5000/files/abc.mp3");
        assert_eq!(
            generator.last_request(),
            Some(GenerationRequest {
                text: "The storm approached.".into(),
                tone: Tone::Suspenseful,
                voice: Voice::Michael,
            })
        );

        let st = lock_state(workflow.state());
        assert_eq!(
            st.output.rewritten_text(),
            Some("A storm loomed, dark and threatening.")
        );
        assert_eq!(
            st.output.audio_reference(),
            Some("http://localhost:5000/files/abc.mp3")
        );
        assert_eq!(st.output.source_text(), Some("The storm approached."));
        assert!(st.output.comparison_visible());
        assert_eq!(st.phase, UiPhase::Idle);
        assert_eq!(st.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[tokio::test]
    async fn http_500_keeps_previous_output() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "Some text.", Tone::Neutral, Voice::Allison);
        publish_result(&workflow, "http://localhost:5000/api/audio/old.mp3");
        let before = lock_state(workflow.state()).output.clone();

        generator.fail_next(ServiceError::Status {
            status: 500,
            message: Some("synthesis engine unavailable".into()),
        });
        let err = workflow.generate().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Service(_)));
        let st = lock_state(workflow.state());
        assert_eq!(st.output, before);
        assert_eq!(st.phase, UiPhase::Idle);
        let notice = st.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "synthesis engine unavailable");
    }

    #[tokio::test]
    async fn transport_error_uses_generic_message() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "Some text.", Tone::Neutral, Voice::Allison);
        generator.fail_next(ServiceError::Transport("connection reset".into()));

        assert!(workflow.generate().await.is_err());

        let st = lock_state(workflow.state());
        assert!(st.output.result().is_none());
        assert_eq!(st.notice.as_ref().unwrap().message, GENERATE_FAILED);
    }

    #[tokio::test]
    async fn empty_audio_url_is_treated_as_failure() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "Some text.", Tone::Neutral, Voice::Allison);
        generator.respond_with("rewritten", "");

        let err = workflow.generate().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Service(ServiceError::Malformed(_))));
        let st = lock_state(workflow.state());
        assert!(st.output.result().is_none());
        assert!(!st.output.comparison_visible());
        assert_eq!(st.phase, UiPhase::Idle);
    }

    #[tokio::test]
    async fn blank_text_sends_nothing() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        publish_result(&workflow, "http://localhost:5000/api/audio/old.mp3");
        let before = lock_state(workflow.state()).output.clone();

        for text in ["", "   ", "\n\t"] {
            set_input(&workflow, text, Tone::Inspiring, Voice::Lisa);
            let err = workflow.generate().await.unwrap_err();
            assert!(matches!(err, WorkflowError::EmptyText));
            assert!(err.is_rejection());
        }

        assert_eq!(generator.calls(), 0);
        let st = lock_state(workflow.state());
        assert_eq!(st.output, before);
        assert_eq!(
            st.output.audio_reference(),
            Some("http://localhost:5000/api/audio/old.mp3")
        );
        assert!(st.notice.is_none());
        assert_eq!(st.phase, UiPhase::Idle);
    }

    #[tokio::test]
    async fn generate_is_rejected_while_uploading() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "ready", Tone::Neutral, Voice::Allison);
        lock_state(workflow.state()).phase = UiPhase::UploadingPdf;

        let err = workflow.generate().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Busy(UiPhase::UploadingPdf)));
        assert_eq!(generator.calls(), 0);
        assert_eq!(lock_state(workflow.state()).phase, UiPhase::UploadingPdf);
    }

    #[tokio::test]
    async fn double_submit_sends_one_request() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "ready", Tone::Neutral, Voice::Allison);
        generator.set_delay_ms(50);

        let (first, second) = tokio::join!(workflow.generate(), workflow.generate());

        assert!(first.is_ok());
        assert!(matches!(second, Err(WorkflowError::Busy(UiPhase::Generating))));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn phase_is_generating_while_request_is_outstanding() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "ready", Tone::Neutral, Voice::Allison);
        generator.set_delay_ms(50);

        let observer = workflow.clone();
        let (result, seen) = tokio::join!(workflow.generate(), async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            lock_state(observer.state()).phase
        });

        assert!(result.is_ok());
        assert_eq!(seen, UiPhase::Generating);
        assert_eq!(lock_state(workflow.state()).phase, UiPhase::Idle);
    }

    #[tokio::test]
    async fn new_result_replaces_previous_one() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();
        set_input(&workflow, "first", Tone::Neutral, Voice::Allison);
        workflow.generate().await.unwrap();

        set_input(&workflow, "second", Tone::Inspiring, Voice::Lisa);
        generator.respond_with("second, uplifted", "/api/audio/second.mp3");
        workflow.generate().await.unwrap();

        let st = lock_state(workflow.state());
        assert_eq!(st.output.rewritten_text(), Some("second, uplifted"));
        assert_eq!(
            st.output.audio_reference(),
            Some("http://localhost:5000/api/audio/second.mp3")
        );
        assert_eq!(st.output.source_text(), Some("second"));
    }

    #[tokio::test]
    async fn ingest_then_generate_narrates_pdf_text() {
        let Harness {
            workflow,
            generator,
            ..
        } = harness();

        workflow
            .ingest(PdfFile::new("hello.pdf", b"%PDF".to_vec()))
            .await
            .unwrap();
        workflow.generate().await.unwrap();

        assert_eq!(generator.last_request().unwrap().text, "Hello world");
    }
}

//! Service traits and the `reqwest`-backed [`HttpBackend`].
//!
//! The workflow depends only on [`ExtractionService`], [`GenerationService`]
//! and [`AudioSource`]; `HttpBackend` implements all three against the EchoVerse
//! backend.  All connection details come from [`ServiceConfig`].

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::service::wire::{self, ExtractionResponse, GenerationBody, GenerationResponse};
use crate::session::{GenerationRequest, PdfFile};

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Errors returned by the backend calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-2xx status.
    #[error(
        "service returned HTTP {status}: {}",
        .message.as_deref().unwrap_or("no error message")
    )]
    Status { status: u16, message: Option<String> },

    /// A 2xx response whose body lacks the expected fields.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A URL could not be built from the configured base.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ServiceError {
    /// The message the service itself supplied, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ServiceError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Service traits
// ---------------------------------------------------------------------------

/// PDF text extraction.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract_text(&self, file: &PdfFile) -> Result<String, ServiceError>;
}

/// Tone rewriting + speech synthesis.
///
/// The returned `audio_url` is exactly what the service sent (usually a
/// server-relative path); callers resolve it.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, ServiceError>;
}

/// Fetches synthesized audio by absolute URL.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

/// Talks to the extraction/generation backend over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpBackend {
    /// Build an `HttpBackend` from application config.
    ///
    /// A timeout is applied only when `config.timeout_secs` is set.  A default
    /// client is used if the builder fails.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn read(response: reqwest::Response) -> Result<(u16, Vec<u8>), ServiceError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl ExtractionService for HttpBackend {
    /// Upload `file` as the multipart field `pdf`.
    async fn extract_text(&self, file: &PdfFile) -> Result<String, ServiceError> {
        let url = wire::endpoint(&self.config.base_url, &self.config.upload_path);

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new().part("pdf", part);

        log::debug!(
            "POST {url} ({} bytes, file={:?})",
            file.bytes.len(),
            file.file_name
        );
        let response = self.client.post(&url).multipart(form).send().await?;
        let (status, body) = Self::read(response).await?;

        let parsed: ExtractionResponse = wire::decode(status, &body)?;
        Ok(parsed.extracted_text)
    }
}

#[async_trait]
impl GenerationService for HttpBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ServiceError> {
        let url = wire::endpoint(&self.config.base_url, &self.config.generate_path);

        log::debug!(
            "POST {url} (tone={}, voice={}, {} chars)",
            request.tone,
            request.voice,
            request.text.chars().count()
        );
        let response = self
            .client
            .post(&url)
            .json(&GenerationBody::from(request))
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;

        wire::decode(status, &body)
    }
}

#[async_trait]
impl AudioSource for HttpBackend {
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: None,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

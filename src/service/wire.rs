//! JSON payloads of the extraction and generation endpoints, and the
//! status/body decoding shared by every call.
//!
//! Decoding works on a status code and the raw body bytes so it can be tested
//! without a server.

use serde::{Deserialize, Serialize};

use crate::service::client::ServiceError;
use crate::session::GenerationRequest;

/// `POST /api/upload-pdf` success body.  Extra fields (`success`, `message`)
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionResponse {
    pub extracted_text: String,
}

/// `POST /api/generate-audiobook` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationBody<'a> {
    pub text: &'a str,
    pub tone: &'static str,
    pub voice: &'static str,
}

impl<'a> From<&'a GenerationRequest> for GenerationBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            text: &request.text,
            tone: request.tone.as_str(),
            voice: request.voice.id(),
        }
    }
}

/// `POST /api/generate-audiobook` success body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationResponse {
    pub rewritten_text: String,
    /// Server-relative path of the synthesized audio.
    pub audio_url: String,
}

/// Failure body shared by both endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Turn a status + body into the expected payload or a [`ServiceError`].
///
/// * non-2xx: `Status`, carrying the `error` field when the body has one.
/// * 2xx that does not parse as `T`: `Malformed`.
pub fn decode<T: for<'de> Deserialize<'de>>(status: u16, body: &[u8]) -> Result<T, ServiceError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());
        return Err(ServiceError::Status { status, message });
    }

    serde_json::from_slice(body).map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// Join a backend origin and an endpoint path.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolve the `audio_url` returned by the generator into an absolute URL.
///
/// Absolute URLs pass through; anything else is appended to `base_url`.
pub fn resolve_audio_url(base_url: &str, audio_url: &str) -> Result<String, ServiceError> {
    let audio_url = audio_url.trim();
    if audio_url.is_empty() {
        return Err(ServiceError::Malformed("empty audio_url".into()));
    }

    if let Ok(url) = reqwest::Url::parse(audio_url) {
        if url.has_host() {
            return Ok(url.to_string());
        }
    }

    let joined = endpoint(base_url, audio_url);
    reqwest::Url::parse(&joined)
        .map(|url| url.to_string())
        .map_err(|e| ServiceError::InvalidUrl {
            url: joined,
            reason: e.to_string(),
        })
}

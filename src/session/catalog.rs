//! Narration tones and the fixed voice catalog.
//!
//! Both enums serialise to the exact strings the generation endpoint expects,
//! and deserialise through [`FromStr`], so out-of-catalog values (in config
//! files or anywhere else) are rejected with a [`CatalogError`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tone or voice identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown tone: {0:?}")]
    UnknownTone(String),

    #[error("unknown voice: {0:?}")]
    UnknownVoice(String),
}

// ---------------------------------------------------------------------------
// Tone
// ---------------------------------------------------------------------------

/// Stylistic narration mode applied by the remote rewriting step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Tone {
    #[default]
    Neutral,
    Suspenseful,
    Inspiring,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Neutral, Tone::Suspenseful, Tone::Inspiring];

    /// Wire identifier sent in the `tone` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Suspenseful => "suspenseful",
            Tone::Inspiring => "inspiring",
        }
    }

    /// Label shown in the tone selector.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Neutral => "Neutral",
            Tone::Suspenseful => "Suspenseful",
            Tone::Inspiring => "Inspiring",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownTone(s.to_string()))
    }
}

impl TryFrom<String> for Tone {
    type Error = CatalogError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// Synthetic narrator offered by the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Voice {
    #[default]
    #[serde(rename = "en-US_AllisonV3Voice")]
    Allison,
    #[serde(rename = "en-US_LisaV3Voice")]
    Lisa,
    #[serde(rename = "en-US_MichaelV3Voice")]
    Michael,
}

impl Voice {
    pub const ALL: [Voice; 3] = [Voice::Allison, Voice::Lisa, Voice::Michael];

    /// Wire identifier sent in the `voice` field.
    pub fn id(&self) -> &'static str {
        match self {
            Voice::Allison => "en-US_AllisonV3Voice",
            Voice::Lisa => "en-US_LisaV3Voice",
            Voice::Michael => "en-US_MichaelV3Voice",
        }
    }

    /// Label shown in the voice selector.
    pub fn label(&self) -> &'static str {
        match self {
            Voice::Allison => "Allison (US English)",
            Voice::Lisa => "Lisa (US English)",
            Voice::Michael => "Michael (US English)",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Voice {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.id() == s.trim())
            .ok_or_else(|| CatalogError::UnknownVoice(s.to_string()))
    }
}

impl TryFrom<String> for Voice {
    type Error = CatalogError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a hand-written `settings.toml`
//! only needs the keys it wants to override.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::session::{Tone, Voice};

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Where the extraction and generation endpoints live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Backend origin.  Relative `audio_url`s returned by the generation
    /// endpoint are resolved against it.
    pub base_url: String,
    /// Path of the PDF extraction endpoint.
    pub upload_path: String,
    /// Path of the rewrite + synthesis endpoint.
    pub generate_path: String,
    /// Per-request timeout.  `None` waits for the backend indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            upload_path: "/api/upload-pdf".into(),
            generate_path: "/api/generate-audiobook".into(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// DefaultsConfig
// ---------------------------------------------------------------------------

/// Initial selector values for a fresh session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub tone: Tone,
    pub voice: Voice,
}

// ---------------------------------------------------------------------------
// DownloadConfig
// ---------------------------------------------------------------------------

/// Settings for the "download as file" action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Fixed file name the audiobook is saved under.
    pub file_name: String,
    /// Target directory.  `None` means the platform download directory.
    pub directory: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            file_name: "echoverse-audiobook.mp3".into(),
            directory: None,
        }
    }
}

impl DownloadConfig {
    /// Full destination path for a download.
    pub fn target_path(&self) -> PathBuf {
        let dir = self
            .directory
            .clone()
            .unwrap_or_else(|| AppPaths::new().download_dir);
        dir.join(&self.file_name)
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size in logical pixels.
    pub window_size: (f32, f32),
    /// Seconds a success notice stays visible before it clears itself.
    /// Error notices stay until dismissed.
    pub notice_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (960.0, 720.0),
            notice_secs: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use echoverse::config::AppConfig;
///
/// // Returns Default when the file is missing.
/// let config = AppConfig::load().unwrap();
/// println!("backend: {}", config.service.base_url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub defaults: DefaultsConfig,
    pub download: DownloadConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Make `tone`/`voice` the defaults for the next session.
    ///
    /// Returns `true` when anything changed, i.e. the file is worth saving.
    pub fn remember_selection(&mut self, tone: Tone, voice: Voice) -> bool {
        let changed = self.defaults.tone != tone || self.defaults.voice != voice;
        self.defaults.tone = tone;
        self.defaults.voice = voice;
        changed
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\echoverse\
//!   macOS:   ~/Library/Application Support/echoverse/
//!   Linux:   ~/.config/echoverse/
//!
//! Downloads (saved audiobooks) go to the user's download directory, or the
//! home directory when the platform has none.

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default target directory for the "download" action.
    pub download_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "echoverse";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let download_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
            download_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

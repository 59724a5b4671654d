//! Configuration module for the EchoVerse client.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the backend,
//! session defaults, downloads and the window, `AppPaths` for cross-platform
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, DefaultsConfig, DownloadConfig, ServiceConfig, UiConfig};

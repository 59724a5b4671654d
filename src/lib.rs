//! EchoVerse: a desktop client that turns documents into narrated audiobooks.
//!
//! A PDF or pasted text is rewritten in a chosen tone and synthesized with a
//! chosen voice by the EchoVerse backend; the client drives those requests,
//! shows the original and rewritten text side by side, plays the result and
//! saves it as an MP3.
//!
//! * [`session`]  — tone/voice catalog, input and output stores.
//! * [`service`]  — backend contracts and the `reqwest` client.
//! * [`workflow`] — ingest/generate controllers and the shared state.
//! * [`player`]   — inline playback through `rodio`.
//! * [`config`]   — TOML settings and platform paths.
//! * [`app`]      — the egui window.

pub mod app;
pub mod config;
pub mod player;
pub mod service;
pub mod session;
pub mod workflow;

//! Inline audiobook player on the default output device.
//!
//! [`AudioPlayer`] wraps a `rodio` [`Sink`].  The output stream is not
//! `Send`, so the player lives on the UI thread; the workflow only fetches
//! bytes and hands them over through `WorkflowEvent::AudioReady`.
//!
//! The device is opened lazily on the first [`AudioPlayer::play`], so a
//! machine without audio output can still run the rest of the client.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// No usable output device, or the sink could not be created.
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// The fetched bytes are not a format rodio can decode.
    #[error("cannot decode audio: {0}")]
    Decode(String),
}

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Plays one clip at a time.
#[derive(Default)]
pub struct AudioPlayer {
    output: Option<Output>,
    sink: Option<Sink>,
    /// URL of the clip currently in the sink.
    loaded_url: Option<String>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, PlayerError> {
        if self.output.is_none() {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| PlayerError::Device(e.to_string()))?;
            log::info!("player: audio output opened");
            self.output = Some(Output {
                _stream: stream,
                handle,
            });
        }
        match &self.output {
            Some(output) => Ok(&output.handle),
            None => Err(PlayerError::Device("output stream missing".into())),
        }
    }

    /// Replace whatever is playing with `bytes` and start playback.
    pub fn play(&mut self, url: &str, bytes: Vec<u8>) -> Result<(), PlayerError> {
        self.stop();

        let source =
            Decoder::new(Cursor::new(bytes)).map_err(|e| PlayerError::Decode(e.to_string()))?;
        let sink = Sink::try_new(self.handle()?).map_err(|e| PlayerError::Device(e.to_string()))?;
        sink.append(source);
        sink.play();

        log::debug!("player: playing {url}");
        self.sink = Some(sink);
        self.loaded_url = Some(url.to_string());
        Ok(())
    }

    pub fn pause(&self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    /// Stop and forget the current clip.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded_url = None;
    }

    /// `true` while a clip is queued and not paused.
    pub fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused())
    }

    pub fn is_paused(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && sink.is_paused())
    }

    /// A clip was loaded and has played to the end.
    pub fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(Sink::empty)
    }

    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded_url.as_deref()
    }

    /// A player holding `url` in a device-less sink, with `queued` deciding
    /// whether a (silent) clip is still pending.
    #[cfg(test)]
    pub(crate) fn with_idle_sink(url: &str, queued: bool) -> Self {
        let (sink, _output) = Sink::new_idle();
        if queued {
            sink.append(rodio::source::Zero::<f32>::new(1, 44_100));
        }
        Self {
            output: None,
            sink: Some(sink),
            loaded_url: Some(url.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_is_idle_and_opens_nothing() {
        let mut player = AudioPlayer::new();
        assert!(!player.is_playing());
        assert!(!player.is_paused());
        assert!(player.loaded_url().is_none());

        // Pausing, resuming and stopping without a clip are no-ops.
        player.pause();
        player.resume();
        player.stop();
        assert!(player.output.is_none());
    }

    #[test]
    fn drained_clip_is_finished_not_paused() {
        let player = AudioPlayer::with_idle_sink("http://localhost:5000/api/audio/a.mp3", false);

        assert!(player.is_finished());
        assert!(!player.is_playing());
        assert!(!player.is_paused());
    }

    #[test]
    fn paused_clip_is_not_finished() {
        let player = AudioPlayer::with_idle_sink("http://localhost:5000/api/audio/a.mp3", true);
        player.pause();

        assert!(player.is_paused());
        assert!(!player.is_finished());

        player.resume();
        assert!(player.is_playing());
    }

    #[test]
    fn undecodable_bytes_fail_before_touching_the_device() {
        let mut player = AudioPlayer::new();
        let err = player
            .play("http://localhost:5000/api/audio/x.mp3", b"not audio".to_vec())
            .unwrap_err();

        assert!(matches!(err, PlayerError::Decode(_)));
        assert!(player.output.is_none());
        assert!(player.loaded_url().is_none());
    }
}

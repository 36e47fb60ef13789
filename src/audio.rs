//! Platform audio: output device and speech synthesis
//!
//! The narration player only sees the `AudioOutput`, `Track` and
//! `SpeechEngine` traits. `RodioOutput` decodes clips onto the default output
//! device, `EspeakEngine` renders text to WAV with the `espeak-ng` program.

use std::io::Cursor;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::error::PlaybackError;

const ESPEAK_BASE_WPM: f32 = 175.0;

/// Something that can turn an encoded clip into a controllable track
pub trait AudioOutput: Send + Sync {
    fn open(&self, clip: Arc<[u8]>) -> Result<Box<dyn Track>, PlaybackError>;
}

/// A decoded clip attached to the output, created paused
pub trait Track: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn is_finished(&self) -> bool;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn seek(&self, to: Duration) -> Result<(), PlaybackError>;
    fn set_speed(&self, rate: f32);
    fn set_volume(&self, volume: f32);
}

/// Text-to-speech renderer producing an encoded clip
pub trait SpeechEngine: Send + Sync {
    fn is_available(&self) -> bool;
    fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, PlaybackError>;
}

/// Utterance settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            rate: 0.8,
            pitch: 1.0,
            volume: 0.8,
        }
    }
}

/// Open the default output device.
///
/// The returned stream must outlive every track; it is `!Send`, so the caller
/// keeps it on the main task. Without a device, narration degrades to a no-op.
pub fn open_default_output() -> (Option<OutputStream>, Arc<dyn AudioOutput>) {
    match OutputStream::try_default() {
        Ok((stream, handle)) => {
            tracing::info!("Audio output device opened");
            (Some(stream), Arc::new(RodioOutput { handle }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "No audio output device, narration disabled");
            (None, Arc::new(NullOutput::new(format!("no audio output device: {e}"))))
        }
    }
}

pub struct RodioOutput {
    handle: OutputStreamHandle,
}

impl AudioOutput for RodioOutput {
    fn open(&self, clip: Arc<[u8]>) -> Result<Box<dyn Track>, PlaybackError> {
        let sink = Sink::try_new(&self.handle).map_err(|e| PlaybackError::Unavailable(e.to_string()))?;
        let source = Decoder::new(Cursor::new(clip)).map_err(|e| PlaybackError::Decode(e.to_string()))?;
        let duration = source.total_duration();

        sink.pause();
        sink.append(source);

        Ok(Box::new(RodioTrack { sink, duration }))
    }
}

struct RodioTrack {
    sink: Sink,
    duration: Option<Duration>,
}

impl Track for RodioTrack {
    fn play(&self) {
        self.sink.play();
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn seek(&self, to: Duration) -> Result<(), PlaybackError> {
        self.sink
            .try_seek(to)
            .map_err(|e| PlaybackError::Unavailable(format!("seek failed: {e}")))
    }

    fn set_speed(&self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }
}

/// Stand-in output when no device could be opened
pub struct NullOutput {
    reason: String,
}

impl NullOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl AudioOutput for NullOutput {
    fn open(&self, _clip: Arc<[u8]>) -> Result<Box<dyn Track>, PlaybackError> {
        Err(PlaybackError::Unavailable(self.reason.clone()))
    }
}

/// Speech through the `espeak-ng` command line program
pub struct EspeakEngine {
    program: String,
    available: bool,
}

impl EspeakEngine {
    /// Probe once for the program; a missing binary disables speech
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let available = Command::new(&program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if available {
            tracing::info!(program = %program, "Speech synthesis available");
        } else {
            tracing::warn!(program = %program, "Speech synthesis not available, narration will be skipped");
        }

        Self { program, available }
    }
}

impl SpeechEngine for EspeakEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, PlaybackError> {
        if !self.available {
            return Err(PlaybackError::Unavailable(format!("{} not found", self.program)));
        }

        let output = Command::new(&self.program)
            .arg("--stdout")
            .args(espeak_args(voice))
            .arg(text)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(PlaybackError::Unavailable(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(output.stdout)
    }
}

/// espeak-ng flags: `-s` words per minute, `-p` pitch 0-99, `-a` amplitude 0-200
fn espeak_args(voice: &Voice) -> Vec<String> {
    let wpm = (ESPEAK_BASE_WPM * voice.rate).round().clamp(80.0, 450.0) as u32;
    let pitch = (voice.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
    let amplitude = (voice.volume * 100.0).round().clamp(0.0, 200.0) as u32;
    vec![
        "-s".to_string(),
        wpm.to_string(),
        "-p".to_string(),
        pitch.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_espeak_args_for_default_voice() {
        assert_eq!(espeak_args(&Voice::default()), vec!["-s", "140", "-p", "50", "-a", "80"]);
    }

    #[test]
    fn test_espeak_args_are_clamped() {
        let voice = Voice {
            rate: 10.0,
            pitch: 5.0,
            volume: 0.0,
        };
        assert_eq!(espeak_args(&voice), vec!["-s", "450", "-p", "99", "-a", "0"]);
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let engine = EspeakEngine::new("scan-spectrum-no-such-speech-program");
        assert!(!engine.is_available());
        assert!(matches!(
            engine.synthesize("hello", &Voice::default()),
            Err(PlaybackError::Unavailable(_))
        ));
    }

    #[test]
    fn test_null_output_refuses_clips() {
        let output = NullOutput::new("muted");
        let clip: Arc<[u8]> = Arc::from(vec![0u8; 4]);
        assert!(matches!(output.open(clip), Err(PlaybackError::Unavailable(reason)) if reason == "muted"));
    }
}

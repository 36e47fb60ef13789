//! Narration player
//!
//! One player owns at most one loaded clip. A clip is either a streamed or
//! local audio file (`Backend::Audio`) or a synthesized utterance
//! (`Backend::Speech`); both are driven through the `Transport` trait so the
//! controller never cares which one is active. Playback state is published on
//! a `watch` channel after every change.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::audio::{AudioOutput, SpeechEngine, Track, Voice};
use crate::error::PlaybackError;
use crate::model::{clamp_rate, BackendKind, PlaybackState, PlaybackStatus};

/// What to narrate
#[derive(Clone, Debug, PartialEq)]
pub enum NarrationSource {
    /// Text spoken by the speech engine
    Text(String),
    /// `http(s)://` URL or local path of an audio file
    Url(String),
}

/// Script spoken when a subpart becomes current
pub fn narration_script(label: &str) -> String {
    format!(
        "Hello! Let's learn about the {label}. This is a demo narration. In the full version, \
         you would hear a detailed 5-10 minute explanation about this body part, including its \
         structure, function, and interesting facts."
    )
}

/// Operations every backend supports, some of them by refusing
trait Transport {
    fn kind(&self) -> BackendKind;
    /// Open a fresh track at the start of the clip, paused
    fn rewind(&mut self) -> Result<(), PlaybackError>;
    fn resume(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError>;
    fn set_rate(&mut self, rate: f32) -> Result<(), PlaybackError>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn is_finished(&self) -> bool;
}

/// Encoded clip plus the track currently attached to the output
struct Clip {
    bytes: Arc<[u8]>,
    output: Arc<dyn AudioOutput>,
    track: Option<Box<dyn Track>>,
    volume: f32,
    speed: f32,
}

impl Clip {
    fn open(
        bytes: Arc<[u8]>,
        output: Arc<dyn AudioOutput>,
        volume: f32,
        speed: f32,
    ) -> Result<Self, PlaybackError> {
        let mut clip = Self {
            bytes,
            output,
            track: None,
            volume,
            speed,
        };
        clip.rewind()?;
        Ok(clip)
    }

    fn rewind(&mut self) -> Result<(), PlaybackError> {
        if let Some(track) = self.track.take() {
            track.stop();
        }
        let track = self.output.open(self.bytes.clone())?;
        track.set_volume(self.volume);
        track.set_speed(self.speed);
        self.track = Some(track);
        Ok(())
    }

    fn resume(&self) {
        if let Some(track) = &self.track {
            track.play();
        }
    }

    fn pause(&self) {
        if let Some(track) = &self.track {
            track.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(track) = self.track.take() {
            track.stop();
        }
    }

    fn position(&self) -> Duration {
        self.track.as_ref().map(|t| t.position()).unwrap_or_default()
    }

    fn duration(&self) -> Option<Duration> {
        self.track.as_ref().and_then(|t| t.duration())
    }

    fn is_finished(&self) -> bool {
        self.track.as_ref().is_none_or(|t| t.is_finished())
    }
}

struct AudioBackend {
    clip: Clip,
}

impl Transport for AudioBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Audio
    }

    fn rewind(&mut self) -> Result<(), PlaybackError> {
        self.clip.rewind()
    }

    fn resume(&mut self) {
        self.clip.resume();
    }

    fn pause(&mut self) {
        self.clip.pause();
    }

    fn stop(&mut self) {
        self.clip.stop();
    }

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError> {
        // A drained track cannot seek; reopen it paused first
        if self.clip.is_finished() {
            self.clip.rewind()?;
        }
        let target = match self.clip.duration() {
            Some(total) => to.min(total),
            None => to,
        };
        match &self.clip.track {
            Some(track) => track.seek(target),
            None => Err(PlaybackError::NothingLoaded),
        }
    }

    fn set_rate(&mut self, rate: f32) -> Result<(), PlaybackError> {
        self.clip.speed = rate;
        if let Some(track) = &self.clip.track {
            track.set_speed(rate);
        }
        Ok(())
    }

    fn position(&self) -> Duration {
        self.clip.position()
    }

    fn duration(&self) -> Option<Duration> {
        self.clip.duration()
    }

    fn is_finished(&self) -> bool {
        self.clip.is_finished()
    }
}

/// A synthesized utterance; its speed is fixed at synthesis time
struct SpeechBackend {
    clip: Clip,
}

impl SpeechBackend {
    fn unsupported(operation: &'static str) -> PlaybackError {
        PlaybackError::Unsupported {
            operation,
            backend: BackendKind::Speech.name(),
        }
    }
}

impl Transport for SpeechBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Speech
    }

    fn rewind(&mut self) -> Result<(), PlaybackError> {
        self.clip.rewind()
    }

    fn resume(&mut self) {
        self.clip.resume();
    }

    fn pause(&mut self) {
        self.clip.pause();
    }

    fn stop(&mut self) {
        self.clip.stop();
    }

    fn seek(&mut self, _to: Duration) -> Result<(), PlaybackError> {
        Err(Self::unsupported("seek"))
    }

    fn set_rate(&mut self, _rate: f32) -> Result<(), PlaybackError> {
        Err(Self::unsupported("set_rate"))
    }

    fn position(&self) -> Duration {
        self.clip.position()
    }

    fn duration(&self) -> Option<Duration> {
        self.clip.duration()
    }

    fn is_finished(&self) -> bool {
        self.clip.is_finished()
    }
}

enum Backend {
    Audio(AudioBackend),
    Speech(SpeechBackend),
}

impl Backend {
    fn transport(&mut self) -> &mut dyn Transport {
        match self {
            Backend::Audio(audio) => audio,
            Backend::Speech(speech) => speech,
        }
    }

    fn view(&self) -> &dyn Transport {
        match self {
            Backend::Audio(audio) => audio,
            Backend::Speech(speech) => speech,
        }
    }
}

/// Everything needed to open a clip, detached from the player so slow
/// synthesis or downloads run without holding it
#[derive(Clone)]
pub struct ClipLoader {
    output: Arc<dyn AudioOutput>,
    speech: Arc<dyn SpeechEngine>,
    http: reqwest::Client,
    voice: Voice,
    rate: f32,
}

/// A clip opened paused on the output, not yet owned by a player
pub struct PreparedClip {
    backend: Backend,
    label: String,
}

impl PreparedClip {
    /// Release a clip that will never be played
    pub fn discard(mut self) {
        self.backend.transport().stop();
    }
}

impl ClipLoader {
    pub async fn prepare(&self, source: NarrationSource) -> Result<PreparedClip, PlaybackError> {
        let label = match &source {
            NarrationSource::Text(text) => text.chars().take(48).collect::<String>(),
            NarrationSource::Url(url) => url.clone(),
        };
        let backend = self.open_backend(source).await?;
        Ok(PreparedClip { backend, label })
    }

    /// Synthesize the demo script for `label`
    pub async fn prepare_script(&self, label: &str) -> Result<PreparedClip, PlaybackError> {
        self.prepare(NarrationSource::Text(narration_script(label))).await
    }

    async fn open_backend(&self, source: NarrationSource) -> Result<Backend, PlaybackError> {
        match source {
            NarrationSource::Text(text) => {
                if !self.speech.is_available() {
                    return Err(PlaybackError::Unavailable("speech synthesis".to_string()));
                }
                let engine = self.speech.clone();
                let voice = Voice {
                    rate: self.voice.rate * self.rate,
                    ..self.voice
                };
                let bytes = tokio::task::spawn_blocking(move || engine.synthesize(&text, &voice))
                    .await
                    .map_err(|e| PlaybackError::Unavailable(format!("synthesis task failed: {e}")))??;
                let clip = Clip::open(Arc::from(bytes), self.output.clone(), self.voice.volume, 1.0)?;
                Ok(Backend::Speech(SpeechBackend { clip }))
            }
            NarrationSource::Url(location) => {
                let bytes = self.fetch(&location).await?;
                let clip = Clip::open(Arc::from(bytes), self.output.clone(), 1.0, self.rate)?;
                Ok(Backend::Audio(AudioBackend { clip }))
            }
        }
    }

    async fn fetch(&self, location: &str) -> Result<Vec<u8>, PlaybackError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let response = self.http.get(location).send().await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        } else {
            Ok(tokio::fs::read(Path::new(location)).await?)
        }
    }
}

pub struct NarrationPlayer {
    output: Arc<dyn AudioOutput>,
    speech: Arc<dyn SpeechEngine>,
    http: reqwest::Client,
    voice: Voice,
    backend: Option<Backend>,
    state: PlaybackState,
    tx: watch::Sender<PlaybackState>,
}

impl NarrationPlayer {
    pub fn new(output: Arc<dyn AudioOutput>, speech: Arc<dyn SpeechEngine>, http: reqwest::Client) -> Self {
        let (tx, _rx) = watch::channel(PlaybackState::default());
        Self {
            output,
            speech,
            http,
            voice: Voice::default(),
            backend: None,
            state: PlaybackState::default(),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Replace whatever is loaded with `source`.
    ///
    /// The previous clip is stopped before anything else happens. Failures are
    /// logged and reported as `false`; the player is then left empty.
    pub async fn load(&mut self, source: NarrationSource) -> bool {
        let loader = self.loader();
        let prepared = loader.prepare(source).await;
        self.install(prepared)
    }

    /// Stop the current clip and hand out a loader for its replacement
    pub fn loader(&mut self) -> ClipLoader {
        self.unload();
        self.publish();
        ClipLoader {
            output: self.output.clone(),
            speech: self.speech.clone(),
            http: self.http.clone(),
            voice: self.voice,
            rate: self.state.rate,
        }
    }

    /// Take ownership of a prepared clip, Idle at its start
    pub fn install(&mut self, prepared: Result<PreparedClip, PlaybackError>) -> bool {
        self.unload();
        match prepared {
            Ok(PreparedClip { backend, label }) => {
                self.state = PlaybackState {
                    status: PlaybackStatus::Idle,
                    position: Duration::ZERO,
                    duration: backend.view().duration(),
                    rate: self.state.rate,
                    backend: Some(backend.view().kind()),
                    label,
                };
                tracing::debug!(backend = backend.view().kind().name(), label = %self.state.label, "Narration loaded");
                self.backend = Some(backend);
                self.publish();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Narration could not be loaded");
                self.publish();
                false
            }
        }
    }

    fn unload(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.transport().stop();
            tracing::debug!("Previous narration stopped");
        }
        self.state = PlaybackState {
            rate: self.state.rate,
            ..PlaybackState::default()
        };
    }

    /// Start or resume. Playing is left alone; an Idle clip plays from its
    /// current position, or from the start once it has run out.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let status = self.state.status;
        let backend = self.backend.as_mut().ok_or(PlaybackError::NothingLoaded)?;
        let transport = backend.transport();

        match status {
            PlaybackStatus::Playing => return Ok(()),
            PlaybackStatus::Paused => transport.resume(),
            PlaybackStatus::Idle => {
                if transport.is_finished() {
                    if let Err(e) = transport.rewind() {
                        tracing::warn!(error = %e, "Output refused the narration");
                        return Err(e);
                    }
                }
                transport.resume();
            }
        }

        self.state.status = PlaybackStatus::Playing;
        self.state.position = transport.position();
        self.state.duration = transport.duration();
        self.publish();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        let backend = self.backend.as_mut().ok_or(PlaybackError::NothingLoaded)?;
        if self.state.status == PlaybackStatus::Playing {
            backend.transport().pause();
            self.state.status = PlaybackStatus::Paused;
            self.publish();
        }
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        if self.state.is_playing() { self.pause() } else { self.play() }
    }

    pub fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let backend = self.backend.as_mut().ok_or(PlaybackError::NothingLoaded)?;
        let transport = backend.transport();
        transport.seek(position)?;
        self.state.position = transport.position();
        self.publish();
        Ok(())
    }

    /// Record a new rate multiplier; speech keeps it for the next utterance
    pub fn set_rate(&mut self, multiplier: f32) -> Result<(), PlaybackError> {
        self.state.rate = clamp_rate(multiplier);
        let result = match self.backend.as_mut() {
            Some(backend) => backend.transport().set_rate(self.state.rate),
            None => Ok(()),
        };
        self.publish();
        result
    }

    /// Speak the demo script for `label`, replacing any running narration
    pub async fn narrate(&mut self, label: &str) -> bool {
        let loader = self.loader();
        let prepared = loader.prepare_script(label).await;
        self.start(prepared, label)
    }

    /// Install a prepared narration for `label` and start it
    pub fn start(&mut self, prepared: Result<PreparedClip, PlaybackError>, label: &str) -> bool {
        if !self.install(prepared) {
            return false;
        }
        self.state.label = label.to_string();
        match self.play() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, label, "Narration did not start");
                false
            }
        }
    }

    /// Poll the track; called once per UI tick
    pub fn refresh(&mut self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let transport = backend.view();

        if self.state.status == PlaybackStatus::Playing {
            self.state.position = transport.position();
            if transport.is_finished() {
                tracing::debug!(label = %self.state.label, "Narration finished");
                self.state.status = PlaybackStatus::Idle;
                if let Some(total) = transport.duration() {
                    self.state.position = total;
                }
            }
        }
        self.state.duration = transport.duration().or(self.state.duration);
        self.publish();
    }

    fn publish(&self) {
        let state = &self.state;
        self.tx.send_if_modified(|current| {
            if current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
    }
}

impl Drop for NarrationPlayer {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.transport().stop();
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::player;
    use super::*;

    #[tokio::test]
    async fn test_toggle_flips_between_playing_and_paused() {
        let (mut player, _counters, _speech) = player(true);
        assert!(player.load(NarrationSource::Text("hello".to_string())).await);
        assert_eq!(player.state().status, PlaybackStatus::Idle);

        player.toggle().unwrap();
        assert_eq!(player.state().status, PlaybackStatus::Playing);
        player.toggle().unwrap();
        assert_eq!(player.state().status, PlaybackStatus::Paused);
        player.toggle().unwrap();
        assert_eq!(player.state().status, PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn test_double_play_starts_once() {
        let (mut player, counters, _speech) = player(true);
        player.load(NarrationSource::Text("hello".to_string())).await;

        player.play().unwrap();
        player.play().unwrap();

        assert!(player.state().is_playing());
        assert_eq!(counters.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_play_without_clip_fails() {
        let (mut player, _counters, _speech) = player(true);
        assert!(matches!(player.play(), Err(PlaybackError::NothingLoaded)));
        assert_eq!(player.state().status, PlaybackStatus::Idle);
    }

    #[tokio::test]
    async fn test_new_narration_stops_previous_one() {
        let (mut player, counters, speech) = player(true);

        assert!(player.narrate("Right Atrium").await);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 0);

        assert!(player.narrate("Left Ventricle").await);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(player.state().label, "Left Ventricle");
        assert!(player.state().is_playing());

        let spoken = speech.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 2);
        assert!(spoken[1].0.starts_with("Hello! Let's learn about the Left Ventricle."));
    }

    #[tokio::test]
    async fn test_prepared_clip_waits_for_install() {
        let (mut player, counters, _speech) = player(true);
        assert!(player.narrate("Right Atrium").await);

        // Preparing does not touch the player; the loader already stopped it
        let loader = player.loader();
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
        let unused = loader.prepare_script("Left Ventricle").await.unwrap();
        let kept = loader.prepare_script("Frontal Lobe").await;
        assert!(player.state().backend.is_none());

        unused.discard();
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 2);
        assert!(player.start(kept, "Frontal Lobe"));
        assert_eq!(player.state().label, "Frontal Lobe");
        assert!(player.state().is_playing());
    }

    #[tokio::test]
    async fn test_speech_refuses_seek_and_rate() {
        let (mut player, _counters, speech) = player(true);
        player.narrate("Frontal Lobe").await;

        assert!(matches!(
            player.seek(Duration::from_secs(5)),
            Err(PlaybackError::Unsupported { operation: "seek", backend: "speech" })
        ));
        assert!(matches!(
            player.set_rate(1.5),
            Err(PlaybackError::Unsupported { operation: "set_rate", .. })
        ));
        assert_eq!(player.state().rate, 1.5);

        // The stored rate shapes the next utterance
        player.narrate("Cerebellum").await;
        let spoken = speech.spoken.lock().unwrap();
        assert!((spoken[1].1 - 0.8 * 1.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unavailable_speech_is_skipped() {
        let (mut player, counters, _speech) = player(false);
        assert!(!player.narrate("Right Atrium").await);
        assert_eq!(player.state().status, PlaybackStatus::Idle);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_audio_clip_seeks_and_changes_rate() {
        let (mut player, counters, _speech) = player(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        assert!(player.load(NarrationSource::Url(path.display().to_string())).await);
        assert_eq!(player.state().backend, Some(BackendKind::Audio));

        player.seek(Duration::from_secs(12)).unwrap();
        assert_eq!(player.state().position, Duration::from_secs(12));

        player.set_rate(3.0).unwrap();
        assert_eq!(player.state().rate, 2.0);
        assert_eq!(counters.speeds.lock().unwrap().last(), Some(&2.0));
    }

    #[tokio::test]
    async fn test_audio_play_keeps_position_set_while_idle() {
        let (mut player, counters, _speech) = player(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        player.load(NarrationSource::Url(path.display().to_string())).await;

        player.seek(Duration::from_secs(12)).unwrap();
        player.play().unwrap();
        player.refresh();
        assert_eq!(player.state().position, Duration::from_secs(12));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);

        // Run to the end, step back and resume from there
        counters.finished.store(true, Ordering::SeqCst);
        player.refresh();
        assert_eq!(player.state().position, Duration::from_secs(30));
        player.seek(Duration::from_secs(25)).unwrap();
        player.play().unwrap();
        player.refresh();
        assert!(player.state().is_playing());
        assert_eq!(player.state().position, Duration::from_secs(25));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_audio_file_fails_to_load() {
        let (mut player, _counters, _speech) = player(true);
        assert!(!player.load(NarrationSource::Url("/no/such/narration.mp3".to_string())).await);
        assert!(player.state().backend.is_none());
    }

    #[tokio::test]
    async fn test_refresh_moves_to_idle_at_end_and_play_restarts() {
        let (mut player, counters, _speech) = player(true);
        let mut rx = player.subscribe();
        player.narrate("Right Atrium").await;
        assert!(rx.borrow_and_update().is_playing());

        counters.finished.store(true, Ordering::SeqCst);
        player.refresh();
        assert_eq!(player.state().status, PlaybackStatus::Idle);
        assert_eq!(rx.borrow_and_update().position, Duration::from_secs(30));

        player.play().unwrap();
        assert!(player.state().is_playing());
        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
    }
}

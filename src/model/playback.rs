//! Narration playback state published by the player

use std::time::Duration;

pub const DEFAULT_RATE: f32 = 1.0;
pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Which backend the loaded clip belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Audio,
    Speech,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Audio => "audio",
            BackendKind::Speech => "speech",
        }
    }
}

/// Snapshot of the player for the progress bar
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub rate: f32,
    pub backend: Option<BackendKind>,
    pub label: String,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            position: Duration::ZERO,
            duration: None,
            rate: DEFAULT_RATE,
            backend: None,
            label: String::new(),
        }
    }
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn progress_ratio(&self) -> f64 {
        match self.duration {
            Some(total) if !total.is_zero() => (self.position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(MIN_RATE, MAX_RATE)
    } else {
        DEFAULT_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        let mut state = PlaybackState::default();
        assert_eq!(state.progress_ratio(), 0.0);

        state.duration = Some(Duration::from_secs(10));
        state.position = Duration::from_secs(5);
        assert!((state.progress_ratio() - 0.5).abs() < f64::EPSILON);

        state.position = Duration::from_secs(20);
        assert_eq!(state.progress_ratio(), 1.0);
    }

    #[test]
    fn test_clamp_rate() {
        assert_eq!(clamp_rate(0.1), MIN_RATE);
        assert_eq!(clamp_rate(1.25), 1.25);
        assert_eq!(clamp_rate(9.0), MAX_RATE);
        assert_eq!(clamp_rate(f32::NAN), DEFAULT_RATE);
    }
}

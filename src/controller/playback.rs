//! Narration control methods

use std::time::Duration;

use crate::error::PlaybackError;
use crate::model::ScanService;

use super::AppController;

pub const SEEK_STEP: Duration = Duration::from_secs(5);
pub const RATE_STEP: f32 = 0.25;

impl<S: ScanService> AppController<S> {
    pub async fn toggle_playback(&self) {
        let mut narrator = self.narrator.lock().await;
        let was_playing = narrator.state().is_playing();
        tracing::debug!(is_playing = was_playing, "Toggling narration");

        match narrator.toggle() {
            Ok(()) => {
                tracing::info!(action = if was_playing { "paused" } else { "resumed" }, "Narration toggled")
            }
            Err(e) => Self::log_playback_error("toggle", &e),
        }
    }

    /// Move the narration by `step`, forward or back, clamped at zero
    pub async fn seek_by(&self, step: Duration, forward: bool) {
        let mut narrator = self.narrator.lock().await;
        let position = narrator.state().position;
        let target = if forward {
            position + step
        } else {
            position.saturating_sub(step)
        };

        if let Err(e) = narrator.seek(target) {
            Self::log_playback_error("seek", &e);
        }
    }

    pub async fn change_rate(&self, faster: bool) {
        let mut narrator = self.narrator.lock().await;
        let current = narrator.state().rate;
        let requested = if faster { current + RATE_STEP } else { current - RATE_STEP };

        match narrator.set_rate(requested) {
            Ok(()) => tracing::debug!(rate = narrator.state().rate, "Narration rate changed"),
            Err(e) => Self::log_playback_error("set_rate", &e),
        }
    }

    fn log_playback_error(operation: &str, error: &PlaybackError) {
        match error {
            PlaybackError::Unsupported { .. } | PlaybackError::NothingLoaded => {
                tracing::debug!(operation, error = %error, "Narration command had no effect")
            }
            _ => tracing::warn!(operation, error = %error, "Narration command failed"),
        }
    }
}

//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! talks to the scan backend and drives narration. It is organized into
//! submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Upload, organ binding, catalog and section operations
//! - `playback`: Narration control methods

mod input;
mod navigation;
mod playback;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::model::{AppModel, Effect, FallbackData, ScanService};
use crate::narration::NarrationPlayer;

#[derive(Clone)]
pub struct AppController<S: ScanService> {
    pub(crate) model: Arc<AppModel>,
    pub(crate) service: S,
    pub(crate) fallback: Arc<FallbackData>,
    pub(crate) narrator: Arc<Mutex<NarrationPlayer>>,
    /// Ticket of the most recently requested narration
    narrations: Arc<AtomicU64>,
}

impl<S: ScanService> AppController<S> {
    pub fn new(
        model: Arc<AppModel>,
        service: S,
        fallback: Arc<FallbackData>,
        narrator: Arc<Mutex<NarrationPlayer>>,
    ) -> Self {
        Self {
            model,
            service,
            fallback,
            narrator,
            narrations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Carry out the follow-up work a state change asked for
    pub(crate) async fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Narrate(label) => {
                let ticket = self.issue_narration();
                self.narrate(ticket, label).await;
            }
            other => Self::note_effect(&other),
        }
    }

    /// Run an effect off the input path so slow synthesis never blocks keys.
    /// The narration ticket is taken here, in key order.
    pub(crate) fn spawn_effect(&self, effect: Effect) {
        match effect {
            Effect::Narrate(label) => {
                let ticket = self.issue_narration();
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.narrate(ticket, label).await;
                });
            }
            other => Self::note_effect(&other),
        }
    }

    fn note_effect(effect: &Effect) {
        if *effect == Effect::Stale {
            tracing::debug!("Superseded organ load discarded");
        }
    }

    fn issue_narration(&self) -> u64 {
        self.narrations.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current_narration(&self, ticket: u64) -> bool {
        self.narrations.load(Ordering::SeqCst) == ticket
    }

    /// Speak `label` unless a later narration was requested meanwhile.
    ///
    /// The player is locked only to stop the old clip and to install the new
    /// one; synthesis runs in between without it.
    async fn narrate(&self, ticket: u64, label: String) {
        let loader = {
            let mut narrator = self.narrator.lock().await;
            if !self.is_current_narration(ticket) {
                tracing::debug!(label = %label, "Narration superseded before loading");
                return;
            }
            narrator.loader()
        };

        let prepared = loader.prepare_script(&label).await;

        let mut narrator = self.narrator.lock().await;
        if !self.is_current_narration(ticket) {
            if let Ok(clip) = prepared {
                clip.discard();
            }
            tracing::debug!(label = %label, "Narration superseded while loading");
            return;
        }
        if !narrator.start(prepared, &label) {
            tracing::debug!(label = %label, "Narration skipped");
        }
    }

    pub(crate) fn format_upload_error(error: &ApiError) -> String {
        let reason = match error {
            ApiError::Network(e) if e.is_timeout() => "The scan service did not answer in time".to_string(),
            ApiError::Network(e) if e.is_connect() => "Could not reach the scan service".to_string(),
            other => other.to_string(),
        };
        format!("Upload failed: {reason}")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted scan service for controller tests

    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use tokio::sync::Notify;

    use super::*;
    use crate::model::{CatalogEntry, ImageFile, Organ, UploadResult};
    use crate::narration::testing::player;

    #[derive(Clone, Default)]
    pub struct FakeService {
        pub upload_reply: Arc<StdMutex<Option<Result<UploadResult, String>>>>,
        pub organs: Arc<HashMap<String, Organ>>,
        pub catalog: Option<Vec<CatalogEntry>>,
        pub healthy: bool,
        /// When set, uploads wait for `release` before answering
        pub gate: Option<Arc<Notify>>,
        pub entered: Arc<Notify>,
        pub organ_calls: Arc<StdMutex<Vec<String>>>,
    }

    impl ScanService for FakeService {
        async fn upload(&self, _image: ImageFile) -> Result<UploadResult, ApiError> {
            self.entered.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.upload_reply.lock().unwrap().clone() {
                Some(Ok(result)) => Ok(result),
                Some(Err(reason)) => Err(ApiError::Rejected(reason)),
                None => Err(ApiError::Status(503)),
            }
        }

        async fn organ(&self, id: &str) -> Result<Organ, ApiError> {
            self.organ_calls.lock().unwrap().push(id.to_string());
            self.organs.get(id).cloned().ok_or(ApiError::Status(404))
        }

        async fn catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
            self.catalog.clone().ok_or(ApiError::Status(503))
        }

        async fn health(&self) -> Result<String, ApiError> {
            if self.healthy {
                Ok("ScanSpectrum is running!".to_string())
            } else {
                Err(ApiError::Status(503))
            }
        }
    }

    pub fn controller(service: FakeService) -> AppController<FakeService> {
        let (narrator, _counters, _speech) = player(true);
        with_narrator(service, narrator)
    }

    pub fn with_narrator(service: FakeService, narrator: NarrationPlayer) -> AppController<FakeService> {
        AppController::new(
            Arc::new(AppModel::new()),
            service,
            Arc::new(FallbackData::embedded().unwrap()),
            Arc::new(Mutex::new(narrator)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::testing::{controller, with_narrator, FakeService};
    use super::*;
    use crate::model::PlaybackStatus;
    use crate::narration::testing::slow_player;

    const SYNTHESIS: Duration = Duration::from_millis(150);

    #[tokio::test]
    async fn test_overlapping_narrations_end_on_the_latest_label() {
        let (narrator, counters, speech) = slow_player(SYNTHESIS);
        let controller = with_narrator(FakeService::default(), narrator);

        let first = controller.issue_narration();
        let later = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let second = controller.issue_narration();
            controller.narrate(second, "Left Ventricle".to_string()).await;
        };
        tokio::join!(controller.narrate(first, "Right Atrium".to_string()), later);

        let narrator = controller.narrator.lock().await;
        assert_eq!(narrator.state().label, "Left Ventricle");
        assert!(narrator.state().is_playing());
        assert_eq!(speech.spoken.lock().unwrap().len(), 2);
        // The superseded clip was released without ever playing
        assert_eq!(counters.started.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_ticket_never_loads() {
        let controller = controller(FakeService::default());
        let stale = controller.issue_narration();
        let current = controller.issue_narration();

        controller.narrate(stale, "Right Atrium".to_string()).await;
        assert_eq!(controller.narrator.lock().await.state().backend, None);

        controller.narrate(current, "Left Ventricle".to_string()).await;
        assert_eq!(controller.narrator.lock().await.state().label, "Left Ventricle");
    }

    #[tokio::test]
    async fn test_transport_keys_do_not_wait_for_synthesis() {
        let (narrator, _counters, _speech) = slow_player(SYNTHESIS);
        let controller = with_narrator(FakeService::default(), narrator);

        controller.spawn_effect(Effect::Narrate("Frontal Lobe".to_string()));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let toggled = tokio::time::timeout(Duration::from_millis(50), controller.toggle_playback()).await;
        assert!(toggled.is_ok());
        assert_eq!(controller.narrator.lock().await.state().status, PlaybackStatus::Idle);
    }
}

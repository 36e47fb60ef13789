//! Navigation-related controller methods (upload, organ binding, catalog)

use std::time::Instant;

use crate::error::{ApiError, ViewError};
use crate::log_api_result;
use crate::model::{
    expand_path, Action, BackendHealth, DataOrigin, Detection, Effect, ImageFile, Notice, ScanService,
    Section, UploadResult,
};

use super::AppController;

impl<S: ScanService> AppController<S> {
    /// Apply an action whose rejection only needs a log line
    pub(crate) async fn dispatch(&self, action: Action) -> Effect {
        match self.model.apply(action).await {
            Ok(effect) => effect,
            Err(e) => {
                tracing::debug!(error = %e, "Action rejected");
                Effect::None
            }
        }
    }

    pub async fn switch_section(&self, section: Section) {
        tracing::debug!(section = section.title(), "Switching section");
        self.dispatch(Action::SwitchSection(section)).await;
    }

    /// Upload the image at `input` and bind whatever the backend detects.
    ///
    /// The processing indicator is raised for the duration of the call and
    /// cleared on every path. A submission made while another is still
    /// pending is dropped.
    pub async fn submit_image(&self, input: &str) {
        if let Err(e) = self.model.apply(Action::BeginUpload).await {
            tracing::info!(error = %e, "Upload ignored");
            return;
        }

        let result = self.upload_image(input).await;
        self.dispatch(Action::EndUpload).await;
        log_api_result!("upload", result);

        match result {
            Ok(upload) => {
                tracing::info!(part = %upload.part, confidence = upload.confidence, "Image classified");
                self.show_results(upload).await;
            }
            Err(e) => {
                let message = Self::format_upload_error(&e);
                self.dispatch(Action::RaiseNotice(Notice::error(message))).await;
            }
        }
    }

    async fn upload_image(&self, input: &str) -> Result<UploadResult, ApiError> {
        let image = ImageFile::open(&expand_path(input)).await?;
        tracing::debug!(file = %image.file_name, bytes = image.bytes.len(), "Submitting image");
        self.service.upload(image).await
    }

    /// Show the detection labels and silhouette, then bind the organ
    pub async fn show_results(&self, result: UploadResult) {
        let detection = Detection {
            organ_id: result.part.clone(),
            confidence: result.confidence,
        };
        if let Effect::OrganLoadStarted(generation) = self.dispatch(Action::ShowResults(detection)).await {
            self.bind_organ(&result.part, generation).await;
        }
    }

    /// Fetch and bind an organ, using the offline table when the backend fails
    pub async fn load_organ(&self, id: &str) {
        if let Effect::OrganLoadStarted(generation) = self.dispatch(Action::BeginOrganLoad).await {
            self.bind_organ(id, generation).await;
        }
    }

    async fn bind_organ(&self, id: &str, generation: u64) {
        let fetched = self.service.organ(id).await;
        log_api_result!("organ", fetched);
        let (organ, origin) = match fetched {
            Ok(organ) => (organ, DataOrigin::Live),
            Err(e) => {
                tracing::warn!(
                    organ = id,
                    default = self.fallback.default_organ_id(),
                    error = %e,
                    "Organ fetch failed, using fallback data"
                );
                (self.fallback.organ(id), DataOrigin::Fallback)
            }
        };

        tracing::info!(requested = id, bound = %organ.id, subparts = organ.subparts.len(), "Binding organ");
        let effect = self
            .dispatch(Action::BindOrgan {
                organ,
                origin,
                generation,
            })
            .await;
        self.run_effect(effect).await;
    }

    pub async fn select_subpart(&self, index: usize) -> Result<(), ViewError> {
        let effect = self.model.apply(Action::SelectSubpart(index)).await?;
        self.run_effect(effect).await;
        Ok(())
    }

    pub async fn load_library(&self) {
        let fetched = self.service.catalog().await;
        log_api_result!("catalog", fetched);
        let (entries, origin) = match fetched {
            Ok(entries) => (entries, DataOrigin::Live),
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed, using demo catalog");
                (self.fallback.catalog(), DataOrigin::Fallback)
            }
        };
        tracing::debug!(entries = entries.len(), ?origin, "Catalog loaded");
        self.dispatch(Action::SetCatalog { entries, origin }).await;
    }

    /// Pick an organ by hand; it follows the same path as a detection
    pub async fn activate_catalog_entry(&self, index: usize) -> Result<(), ViewError> {
        let entry = self
            .model
            .snapshot()
            .await
            .catalog
            .get(index)
            .cloned()
            .ok_or(ViewError::CatalogOutOfRange(index))?;

        tracing::info!(organ = %entry.id, "Catalog entry activated");
        self.switch_section(Section::Scan).await;
        self.show_results(UploadResult::manual(entry.id)).await;
        Ok(())
    }

    pub async fn check_backend(&self) {
        let health = match self.service.health().await {
            Ok(message) => {
                tracing::info!(message = %message, "Scan backend online");
                BackendHealth::Online(message)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Scan backend unreachable, running on fallback data");
                BackendHealth::Offline
            }
        };
        self.dispatch(Action::SetBackendHealth(health)).await;
    }

    /// Auto-clear the notice once its lifetime has passed
    pub async fn expire_notice(&self, now: Instant) {
        self.dispatch(Action::ExpireNotice(now)).await;
    }

    pub async fn toggle_accessibility(&self) {
        self.dispatch(Action::ToggleContrast).await;
        self.dispatch(Action::RaiseNotice(Notice::info("Accessibility features toggled"))).await;
    }

    pub async fn show_settings(&self) {
        self.dispatch(Action::RaiseNotice(Notice::info("Settings panel coming soon!"))).await;
    }

    pub async fn open_camera(&self) {
        self.dispatch(Action::RaiseNotice(Notice::info(
            "Camera feature coming soon! Please upload an image file.",
        )))
        .await;
    }
}

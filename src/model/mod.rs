//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (sections, notices, upload state)
//! - `organ`: Organ, subpart, catalog and upload records
//! - `fallback`: Embedded offline dataset
//! - `markup`: SVG model parsing and highlight composition
//! - `silhouette`: Body schematic with organ highlight
//! - `presenter`: Pure organ/subpart to view-model transforms
//! - `playback`: Narration playback state
//! - `api_client`: Scan backend HTTP client
//! - `app_state`: State record and reducer
//! - `app_model`: Shared state container

mod types;
mod organ;
mod fallback;
pub mod markup;
pub mod silhouette;
pub mod presenter;
mod playback;
mod api_client;
mod app_state;
mod app_model;

// Re-export all public types for convenient access
pub use types::{
    BackendHealth, DataOrigin, Detection, Focus, Notice, NoticeKind, Section,
};

pub use organ::{CatalogEntry, Organ, UploadResult};

pub use fallback::FallbackData;

pub use playback::{clamp_rate, BackendKind, PlaybackState, PlaybackStatus};

pub use api_client::{expand_path, ApiClient, ImageFile, ScanService};

pub use app_state::{Action, AppState, Effect};

pub use app_model::AppModel;

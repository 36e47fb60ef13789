//! Error types for the data, view and narration layers

use thiserror::Error;

/// Failures talking to the scan backend or preparing an upload
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("{0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures loading the fallback data asset
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Default organ '{0}' is missing from the fallback data")]
    MissingDefault(String),
}

/// Rejected state transitions in the view controller
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("No organ is loaded")]
    NoOrgan,

    #[error("Subpart {index} is not part of the current organ ({count} subparts)")]
    SubpartOutOfRange { index: usize, count: usize },

    #[error("Catalog entry {0} does not exist")]
    CatalogOutOfRange(usize),

    #[error("An upload is already in progress")]
    UploadInFlight,
}

/// Narration playback failures
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("Nothing is loaded")]
    NothingLoaded,

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

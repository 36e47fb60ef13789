//! Core type definitions for the application

use std::time::{Duration, Instant};

/// How long a notice banner stays up before it clears itself
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

/// Top-level navigation sections, one per tab
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Scan,
    Explore,
    Quiz,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Scan, Section::Explore, Section::Quiz];

    pub fn next(self) -> Self {
        match self {
            Section::Scan => Section::Explore,
            Section::Explore => Section::Quiz,
            Section::Quiz => Section::Scan,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Section::Scan => Section::Quiz,
            Section::Explore => Section::Scan,
            Section::Quiz => Section::Explore,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Scan => "Scan",
            Section::Explore => "Explore",
            Section::Quiz => "Quiz",
        }
    }
}

/// Which widget of the Scan section receives keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    PathInput,
    Subparts,
}

/// Where the bound organ or catalog came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    Fallback,
}

/// Reachability of the scan backend, checked at start-up
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum BackendHealth {
    #[default]
    Unknown,
    Online(String),
    Offline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

/// Transient banner shown over the UI
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTICE_LIFETIME
    }
}

/// Organ identifier and confidence currently shown in the results area
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub organ_id: String,
    pub confidence: f64,
}

/// State of the upload control
#[derive(Clone, Debug, Default)]
pub struct UploadState {
    pub path_input: String,
    pub processing: bool,
}

//! Application state record and its reducer
//!
//! `AppState` is a plain value: the view renders a clone of it, and every
//! change goes through `AppState::reduce`, which returns the follow-up work
//! the controller has to carry out.

use std::sync::Arc;
use std::time::Instant;

use super::organ::{CatalogEntry, Organ, Subpart};
use super::types::{BackendHealth, DataOrigin, Detection, Focus, Notice, Section, UploadState};
use crate::error::ViewError;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub section: Section,
    pub focus: Focus,
    pub upload: UploadState,
    pub results_visible: bool,
    pub detection: Option<Detection>,
    pub organ: Option<Arc<Organ>>,
    pub organ_origin: Option<DataOrigin>,
    pub subpart_index: Option<usize>,
    pub organ_generation: u64,
    pub catalog: Vec<CatalogEntry>,
    pub catalog_selected: usize,
    pub catalog_origin: Option<DataOrigin>,
    pub notice: Option<Notice>,
    pub high_contrast: bool,
    pub show_help: bool,
    pub backend_health: BackendHealth,
    pub should_quit: bool,
}

#[derive(Clone, Debug)]
pub enum Action {
    SwitchSection(Section),
    CycleSection { forward: bool },
    SetFocus(Focus),
    InputChar(char),
    InputBackspace,
    InputClear,
    BeginUpload,
    EndUpload,
    /// Show a detection and register the organ load that follows it
    ShowResults(Detection),
    BeginOrganLoad,
    BindOrgan {
        organ: Organ,
        origin: DataOrigin,
        generation: u64,
    },
    SelectSubpart(usize),
    MoveSubpart { forward: bool },
    SetCatalog {
        entries: Vec<CatalogEntry>,
        origin: DataOrigin,
    },
    MoveCatalog { forward: bool },
    RaiseNotice(Notice),
    DismissNotice,
    ExpireNotice(Instant),
    ToggleContrast,
    SetHelp(bool),
    SetBackendHealth(BackendHealth),
    Quit,
}

/// Work the controller must do after a state change
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    None,
    /// A subpart became current; speak its name
    Narrate(String),
    /// An organ load was registered under this generation
    OrganLoadStarted(u64),
    /// The completion belonged to a superseded load and was dropped
    Stale,
}

impl AppState {
    pub fn current_organ(&self) -> Option<&Organ> {
        self.organ.as_deref()
    }

    pub fn current_subpart(&self) -> Option<&Subpart> {
        let organ = self.organ.as_deref()?;
        organ.subparts.get(self.subpart_index?)
    }

    pub fn selected_catalog_entry(&self) -> Option<&CatalogEntry> {
        self.catalog.get(self.catalog_selected)
    }

    pub fn reduce(&mut self, action: Action) -> Result<Effect, ViewError> {
        match action {
            Action::SwitchSection(section) => {
                self.section = section;
            }
            Action::CycleSection { forward } => {
                self.section = if forward { self.section.next() } else { self.section.prev() };
            }
            Action::SetFocus(focus) => {
                self.focus = focus;
            }
            Action::InputChar(c) => {
                self.upload.path_input.push(c);
            }
            Action::InputBackspace => {
                self.upload.path_input.pop();
            }
            Action::InputClear => {
                self.upload.path_input.clear();
            }
            Action::BeginUpload => {
                if self.upload.processing {
                    return Err(ViewError::UploadInFlight);
                }
                self.upload.processing = true;
            }
            Action::EndUpload => {
                self.upload.processing = false;
            }
            Action::ShowResults(detection) => {
                self.results_visible = true;
                self.detection = Some(detection);
                self.organ_generation += 1;
                return Ok(Effect::OrganLoadStarted(self.organ_generation));
            }
            Action::BeginOrganLoad => {
                self.organ_generation += 1;
                return Ok(Effect::OrganLoadStarted(self.organ_generation));
            }
            Action::BindOrgan {
                organ,
                origin,
                generation,
            } => {
                if generation != self.organ_generation {
                    return Ok(Effect::Stale);
                }
                let first = organ.subparts.first().map(|s| s.name.clone());
                self.subpart_index = first.as_ref().map(|_| 0);
                self.organ = Some(Arc::new(organ));
                self.organ_origin = Some(origin);
                self.focus = Focus::Subparts;
                return Ok(first.map(Effect::Narrate).unwrap_or(Effect::None));
            }
            Action::SelectSubpart(index) => {
                let organ = self.organ.as_deref().ok_or(ViewError::NoOrgan)?;
                let subpart = organ.subparts.get(index).ok_or(ViewError::SubpartOutOfRange {
                    index,
                    count: organ.subparts.len(),
                })?;
                let name = subpart.name.clone();
                self.subpart_index = Some(index);
                return Ok(Effect::Narrate(name));
            }
            Action::MoveSubpart { forward } => {
                let organ = self.organ.as_deref().ok_or(ViewError::NoOrgan)?;
                let count = organ.subparts.len();
                let Some(current) = self.subpart_index else {
                    return Ok(Effect::None);
                };
                let next = if forward {
                    (current + 1).min(count.saturating_sub(1))
                } else {
                    current.saturating_sub(1)
                };
                if next == current {
                    return Ok(Effect::None);
                }
                return self.reduce(Action::SelectSubpart(next));
            }
            Action::SetCatalog { entries, origin } => {
                self.catalog = entries;
                self.catalog_selected = 0;
                self.catalog_origin = Some(origin);
            }
            Action::MoveCatalog { forward } => {
                if forward {
                    if self.catalog_selected < self.catalog.len().saturating_sub(1) {
                        self.catalog_selected += 1;
                    }
                } else if self.catalog_selected > 0 {
                    self.catalog_selected -= 1;
                }
            }
            Action::RaiseNotice(notice) => {
                self.notice = Some(notice);
            }
            Action::DismissNotice => {
                self.notice = None;
            }
            Action::ExpireNotice(now) => {
                if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
                    self.notice = None;
                }
            }
            Action::ToggleContrast => {
                self.high_contrast = !self.high_contrast;
            }
            Action::SetHelp(show) => {
                self.show_help = show;
            }
            Action::SetBackendHealth(health) => {
                self.backend_health = health;
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
        Ok(Effect::None)
    }
}

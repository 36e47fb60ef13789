//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It only draws; every string and shape comes from `model::presenter`,
//! `model::silhouette` and `model::markup`. It is organized into submodules
//! by component type:
//!
//! - `utils`: Theme, formatting and list helpers
//! - `layout`: Tab bar, API status, quiz placeholder
//! - `scan`: Upload, results, body map and organ explorer
//! - `explore`: Organ catalog
//! - `progress`: Narration progress bar
//! - `overlays`: Modal overlays (notice, help)

mod utils;
mod layout;
mod scan;
mod explore;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{AppState, PlaybackState, Section};
use utils::Theme;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, state: &AppState, playback: &PlaybackState) {
        let theme = Theme::new(state.high_contrast);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs + API status
                Constraint::Min(0),    // Active section
                Constraint::Length(3), // Narration progress
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], state, &theme);

        match state.section {
            Section::Scan => scan::render_scan(frame, chunks[1], state, &theme),
            Section::Explore => explore::render_explore(frame, chunks[1], state, &theme),
            Section::Quiz => layout::render_quiz(frame, chunks[1], &theme),
        }

        progress::render_progress_bar(frame, chunks[2], playback, &theme);

        if let Some(notice) = &state.notice {
            overlays::render_notice(frame, notice, &theme);
        }

        if state.show_help {
            overlays::render_help_popup(frame, &theme);
        }
    }
}

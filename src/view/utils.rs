//! Utility functions for rendering UI components

use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Padding},
    Frame,
};

/// Palette for the normal and high-contrast modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub outline: Color,
    pub highlight: Color,
    pub error: Color,
    pub info: Color,
}

impl Theme {
    pub fn new(high_contrast: bool) -> Self {
        if high_contrast {
            Self {
                accent: Color::Yellow,
                text: Color::White,
                muted: Color::White,
                outline: Color::White,
                highlight: Color::Yellow,
                error: Color::LightRed,
                info: Color::Yellow,
            }
        } else {
            Self {
                accent: Color::Green,
                text: Color::White,
                muted: Color::DarkGray,
                outline: Color::Gray,
                highlight: Color::Red,
                error: Color::Red,
                info: Color::Cyan,
            }
        }
    }

    pub fn panel<'a>(&self, title: impl Into<String>, focused: bool) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title.into()))
            .padding(Padding::horizontal(1))
            .border_style(if focused {
                Style::default().fg(self.accent)
            } else {
                Style::default()
            })
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Rectangle of at most `width` x `height` centered in `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0:00");
        assert_eq!(format_duration(Duration::from_millis(65_900)), "1:05");
        assert_eq!(format_duration(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Left Ventricle", 20), "Left Ventricle");
        assert_eq!(truncate_string("Left Ventricle", 8), "Left ...");
    }

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(area, 60, 20);
        assert_eq!(popup, Rect::new(2, 2, 36, 6));
    }
}

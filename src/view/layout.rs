//! Layout rendering (tab bar, API status, quiz placeholder)

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::model::{AppState, BackendHealth, Section};
use super::utils::{truncate_string, Theme};

pub fn render_top_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Section tabs
            Constraint::Length(34), // API status
        ])
        .split(area);

    let titles: Vec<Line> = Section::ALL
        .iter()
        .enumerate()
        .map(|(i, section)| Line::from(format!("{} {}", i + 1, section.title())))
        .collect();
    let selected = Section::ALL.iter().position(|s| *s == state.section).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme.text))
        .highlight_style(theme.selected().add_modifier(Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" ScanSpectrum ")
                .border_style(Style::default().fg(theme.accent)),
        );
    frame.render_widget(tabs, chunks[0]);

    let (status, color) = match &state.backend_health {
        BackendHealth::Unknown => ("Checking API...".to_string(), theme.muted),
        BackendHealth::Online(message) => (format!("● {}", truncate_string(message, 26)), theme.accent),
        BackendHealth::Offline => ("○ Offline - demo data".to_string(), theme.error),
    };
    let api = Paragraph::new(status)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(" API "));
    frame.render_widget(api, chunks[1]);
}

pub fn render_quiz(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from("Quiz mode is coming soon!").style(theme.selected()),
        Line::from(""),
        Line::from("Explore organs and their structures to get ready."),
    ];
    let quiz = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.text))
        .block(theme.panel("Quiz", true));
    frame.render_widget(quiz, area);
}

//! Explore section: organ catalog

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
    Frame,
};

use crate::model::presenter::catalog_cards;
use crate::model::{AppState, DataOrigin};
use super::utils::{render_scrollable_list, Theme};

pub fn render_explore(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let title = match state.catalog_origin {
        Some(DataOrigin::Fallback) => "Organ library (demo) - Enter to explore",
        _ => "Organ library - Enter to explore",
    };

    if state.catalog.is_empty() {
        let loading = Paragraph::new("Loading organ library...")
            .style(Style::default().fg(theme.muted))
            .block(theme.panel(title, true));
        frame.render_widget(loading, area);
        return;
    }

    let items: Vec<ListItem> = catalog_cards(&state.catalog, state.catalog_selected)
        .into_iter()
        .map(|card| {
            let title_style = if card.selected { theme.selected() } else { Style::default().fg(theme.text) };
            let marker = if card.selected { "▶ " } else { "  " };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{marker}{}", card.title), title_style)),
                Line::from(Span::styled(format!("    {}", card.system), Style::default().fg(theme.info))),
                Line::from(Span::styled(format!("    {}", card.description), Style::default().fg(theme.muted))),
                Line::from(""),
            ])
        })
        .collect();

    render_scrollable_list(frame, area, items, state.catalog_selected, theme.panel(title, true));
}

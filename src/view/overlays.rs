//! Overlay rendering (notice banner, help popup)

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{Notice, NoticeKind};
use super::utils::{centered_rect, Theme};

pub fn render_notice(frame: &mut Frame, notice: &Notice, theme: &Theme) {
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    // Lines the message takes once wrapped
    let line_count = notice.message.chars().count().div_ceil(inner_width) as u16;
    let popup_area = centered_rect(area, popup_width, 2 + line_count.max(1));

    let (color, title) = match notice.kind {
        NoticeKind::Error => (theme.error, " Error (Esc to dismiss) "),
        NoticeKind::Info => (theme.info, " Info (Esc to dismiss) "),
    };

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(notice.message.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(ratatui::style::Color::Black)),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("1 / 2 / 3", "Scan / Explore / Quiz"),
        ("↑ / ↓", "Move structure or organ selection"),
        ("Enter", "Explore the selected organ"),
        ("", ""),
        ("", "── Scan ──"),
        ("/", "Type an image path"),
        ("Enter", "Upload the typed image"),
        ("Esc", "Leave the path input"),
        ("", ""),
        ("", "── Narration ──"),
        ("Space", "Play / Pause"),
        ("← / →", "Seek 5 seconds"),
        ("[ / ]", "Slower / faster"),
        ("", ""),
        ("", "── General ──"),
        ("A", "Toggle high contrast"),
        ("S", "Settings"),
        ("C", "Camera"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_area = centered_rect(area, 62, keybindings.len() as u16 + 2);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(theme.info).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(format!("{:>18}", key), theme.selected()),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(theme.text)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.info))
            .title(" Help (H or Esc to close) ")
            .title_style(Style::default().fg(theme.info).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(ratatui::style::Color::Black)),
    );

    frame.render_widget(help_text, popup_area);
}

//! Narration progress bar rendering

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackState, PlaybackStatus};
use super::utils::{format_duration, truncate_string, Theme};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackState, theme: &Theme) {
    let status_text = match (playback.status, playback.backend) {
        (_, None) => " No narration".to_string(),
        (PlaybackStatus::Playing, _) => format!(" ▶ {}", truncate_string(&playback.label, 48)),
        (PlaybackStatus::Paused, _) => format!(" ⏸  {}", truncate_string(&playback.label, 48)),
        (PlaybackStatus::Idle, _) => format!(" ■ {}", truncate_string(&playback.label, 48)),
    };

    let time_str = match playback.duration {
        Some(total) => format!("{} / {}", format_duration(playback.position), format_duration(total)),
        None => format_duration(playback.position),
    };

    let backend = playback.backend.map(|b| b.name()).unwrap_or("-");
    let controls_info = format!(" {} | Rate: {:.2}x | Space ←→ [ ] ", backend, playback.rate);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(theme.accent))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}

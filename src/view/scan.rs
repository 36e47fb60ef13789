//! Scan section: upload input, detection results, body map and organ explorer

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle},
        ListItem, Paragraph, Wrap,
    },
    Frame,
};

use crate::model::markup::{ShapeKind, VectorModel};
use crate::model::presenter::{
    base_model, confidence_label, detection_label, organ_header, subpart_detail, subpart_rows,
};
use crate::model::silhouette::{render_silhouette, Figure, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::model::{AppState, Focus, Organ};
use super::utils::{render_scrollable_list, Theme};

const ELLIPSE_SEGMENTS: usize = 36;

pub fn render_scan(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path input
            Constraint::Length(4), // Detection results
            Constraint::Min(0),    // Body map
        ])
        .split(columns[0]);

    render_upload_input(frame, left[0], state, theme);
    render_results(frame, left[1], state, theme);
    render_body_map(frame, left[2], state, theme);

    match state.current_organ() {
        Some(organ) => render_organ(frame, columns[1], state, organ, theme),
        None => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from("Type the path of a scan image and press Enter,"),
                Line::from("or pick an organ in the Explore tab."),
            ])
            .style(Style::default().fg(theme.muted))
            .block(theme.panel("Organ", false));
            frame.render_widget(hint, columns[1]);
        }
    }
}

fn render_upload_input(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let focused = state.focus == Focus::PathInput;
    let text = if state.upload.path_input.is_empty() && !focused {
        Span::styled("Press / to type an image path...", Style::default().fg(theme.muted))
    } else if focused {
        Span::styled(format!("{}▏", state.upload.path_input), Style::default().fg(theme.accent))
    } else {
        Span::styled(state.upload.path_input.clone(), Style::default().fg(theme.text))
    };

    let input = Paragraph::new(Line::from(text)).block(theme.panel("Upload scan", focused));
    frame.render_widget(input, area);
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let lines = if state.upload.processing {
        vec![Line::from(Span::styled(
            "⏳ Analyzing image...",
            Style::default().fg(theme.info).add_modifier(Modifier::BOLD),
        ))]
    } else if let (true, Some(detection)) = (state.results_visible, state.detection.as_ref()) {
        vec![
            Line::from(Span::styled(detection_label(detection), theme.selected())),
            Line::from(Span::styled(confidence_label(detection), Style::default().fg(theme.text))),
        ]
    } else {
        vec![Line::from(Span::styled("No scan analyzed yet", Style::default().fg(theme.muted)))]
    };

    let results = Paragraph::new(lines).block(theme.panel("Results", false));
    frame.render_widget(results, area);
}

fn render_body_map(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let organ_id = match (&state.detection, state.results_visible) {
        (Some(detection), true) => Some(detection.organ_id.clone()),
        _ => None,
    };
    let silhouette = organ_id.as_deref().map(render_silhouette);
    let outline = theme.outline;
    let highlight = theme.highlight;

    let canvas = Canvas::default()
        .block(theme.panel("Body map", false))
        .marker(Marker::Braille)
        .x_bounds([0.0, CANVAS_WIDTH])
        .y_bounds([0.0, CANVAS_HEIGHT])
        .paint(move |ctx| {
            let Some(silhouette) = &silhouette else {
                for figure in &render_silhouette("").body {
                    draw_figure(ctx, figure, outline);
                }
                return;
            };
            for figure in &silhouette.body {
                draw_figure(ctx, figure, outline);
            }
            ctx.layer();
            for figure in &silhouette.highlight {
                draw_figure(ctx, figure, highlight);
            }
        });
    frame.render_widget(canvas, area);
}

fn render_organ(frame: &mut Frame, area: Rect, state: &AppState, organ: &Organ, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),      // Header
            Constraint::Percentage(45), // Model + subpart list
            Constraint::Min(0),         // Detail
        ])
        .split(area);

    let header = organ_header(organ, state.organ_origin);
    let header_lines = vec![
        Line::from(vec![
            Span::styled(format!("{} {}", header.emoji, header.title).trim().to_string(), theme.selected()),
            Span::styled(format!("  {} · {}", header.system, header.source), Style::default().fg(theme.muted)),
        ]),
        Line::from(Span::styled(header.description, Style::default().fg(theme.text))),
    ];
    let header_widget = Paragraph::new(header_lines)
        .wrap(Wrap { trim: true })
        .block(theme.panel("Organ", false));
    frame.render_widget(header_widget, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let detail = state.current_subpart().map(|subpart| subpart_detail(organ, subpart));
    let model = match &detail {
        Some(detail) => detail.model.clone(),
        None => base_model(organ),
    };
    render_model(frame, middle[0], model, theme);
    render_subpart_list(frame, middle[1], state, organ, theme);

    let detail_lines = match detail {
        Some(detail) => {
            let mut lines = vec![
                Line::from(Span::styled(format!("{}. {}", detail.number, detail.name), theme.selected())),
                Line::from(Span::styled(
                    detail.highlight_caption,
                    Style::default().fg(theme.highlight).add_modifier(Modifier::ITALIC),
                )),
                Line::from(vec![
                    Span::styled("Function: ", Style::default().fg(theme.muted)),
                    Span::raw(detail.function),
                ]),
                Line::from(""),
                Line::from(detail.anatomy),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Clinical importance: ", Style::default().fg(theme.muted)),
                    Span::raw(detail.clinical_importance),
                ]),
                Line::from(vec![
                    Span::styled("Anatomical fact: ", Style::default().fg(theme.muted)),
                    Span::raw(detail.fact),
                ]),
            ];
            if let Some(dimensions) = detail.dimensions {
                lines.push(Line::from(vec![
                    Span::styled("Dimensions: ", Style::default().fg(theme.muted)),
                    Span::raw(dimensions),
                ]));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "This organ has no structures to explore",
            Style::default().fg(theme.muted),
        ))],
    };
    let detail_widget = Paragraph::new(detail_lines)
        .style(Style::default().fg(theme.text))
        .wrap(Wrap { trim: false })
        .block(theme.panel("Structure", false));
    frame.render_widget(detail_widget, rows[2]);
}

fn render_subpart_list(frame: &mut Frame, area: Rect, state: &AppState, organ: &Organ, theme: &Theme) {
    let focused = state.focus == Focus::Subparts;
    let items: Vec<ListItem> = subpart_rows(organ, state.subpart_index)
        .into_iter()
        .map(|row| {
            let style = if row.active { theme.selected() } else { Style::default().fg(theme.text) };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{:>2}. {}", row.badge, row.name), style)),
                Line::from(Span::styled(format!("    {}", row.function), Style::default().fg(theme.muted))),
            ])
        })
        .collect();

    render_scrollable_list(
        frame,
        area,
        items,
        state.subpart_index.unwrap_or(0),
        theme.panel("Structures (↑↓)", focused),
    );
}

fn render_model(frame: &mut Frame, area: Rect, model: Option<VectorModel>, theme: &Theme) {
    let Some(model) = model else {
        let empty = Paragraph::new("No model available")
            .style(Style::default().fg(theme.muted))
            .block(theme.panel("Model", false));
        frame.render_widget(empty, area);
        return;
    };

    let (width, height) = (model.width, model.height);
    let outline = theme.outline;
    let highlight = theme.highlight;
    let text = theme.text;

    let canvas = Canvas::default()
        .block(theme.panel("Model", false))
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for shape in model.shapes.iter().filter(|s| !s.highlighted) {
                draw_shape(ctx, &shape.kind, height, outline, text);
            }
            ctx.layer();
            for shape in model.shapes.iter().filter(|s| s.highlighted) {
                draw_shape(ctx, &shape.kind, height, highlight, text);
            }
        });
    frame.render_widget(canvas, area);
}

/// Silhouette figures use a top-left origin; the canvas grows upwards
fn draw_figure(ctx: &mut Context, figure: &Figure, color: Color) {
    match figure {
        Figure::Circle { x, y, radius } => ctx.draw(&Circle {
            x: *x,
            y: CANVAS_HEIGHT - y,
            radius: *radius,
            color,
        }),
        Figure::Rect { x, y, width, height } => ctx.draw(&Rectangle {
            x: *x,
            y: CANVAS_HEIGHT - y - height,
            width: *width,
            height: *height,
            color,
        }),
        Figure::Polyline(points) => draw_polyline(ctx, points, CANVAS_HEIGHT, color),
    }
}

fn draw_shape(ctx: &mut Context, kind: &ShapeKind, height: f64, color: Color, text: Color) {
    match kind {
        ShapeKind::Ellipse { cx, cy, rx, ry } => {
            let points: Vec<(f64, f64)> = (0..=ELLIPSE_SEGMENTS)
                .map(|i| {
                    let t = i as f64 / ELLIPSE_SEGMENTS as f64 * std::f64::consts::TAU;
                    (cx + rx * t.cos(), cy + ry * t.sin())
                })
                .collect();
            draw_polyline(ctx, &points, height, color);
        }
        ShapeKind::Circle { cx, cy, r } => ctx.draw(&Circle {
            x: *cx,
            y: height - cy,
            radius: *r,
            color,
        }),
        ShapeKind::Rect { x, y, width, height: h } => ctx.draw(&Rectangle {
            x: *x,
            y: height - y - h,
            width: *width,
            height: *h,
            color,
        }),
        ShapeKind::Outline(points) => draw_polyline(ctx, points, height, color),
        ShapeKind::Label { x, y, text: label } => {
            ctx.print(*x, height - y, Line::styled(label.clone(), Style::default().fg(text)));
        }
    }
}

fn draw_polyline(ctx: &mut Context, points: &[(f64, f64)], height: f64, color: Color) {
    for pair in points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        ctx.draw(&CanvasLine::new(x1, height - y1, x2, height - y2, color));
    }
}

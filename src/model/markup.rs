//! Minimal reader for the SVG organ models and subpart highlight overlays
//!
//! Only the handful of elements the organ models use are understood
//! (`ellipse`, `circle`, `rect`, `path`, `text`). Paths are reduced to the
//! polyline through their coordinate pairs. Everything else is skipped.

const DEFAULT_WIDTH: f64 = 400.0;
const DEFAULT_HEIGHT: f64 = 300.0;

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Outline(Vec<(f64, f64)>),
    Label { x: f64, y: f64, text: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelShape {
    pub id: Option<String>,
    pub kind: ShapeKind,
    pub highlighted: bool,
}

/// Parsed organ model in its own coordinate space (origin top-left)
#[derive(Clone, Debug, PartialEq)]
pub struct VectorModel {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<ModelShape>,
}

impl VectorModel {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn highlighted_ids(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .filter(|s| s.highlighted)
            .filter_map(|s| s.id.as_deref())
            .collect()
    }
}

pub fn parse_model(markup: &str) -> VectorModel {
    let mut model = VectorModel {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        shapes: Vec::new(),
    };

    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        let Some(end) = rest.find('>') else { break };
        let tag = &rest[..end];
        let after = &rest[end + 1..];

        if tag.starts_with('/') || tag.starts_with('!') || tag.starts_with('?') {
            rest = after;
            continue;
        }

        let name_end = tag
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(tag.len());
        let name = &tag[..name_end];
        let attrs = parse_attributes(&tag[name_end..]);
        let attr = |key: &str| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
        let num = |key: &str| attr(key).and_then(parse_number).unwrap_or(0.0);
        let id = attr("id").map(str::to_string);

        let kind = match name {
            "svg" => {
                apply_viewport(&mut model, attr("viewBox"), attr("width"), attr("height"));
                None
            }
            "ellipse" => Some(ShapeKind::Ellipse {
                cx: num("cx"),
                cy: num("cy"),
                rx: num("rx"),
                ry: num("ry"),
            }),
            "circle" => Some(ShapeKind::Circle {
                cx: num("cx"),
                cy: num("cy"),
                r: num("r"),
            }),
            "rect" => Some(ShapeKind::Rect {
                x: num("x"),
                y: num("y"),
                width: num("width"),
                height: num("height"),
            }),
            "path" => {
                let points = attr("d").map(path_points).unwrap_or_default();
                (points.len() > 1).then_some(ShapeKind::Outline(points))
            }
            "text" => {
                let content_end = after.find("</text>").unwrap_or(after.len());
                let text = after[..content_end].trim().to_string();
                (!text.is_empty()).then(|| ShapeKind::Label {
                    x: num("x"),
                    y: num("y"),
                    text,
                })
            }
            _ => None,
        };

        if let Some(kind) = kind {
            model.shapes.push(ModelShape {
                id,
                kind,
                highlighted: false,
            });
        }
        rest = after;
    }

    model
}

/// Element ids targeted by `#id { ... }` rules inside an overlay's `<style>` blocks
pub fn highlight_targets(overlay: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    let mut segment_start = 0;

    for (i, c) in overlay.char_indices() {
        match c {
            '{' => {
                let selector = &overlay[segment_start..i];
                for token in selector.split(|c: char| c == ',' || c.is_whitespace()) {
                    let Some(stripped) = token.strip_prefix('#') else { continue };
                    let id: String = stripped
                        .chars()
                        .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                        .collect();
                    if !id.is_empty() && !targets.contains(&id) {
                        targets.push(id);
                    }
                }
                segment_start = i + 1;
            }
            '}' | ';' | '>' => segment_start = i + 1,
            _ => {}
        }
    }

    targets
}

/// Base model with a subpart overlay drawn on top.
///
/// Base shapes named by the overlay's rules are flagged as highlighted, and
/// any shapes the overlay itself carries are appended highlighted.
pub fn compose(base: &VectorModel, overlay: Option<&str>) -> VectorModel {
    let mut composed = base.clone();
    let Some(overlay) = overlay else {
        return composed;
    };

    let targets = highlight_targets(overlay);
    for shape in &mut composed.shapes {
        if let Some(id) = &shape.id {
            shape.highlighted = targets.iter().any(|t| t == id);
        }
    }

    let extra = parse_model(overlay);
    composed.shapes.extend(extra.shapes.into_iter().map(|mut shape| {
        shape.highlighted = true;
        shape
    }));

    composed
}

fn apply_viewport(model: &mut VectorModel, view_box: Option<&str>, width: Option<&str>, height: Option<&str>) {
    if let Some(view_box) = view_box {
        let values: Vec<f64> = view_box
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(parse_number)
            .collect();
        if let [_, _, w, h] = values[..] {
            if w > 0.0 && h > 0.0 {
                model.width = w;
                model.height = h;
                return;
            }
        }
    }
    if let Some(w) = width.and_then(parse_number).filter(|w| *w > 0.0) {
        model.width = w;
    }
    if let Some(h) = height.and_then(parse_number).filter(|h| *h > 0.0) {
        model.height = h;
    }
}

fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = source;

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim().trim_start_matches('/').trim().to_string();
        let value_part = rest[eq + 1..].trim_start();
        let Some(quote) = value_part.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let value_body = &value_part[1..];
        let Some(close) = value_body.find(quote) else { break };
        attrs.push((key, value_body[..close].to_string()));
        rest = &value_body[close + 1..];
    }

    attrs
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().trim_end_matches("px").parse().ok()
}

/// Every coordinate pair in `d`, read as absolute points. Relative commands
/// and arc flags are not interpreted.
fn path_points(d: &str) -> Vec<(f64, f64)> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    for c in d.chars() {
        let after_exponent = current.ends_with(['e', 'E']);
        if c.is_ascii_digit()
            || c == '.'
            || (c == '-' && (current.is_empty() || after_exponent))
            || (matches!(c, 'e' | 'E') && current.chars().any(|ch| ch.is_ascii_digit()))
        {
            current.push(c);
        } else {
            if let Ok(n) = current.parse::<f64>() {
                numbers.push(n);
            }
            current.clear();
            if c == '-' {
                current.push(c);
            }
        }
    }
    if let Ok(n) = current.parse::<f64>() {
        numbers.push(n);
    }

    let mut points: Vec<(f64, f64)> = numbers.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    if d.trim_end().ends_with(['Z', 'z']) {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
        <svg width="400" height="300" viewBox="0 0 400 300" xmlns="http://www.w3.org/2000/svg">
            <defs><linearGradient id="g"><stop offset="0%"/></linearGradient></defs>
            <path d="M200,120 Q250,80 280,120Z" fill="url(#g)" id="outline"/>
            <ellipse cx="170" cy="140" rx="25" ry="35" id="right-atrium"/>
            <ellipse cx="230" cy="190" rx="30" ry="25" id="left-ventricle"/>
            <text x="170" y="135" text-anchor="middle">RA</text>
        </svg>
    "#;

    const OVERLAY: &str = r#"
        <style>
            @keyframes highlightRA {
                0%, 100% { fill: #f87171; opacity: 0.8; }
                50% { fill: #fef3c7; opacity: 1; stroke: #d97706; stroke-width: 3; }
            }
            #right-atrium {
                animation: highlightRA 2s infinite;
            }
        </style>
    "#;

    #[test]
    fn test_parse_model_shapes() {
        let model = parse_model(MODEL);
        assert_eq!(model.width, 400.0);
        assert_eq!(model.height, 300.0);
        assert_eq!(model.shapes.len(), 4);

        assert_eq!(
            model.shapes[0].kind,
            ShapeKind::Outline(vec![(200.0, 120.0), (250.0, 80.0), (280.0, 120.0), (200.0, 120.0)])
        );
        assert_eq!(model.shapes[1].id.as_deref(), Some("right-atrium"));
        assert_eq!(
            model.shapes[1].kind,
            ShapeKind::Ellipse { cx: 170.0, cy: 140.0, rx: 25.0, ry: 35.0 }
        );
        assert_eq!(
            model.shapes[3].kind,
            ShapeKind::Label { x: 170.0, y: 135.0, text: "RA".to_string() }
        );
    }

    #[test]
    fn test_highlight_targets_ignore_colours() {
        assert_eq!(highlight_targets(OVERLAY), vec!["right-atrium".to_string()]);
        assert!(highlight_targets("").is_empty());
    }

    #[test]
    fn test_compose_marks_targets_only() {
        let base = parse_model(MODEL);
        let composed = compose(&base, Some(OVERLAY));
        assert_eq!(composed.highlighted_ids(), vec!["right-atrium"]);
        assert_eq!(composed.shapes.len(), base.shapes.len());

        let plain = compose(&base, None);
        assert!(plain.highlighted_ids().is_empty());
    }

    #[test]
    fn test_overlay_shapes_are_drawn_on_top() {
        let base = parse_model(MODEL);
        let overlay = r#"<circle cx="10" cy="20" r="5" id="marker"/>"#;
        let composed = compose(&base, Some(overlay));

        let last = composed.shapes.last().unwrap();
        assert!(last.highlighted);
        assert_eq!(last.kind, ShapeKind::Circle { cx: 10.0, cy: 20.0, r: 5.0 });
    }

    #[test]
    fn test_negative_path_coordinates() {
        let model = parse_model(r#"<path d="M-5,10 L20-4"/>"#);
        assert_eq!(model.shapes[0].kind, ShapeKind::Outline(vec![(-5.0, 10.0), (20.0, -4.0)]));
    }

    #[test]
    fn test_exponent_path_coordinates() {
        let model = parse_model(r#"<path d="M1e2,5 L2.5E-1,-3e1"/>"#);
        assert_eq!(model.shapes[0].kind, ShapeKind::Outline(vec![(100.0, 5.0), (0.25, -30.0)]));
    }
}

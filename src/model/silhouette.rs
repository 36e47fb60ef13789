//! Body silhouette schematic with an organ highlight
//!
//! Coordinates live in a 400x350 space with the origin in the top-left corner.

pub const CANVAS_WIDTH: f64 = 400.0;
pub const CANVAS_HEIGHT: f64 = 350.0;

const CURVE_SAMPLES: usize = 12;

#[derive(Clone, Debug, PartialEq)]
pub enum Figure {
    Circle { x: f64, y: f64, radius: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Polyline(Vec<(f64, f64)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Silhouette {
    pub body: Vec<Figure>,
    pub highlight: Vec<Figure>,
}

/// Fixed body outline plus the highlight shape for `organ`
pub fn render_silhouette(organ: &str) -> Silhouette {
    Silhouette {
        body: body_outline(),
        highlight: organ_highlight(organ),
    }
}

fn body_outline() -> Vec<Figure> {
    vec![
        // head
        Figure::Circle { x: 200.0, y: 80.0, radius: 30.0 },
        // torso
        Figure::Rect { x: 170.0, y: 110.0, width: 60.0, height: 120.0 },
        // arms
        Figure::Rect { x: 140.0, y: 110.0, width: 30.0, height: 80.0 },
        Figure::Rect { x: 230.0, y: 110.0, width: 30.0, height: 80.0 },
        // legs
        Figure::Rect { x: 180.0, y: 230.0, width: 25.0, height: 100.0 },
        Figure::Rect { x: 195.0, y: 230.0, width: 25.0, height: 100.0 },
    ]
}

fn organ_highlight(organ: &str) -> Vec<Figure> {
    match organ {
        "heart" => vec![heart_glyph()],
        "brain" => vec![Figure::Circle { x: 200.0, y: 80.0, radius: 25.0 }],
        "lungs" => vec![
            Figure::Rect { x: 160.0, y: 130.0, width: 30.0, height: 60.0 },
            Figure::Rect { x: 210.0, y: 130.0, width: 30.0, height: 60.0 },
        ],
        _ => vec![Figure::Rect { x: 180.0, y: 160.0, width: 40.0, height: 40.0 }],
    }
}

/// Three cubic segments starting and ending at (190, 150)
fn heart_glyph() -> Figure {
    let segments = [
        [(190.0, 150.0), (190.0, 130.0), (210.0, 130.0), (210.0, 150.0)],
        [(210.0, 150.0), (210.0, 170.0), (200.0, 180.0), (190.0, 170.0)],
        [(190.0, 170.0), (180.0, 180.0), (190.0, 170.0), (190.0, 150.0)],
    ];

    let mut points = vec![segments[0][0]];
    for [p0, p1, p2, p3] in segments {
        for step in 1..=CURVE_SAMPLES {
            let t = step as f64 / CURVE_SAMPLES as f64;
            points.push(cubic_bezier(p0, p1, p2, p3, t));
        }
    }
    Figure::Polyline(points)
}

fn cubic_bezier(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    (
        a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
        a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lungs_highlight_is_two_rectangles() {
        let silhouette = render_silhouette("lungs");
        assert_eq!(
            silhouette.highlight,
            vec![
                Figure::Rect { x: 160.0, y: 130.0, width: 30.0, height: 60.0 },
                Figure::Rect { x: 210.0, y: 130.0, width: 30.0, height: 60.0 },
            ]
        );
    }

    #[test]
    fn test_brain_highlight_sits_on_the_head() {
        let silhouette = render_silhouette("brain");
        assert_eq!(silhouette.highlight, vec![Figure::Circle { x: 200.0, y: 80.0, radius: 25.0 }]);
    }

    #[test]
    fn test_heart_glyph_is_a_closed_curve() {
        let silhouette = render_silhouette("heart");
        let Figure::Polyline(points) = &silhouette.highlight[0] else {
            panic!("heart highlight should be a polyline");
        };
        assert_eq!(points.len(), 1 + 3 * CURVE_SAMPLES);
        let first = points[0];
        let last = *points.last().unwrap();
        assert!((first.0 - last.0).abs() < 1e-9 && (first.1 - last.1).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_organ_uses_generic_rectangle() {
        for organ in ["liver", "kidney", ""] {
            assert_eq!(
                render_silhouette(organ).highlight,
                vec![Figure::Rect { x: 180.0, y: 160.0, width: 40.0, height: 40.0 }]
            );
        }
    }

    #[test]
    fn test_body_outline_is_identical_for_every_organ() {
        assert_eq!(render_silhouette("heart").body, render_silhouette("lungs").body);
        assert_eq!(render_silhouette("heart").body.len(), 6);
    }
}

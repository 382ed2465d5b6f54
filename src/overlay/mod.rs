mod raster;

use serde::Serialize;

use crate::geometry::{bounding_box, scale_factor, BoundingBox, Point};
use crate::ocr::OcrResult;
use crate::selection::SelectionState;

const AUTO_STROKE_RATIO: f32 = 0.003;
const MIN_AUTO_STROKE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: clamp_unit(alpha),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn alpha_u8(&self) -> u8 {
        (clamp_unit(self.a) * 255.0).round() as u8
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub mask_color: Rgb,
    pub mask_alpha: f32,
    pub stroke_color: Rgb,
    pub stroke_alpha: f32,
    /// Auto-sized from the surface when `None`.
    pub stroke_width: Option<f32>,
    /// Outline color for the selected block; falls back to `stroke_color`.
    pub highlight_color: Option<Rgb>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            mask_color: Rgb::BLACK,
            mask_alpha: 0.5,
            stroke_color: Rgb::WHITE,
            stroke_alpha: 1.0,
            stroke_width: None,
            highlight_color: None,
        }
    }
}

impl OverlayStyle {
    pub fn resolved_stroke_width(&self, canvas_width: f32, canvas_height: f32) -> f32 {
        self.stroke_width
            .filter(|width| *width > 0.0)
            .unwrap_or_else(|| auto_stroke_width(canvas_width, canvas_height))
    }
}

pub fn auto_stroke_width(canvas_width: f32, canvas_height: f32) -> f32 {
    (canvas_width.min(canvas_height) * AUTO_STROKE_RATIO).max(MIN_AUTO_STROKE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Rect(BoundingBox),
    Polygon { points: Vec<Point> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    BeginLayer { width: f32, height: f32 },
    Fill { shape: Shape, color: Rgba },
    Clear { shape: Shape },
    EndLayer,
    Stroke { shape: Shape, color: Rgba, width: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl OverlayFrame {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Builds the mask-with-holes layer followed by the outline pass. Holes and
/// outlines live in separate passes so clearing never erases a stroke.
pub fn render_overlay(
    result: Option<&OcrResult>,
    selection: SelectionState,
    style: &OverlayStyle,
    canvas_width: f32,
    canvas_height: f32,
) -> OverlayFrame {
    let mut frame = OverlayFrame {
        width: canvas_width,
        height: canvas_height,
        ops: Vec::new(),
    };
    let Some(result) = result else {
        return frame;
    };

    let sx = scale_factor(result.image_width, canvas_width);
    let sy = scale_factor(result.image_height, canvas_height);
    let surface = BoundingBox {
        min_x: 0.0,
        min_y: 0.0,
        max_x: canvas_width,
        max_y: canvas_height,
    };

    frame.ops.push(DrawOp::BeginLayer {
        width: canvas_width,
        height: canvas_height,
    });
    frame.ops.push(DrawOp::Fill {
        shape: Shape::Rect(surface),
        color: style.mask_color.with_alpha(style.mask_alpha),
    });
    for block in &result.blocks {
        let scaled = scale_points(&block.corner_points, sx, sy);
        let hole = if scaled.len() >= 4 {
            Some(Shape::Polygon { points: scaled })
        } else {
            bounding_box(&scaled).map(Shape::Rect)
        };
        if let Some(shape) = hole {
            frame.ops.push(DrawOp::Clear { shape });
        }
    }
    frame.ops.push(DrawOp::EndLayer);

    let width = style.resolved_stroke_width(canvas_width, canvas_height);
    let stroke = style.stroke_color.with_alpha(style.stroke_alpha);
    let highlight = style
        .highlight_color
        .map(|color| color.with_alpha(style.stroke_alpha))
        .unwrap_or(stroke);
    let selected = selection.selected_index();
    for (index, block) in result.blocks.iter().enumerate() {
        if block.corner_points.len() < 4 {
            continue;
        }
        let color = if selected == Some(index) {
            highlight
        } else {
            stroke
        };
        frame.ops.push(DrawOp::Stroke {
            shape: Shape::Polygon {
                points: scale_points(&block.corner_points, sx, sy),
            },
            color,
            width,
        });
    }

    frame
}

fn scale_points(points: &[Point], sx: f32, sy: f32) -> Vec<Point> {
    points.iter().map(|point| point.scaled(sx, sy)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::TextBlock;

    fn quad(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn sample() -> OcrResult {
        OcrResult::new(
            vec![
                TextBlock::new("Hello", quad(0.0, 0.0, 100.0, 50.0)),
                TextBlock::new("pair", vec![Point::new(150.0, 10.0), Point::new(180.0, 30.0)]),
                TextBlock::new("none", Vec::new()),
            ],
            200,
            100,
        )
    }

    #[test]
    fn nothing_is_drawn_without_a_result() {
        let frame = render_overlay(None, SelectionState::Empty, &OverlayStyle::default(), 400.0, 200.0);
        assert!(frame.is_empty());
    }

    #[test]
    fn layer_then_strokes_in_order() {
        let result = sample();
        let frame = render_overlay(
            Some(&result),
            SelectionState::Empty,
            &OverlayStyle::default(),
            400.0,
            200.0,
        );
        assert_eq!(
            frame.ops[0],
            DrawOp::BeginLayer {
                width: 400.0,
                height: 200.0
            }
        );
        assert!(matches!(frame.ops[1], DrawOp::Fill { .. }));
        assert_eq!(
            frame.ops[2],
            DrawOp::Clear {
                shape: Shape::Polygon {
                    points: quad(0.0, 0.0, 200.0, 100.0)
                }
            }
        );
        assert_eq!(
            frame.ops[3],
            DrawOp::Clear {
                shape: Shape::Rect(BoundingBox {
                    min_x: 300.0,
                    min_y: 20.0,
                    max_x: 360.0,
                    max_y: 60.0,
                })
            }
        );
        assert_eq!(frame.ops[4], DrawOp::EndLayer);
        // only the four-point block is outlined
        assert_eq!(frame.ops.len(), 6);
        match &frame.ops[5] {
            DrawOp::Stroke { shape, color, width } => {
                assert_eq!(
                    *shape,
                    Shape::Polygon {
                        points: quad(0.0, 0.0, 200.0, 100.0)
                    }
                );
                assert_eq!(*color, Rgb::WHITE.with_alpha(1.0));
                assert_eq!(*width, 2.0);
            }
            other => panic!("expected stroke, got {:?}", other),
        }
    }

    #[test]
    fn mask_uses_style_alpha() {
        let style = OverlayStyle {
            mask_color: Rgb::new(10, 20, 30),
            mask_alpha: 1.7,
            ..OverlayStyle::default()
        };
        let result = sample();
        let frame = render_overlay(Some(&result), SelectionState::Empty, &style, 400.0, 200.0);
        let DrawOp::Fill { color, .. } = &frame.ops[1] else {
            panic!("expected mask fill");
        };
        assert_eq!(*color, Rgba { r: 10, g: 20, b: 30, a: 1.0 });
    }

    #[test]
    fn stroke_width_scales_with_surface() {
        assert_eq!(auto_stroke_width(400.0, 200.0), 2.0);
        assert!((auto_stroke_width(3000.0, 2000.0) - 6.0).abs() < 1e-4);
        let style = OverlayStyle {
            stroke_width: Some(5.0),
            ..OverlayStyle::default()
        };
        assert_eq!(style.resolved_stroke_width(3000.0, 2000.0), 5.0);
    }

    #[test]
    fn zero_image_extent_falls_back_to_unit_scale() {
        let result = OcrResult::new(vec![TextBlock::new("x", quad(1.0, 2.0, 3.0, 4.0))], 0, 0);
        let frame = render_overlay(
            Some(&result),
            SelectionState::Empty,
            &OverlayStyle::default(),
            400.0,
            200.0,
        );
        assert_eq!(
            frame.ops[2],
            DrawOp::Clear {
                shape: Shape::Polygon {
                    points: quad(1.0, 2.0, 3.0, 4.0)
                }
            }
        );
    }

    #[test]
    fn selected_block_uses_highlight_color() {
        let style = OverlayStyle {
            highlight_color: Some(Rgb::new(0, 160, 255)),
            ..OverlayStyle::default()
        };
        let result = sample();
        let frame = render_overlay(Some(&result), SelectionState::Selected(0), &style, 400.0, 200.0);
        let Some(DrawOp::Stroke { color, .. }) = frame.ops.last() else {
            panic!("expected stroke");
        };
        assert_eq!(*color, Rgb::new(0, 160, 255).with_alpha(1.0));
    }

    #[test]
    fn drawing_is_idempotent() {
        let result = sample();
        let style = OverlayStyle::default();
        let first = render_overlay(Some(&result), SelectionState::Selected(0), &style, 640.0, 480.0);
        let second = render_overlay(Some(&result), SelectionState::Selected(0), &style, 640.0, 480.0);
        assert_eq!(first, second);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgb::from_hex("#c40000"), Some(Rgb::new(0xc4, 0, 0)));
        assert_eq!(Rgb::from_hex("00ff7f"), Some(Rgb::new(0, 255, 127)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }
}

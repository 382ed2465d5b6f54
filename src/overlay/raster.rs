use tiny_skia::{
    BlendMode, Color, FillRule, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, Transform,
};
use tracing::warn;

use super::{DrawOp, OverlayFrame, Rgba, Shape};

impl OverlayFrame {
    pub fn to_pixmap(&self) -> Option<Pixmap> {
        let width = self.width.ceil().max(0.0) as u32;
        let height = self.height.ceil().max(0.0) as u32;
        let mut pixmap = Pixmap::new(width, height)?;
        self.rasterize_onto(&mut pixmap);
        Some(pixmap)
    }

    /// Replays the ops onto `target`. Layers are separate pixmaps composited
    /// with source-over when they end.
    pub fn rasterize_onto(&self, target: &mut Pixmap) {
        let mut layers: Vec<Pixmap> = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::BeginLayer { .. } => {
                    match Pixmap::new(target.width(), target.height()) {
                        Some(layer) => layers.push(layer),
                        None => warn!("skipping overlay layer for empty surface"),
                    }
                }
                DrawOp::EndLayer => {
                    if let Some(layer) = layers.pop() {
                        let surface = layers.last_mut().unwrap_or(&mut *target);
                        surface.draw_pixmap(
                            0,
                            0,
                            layer.as_ref(),
                            &PixmapPaint::default(),
                            Transform::identity(),
                            None,
                        );
                    }
                }
                DrawOp::Fill { shape, color } => {
                    let surface = layers.last_mut().unwrap_or(&mut *target);
                    fill_shape(surface, shape, &color_paint(color));
                }
                DrawOp::Clear { shape } => {
                    let surface = layers.last_mut().unwrap_or(&mut *target);
                    let paint = Paint {
                        blend_mode: BlendMode::Clear,
                        anti_alias: true,
                        ..Paint::default()
                    };
                    fill_shape(surface, shape, &paint);
                }
                DrawOp::Stroke {
                    shape,
                    color,
                    width,
                } => {
                    let surface = layers.last_mut().unwrap_or(&mut *target);
                    let stroke = Stroke {
                        width: *width,
                        line_join: LineJoin::Miter,
                        ..Stroke::default()
                    };
                    if let Some(path) = shape_path(shape) {
                        surface.stroke_path(
                            &path,
                            &color_paint(color),
                            &stroke,
                            Transform::identity(),
                            None,
                        );
                    }
                }
            }
        }
    }
}

fn color_paint(color: &Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(color.r, color.g, color.b, color.alpha_u8()));
    paint.anti_alias = true;
    paint
}

fn fill_shape(surface: &mut Pixmap, shape: &Shape, paint: &Paint) {
    if let Some(path) = shape_path(shape) {
        surface.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn shape_path(shape: &Shape) -> Option<Path> {
    match shape {
        Shape::Rect(bbox) => {
            let rect = Rect::from_ltrb(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)?;
            Some(PathBuilder::from_rect(rect))
        }
        Shape::Polygon { points } => {
            let (first, rest) = points.split_first()?;
            let mut pb = PathBuilder::new();
            pb.move_to(first.x, first.y);
            for point in rest {
                pb.line_to(point.x, point.y);
            }
            pb.close();
            pb.finish()
        }
    }
}

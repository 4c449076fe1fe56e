// ============================================================================
// SOFTWARE RENDERING
// ============================================================================
//
// Widgets are turned into a retained `Scene` of draw commands first, then
// rasterised into an RGBA8 frame buffer.

use std::path::Path;

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::config::{Color, DialStyle};
use crate::error::DashboardError;
use crate::geometry::{compass_radians, point_on_arc, Point, SEGMENT_DEGREES};
use crate::notch::NotchLayout;

/// Axis-aligned area of the frame a widget is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line {
        from: Point,
        to: Point,
        thickness: f32,
        tapered: bool,
        color: Color,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Disc {
        center: Point,
        radius: i32,
        color: Color,
    },
    Text {
        at: Point,
        text: String,
        font_size: f32,
        color: Color,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text commands are skipped when no font is available.
    pub fn render(&self, canvas: &mut Canvas, font: Option<&Font<'static>>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Line {
                    from,
                    to,
                    thickness,
                    tapered,
                    color,
                } => draw_thick_line_aa(canvas, *from, *to, *thickness, *tapered, *color),
                DrawCommand::Polygon { points, color } => fill_polygon(canvas, points, *color),
                DrawCommand::Disc {
                    center,
                    radius,
                    color,
                } => draw_disc(canvas, *center, *radius, *color),
                DrawCommand::Text {
                    at,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        draw_text(canvas, *at, text, font, Scale::uniform(*font_size), *color);
                    }
                }
            }
        }
    }
}

// ============================================================================
// WIDGET SCENES
// ============================================================================

/// Adds a dial face, its notches and the needle at `needle_angle` degrees.
pub fn add_dial(
    scene: &mut Scene,
    bounds: Rect,
    layout: &NotchLayout,
    needle_angle: f64,
    label: &str,
    style: &DialStyle,
) {
    let center = bounds.center();
    let radius = bounds.width.min(bounds.height) / 2.0 - style.margin as f64;
    let fg = style.foreground;

    // Rim, as a polyline over the full circle.
    let segments = (360.0 / SEGMENT_DEGREES) as usize;
    let rim: Vec<Point> = (0..=segments)
        .map(|i| point_on_arc(center, compass_radians(i as f64 * SEGMENT_DEGREES), radius))
        .collect();
    for pair in rim.windows(2) {
        scene.add_command(DrawCommand::Line {
            from: pair[0],
            to: pair[1],
            thickness: style.rim_thickness,
            tapered: false,
            color: fg,
        });
    }

    for notch in &layout.notches {
        let angle = compass_radians(notch.angle);
        scene.add_command(DrawCommand::Line {
            from: point_on_arc(center, angle, radius - style.tick_length),
            to: point_on_arc(center, angle, radius - 1.0),
            thickness: style.tick_thickness,
            tapered: false,
            color: fg,
        });
        let label_radius = radius - style.tick_length - style.tick_to_label_distance;
        scene.add_command(DrawCommand::Text {
            at: point_on_arc(center, angle, label_radius),
            text: notch.label.clone(),
            font_size: style.notch_font_size,
            color: fg,
        });
    }

    if !label.is_empty() {
        scene.add_command(DrawCommand::Text {
            at: Point::new(center.x, center.y + radius * 0.45),
            text: label.to_owned(),
            font_size: style.face_font_size,
            color: fg,
        });
    }

    let angle = compass_radians(needle_angle);
    scene.add_command(DrawCommand::Line {
        from: center,
        to: point_on_arc(center, angle, radius * style.needle_length_factor),
        thickness: style.needle_width,
        tapered: true,
        color: style.needle_color,
    });
    scene.add_command(DrawCommand::Line {
        from: center,
        to: point_on_arc(center, angle, -style.needle_back_length),
        thickness: style.needle_width,
        tapered: false,
        color: style.needle_color,
    });
    scene.add_command(DrawCommand::Disc {
        center,
        radius: style.hub_radius,
        color: style.needle_color,
    });
}

/// Adds a filled swoop outline, given in widget coordinates relative to
/// `bounds`.
pub fn add_swoop(scene: &mut Scene, bounds: Rect, polygon: &[Point], color: Color) {
    let origin = bounds.origin();
    let points = polygon
        .iter()
        .map(|p| Point::new(p.x + origin.x, p.y + origin.y))
        .collect();
    scene.add_command(DrawCommand::Polygon { points, color });
}

// ============================================================================
// FONTS
// ============================================================================

pub fn load_font(path: &Path) -> Result<Font<'static>, DashboardError> {
    let data = std::fs::read(path).map_err(|source| DashboardError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(data).ok_or_else(|| DashboardError::FontParse {
        path: path.to_path_buf(),
    })
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let idx = self.index(x, y)?;
        let mut out = [0; 4];
        out.copy_from_slice(&self.frame[idx..idx + 4]);
        Some(out)
    }

    /// Alpha-blends `color` over the pixel at (x, y). Out-of-bounds
    /// coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let Some(idx) = self.index(x as usize, y as usize) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (channel, src) in src.iter().enumerate() {
            let dst = self.frame[idx + channel] as f32;
            self.frame[idx + channel] = (src * a + dst * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        let idx = (y * self.width + x) * 4;
        (x < self.width && y < self.height && idx + 4 <= self.frame.len()).then_some(idx)
    }
}

fn draw_thick_line_aa(canvas: &mut Canvas, from: Point, to: Point, thickness: f32, tapered: bool, color: Color) {
    let (x0, y0) = (from.x as f32, from.y as f32);
    let (x1, y1) = (to.x as f32, to.y as f32);
    let pad = thickness.ceil() + 1.0;
    let min_x = (x0.min(x1) - pad).floor() as i32;
    let max_x = (x0.max(x1) + pad).ceil() as i32;
    let min_y = (y0.min(y1) - pad).floor() as i32;
    let max_y = (y0.max(y1) + pad).ceil() as i32;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0;
            let py = y as f32 - y0;
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let lx = x0 + t * dx;
            let ly = y0 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let local_thickness = if tapered {
                thickness * (1.0 - t * 0.95)
            } else {
                thickness
            };
            let aa = (1.0 - (dist - local_thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.set_pixel(x, y, color, aa);
            }
        }
    }
}

/// Even-odd scanline fill of a closed polygon, sampling pixel centers.
fn fill_polygon(canvas: &mut Canvas, points: &[Point], color: Color) {
    if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
        return;
    }
    let (min_y, max_y) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let first_row = min_y.floor().max(0.0) as i32;
    let last_row = max_y.ceil().min(canvas.height() as f64) as i32;

    let mut crossings = Vec::new();
    for row in first_row..last_row {
        let sample_y = row as f64 + 0.5;
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            if (a.y <= sample_y) != (b.y <= sample_y) {
                let t = (sample_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(f64::total_cmp);
        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0) as i32;
            let end = (span[1] - 0.5).floor().min(canvas.width() as f64 - 1.0) as i32;
            for x in start..=end {
                canvas.set_pixel(x, row, color, 1.0);
            }
        }
    }
}

fn draw_disc(canvas: &mut Canvas, center: Point, radius: i32, color: Color) {
    let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
    for y in -radius - 1..=radius + 1 {
        for x in -radius - 1..=radius + 1 {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = (1.0 - (dist - radius as f64).max(0.0)).clamp(0.0, 1.0);
            if aa > 0.0 {
                canvas.set_pixel(cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

/// Draws `text` centered on `at`.
fn draw_text(canvas: &mut Canvas, at: Point, text: &str, font: &Font, scale: Scale, color: Color) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, v_metrics.ascent)).collect();

    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let offset_x = at.x.round() as i32 - width_px / 2;
    let offset_y = at.y.round() as i32 - height_px / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.set_pixel(px, py, color, v);
            });
        }
    }
}

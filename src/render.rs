//! Renderer seam
//!
//! The core never touches pixels. Components emit logical primitives into a
//! `DrawTarget` owned by the host: a canvas renderer, a terminal, or the
//! recording target used by tests and the headless demo.

use glam::Vec2;

use crate::geom::Rect;

/// sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const CYAN: Color = Color::rgb(0x00, 0xff, 0xff);
}

/// Host-implemented draw surface. Coordinates are in the logical viewport
/// (`consts::VIEW_WIDTH` x `consts::VIEW_HEIGHT`).
pub trait DrawTarget {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color);
    fn draw_text(&mut self, pos: Vec2, text: &str, size: f32, color: Color);
}

/// Counts primitives instead of drawing them; lets tests assert what would
/// be rendered without a graphics stack.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub rects: usize,
    pub circles: usize,
    pub triangles: usize,
    pub texts: Vec<String>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape_count(&self) -> usize {
        self.rects + self.circles + self.triangles
    }
}

impl DrawTarget for RecordingTarget {
    fn fill_rect(&mut self, _rect: Rect, _color: Color) {
        self.rects += 1;
    }

    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {
        self.circles += 1;
    }

    fn fill_triangle(&mut self, _a: Vec2, _b: Vec2, _c: Vec2, _color: Color) {
        self.triangles += 1;
    }

    fn draw_text(&mut self, _pos: Vec2, text: &str, _size: f32, _color: Color) {
        self.texts.push(text.to_string());
    }
}

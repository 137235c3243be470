//! Rasterization of a laid out report.
//!
//! Layout ([`layout`]) turns a [`ReportDocument`][crate::report::ReportDocument]
//! into a [`DisplayList`] measured in CSS pixels.  Painting scales the list by
//! a supersampling factor onto an RGB image, rasterizing glyphs with
//! `rusttype`.

pub mod layout;

use image::{Rgb, RgbImage};
use rusttype::{point, Scale};

use crate::fonts::FontSet;

pub use layout::{layout_document, SURFACE_WIDTH_PX};

/// Font attributes of a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in CSS pixels.
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    /// Regular text of the given size.
    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    /// Bold text of the given size.
    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    /// Height of one line box.
    pub fn line_height(&self) -> f32 {
        self.size * 1.4
    }
}

/// Text measurement used by the layout pass.
pub trait TextMetrics {
    /// Returns the advance width of `text` in CSS pixels.
    fn text_width(&self, text: &str, style: TextStyle) -> f32;
}

impl TextMetrics for FontSet {
    fn text_width(&self, text: &str, style: TextStyle) -> f32 {
        let font = self.face(style.bold);
        font.layout(text, Scale::uniform(style.size), point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }
}

/// A drawing instruction in CSS pixel coordinates (origin top left).
#[derive(Clone, Debug, PartialEq)]
pub enum PaintOp {
    /// Solid rectangle; borders are one pixel wide rectangles.
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb<u8>,
    },
    /// A single line of text whose line box starts at `y`.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
        color: Rgb<u8>,
    },
}

/// The laid out report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    width: f32,
    height: f32,
    ops: Vec<PaintOp>,
}

impl DisplayList {
    /// Creates an empty list of the given width.
    pub fn new(width: f32) -> Self {
        Self {
            width,
            height: 0.0,
            ops: Vec::new(),
        }
    }

    /// Width in CSS pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height in CSS pixels.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The recorded drawing instructions.
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Appends an instruction.
    pub fn push(&mut self, op: PaintOp) {
        self.ops.push(op);
    }

    /// Sets the content height.
    pub fn set_height(&mut self, height: f32) {
        self.height = height.max(0.0);
    }

    /// Limits the visible height; content below the limit is not painted.
    pub fn clip_height(&mut self, limit: f32) {
        self.height = self.height.min(limit.max(0.0));
    }

    /// Returns the texts of all text runs, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Text { text, .. } => Some(text.as_str()),
            PaintOp::FillRect { .. } => None,
        })
    }

    /// Returns the pixel dimensions of the list painted at `scale`.
    pub fn pixel_size(&self, scale: f32) -> (u32, u32) {
        (
            (self.width * scale).ceil() as u32,
            (self.height * scale).ceil() as u32,
        )
    }
}

/// Paints `list` at `scale` over `background`.
pub fn paint(list: &DisplayList, fonts: &FontSet, scale: f32, background: Rgb<u8>) -> RgbImage {
    let (width, height) = list.pixel_size(scale);
    let mut image = RgbImage::from_pixel(width, height, background);

    for op in list.ops() {
        match op {
            PaintOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => fill_rect(&mut image, *x * scale, *y * scale, *width * scale, *height * scale, *color),
            PaintOp::Text {
                x,
                y,
                text,
                style,
                color,
            } => draw_text(&mut image, fonts, *x, *y, text, *style, *color, scale),
        }
    }

    image
}

fn fill_rect(image: &mut RgbImage, x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) {
    // Keep hairlines visible at any scale.
    let width = width.max(1.0);
    let height = height.max(1.0);

    let x0 = x.round().max(0.0) as u32;
    let y0 = y.round().max(0.0) as u32;
    let x1 = ((x + width).round().max(0.0) as u32).min(image.width());
    let y1 = ((y + height).round().max(0.0) as u32).min(image.height());

    for py in y0..y1 {
        for px in x0..x1 {
            image.put_pixel(px, py, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    image: &mut RgbImage,
    fonts: &FontSet,
    x: f32,
    y: f32,
    text: &str,
    style: TextStyle,
    color: Rgb<u8>,
    scale: f32,
) {
    let font = fonts.face(style.bold);
    let glyph_scale = Scale::uniform(style.size * scale);
    let v_metrics = font.v_metrics(glyph_scale);
    let content_height = v_metrics.ascent - v_metrics.descent;
    let half_leading = (style.line_height() * scale - content_height) / 2.0;
    let baseline = y * scale + half_leading + v_metrics.ascent;

    let (width, height) = (image.width() as i32, image.height() as i32);
    for glyph in font.layout(text, glyph_scale, point(x * scale, baseline)) {
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bounds.min.x + gx as i32;
            let py = bounds.min.y + gy as i32;
            if px < 0 || py < 0 || px >= width || py >= height {
                return;
            }
            let pixel = image.get_pixel_mut(px as u32, py as u32);
            for channel in 0..3 {
                let under = pixel.0[channel] as f32;
                let over = color.0[channel] as f32;
                pixel.0[channel] = (under + (over - under) * coverage).round() as u8;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_never_grows_the_list() {
        let mut list = DisplayList::new(100.0);
        list.set_height(300.0);
        list.clip_height(500.0);
        assert_eq!(list.height(), 300.0);
        list.clip_height(120.0);
        assert_eq!(list.height(), 120.0);
    }

    #[test]
    fn pixel_size_scales_and_rounds_up() {
        let mut list = DisplayList::new(794.0);
        list.set_height(100.25);
        assert_eq!(list.pixel_size(4.0), (3176, 401));
    }

    #[test]
    fn fill_rect_is_clamped_to_the_image() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        fill_rect(&mut image, 2.0, 2.0, 10.0, 10.0, Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(3, 3), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(1, 1), Rgb([255, 255, 255]));
    }
}

//! Software canvas
//!
//! A `0RGB` pixel buffer that widgets draw into and that gets copied to the
//! window surface. It also knows how to compare itself with the previous
//! frame so only the changed region needs presenting.

use crate::geometry::{span, Rect};
use crate::style::Color;
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::Font;
use image::{ImageFormat, RgbaImage};
use log::debug;
use std::path::Path;

pub const BACKGROUND: u32 = 0xFFFFFF;

/// Drawing primitives widgets are painted with.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Line of `width` pixels centered on the segment.
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color);

    /// Advance width and ascent of a single line of text.
    fn measure_text(&self, font: &Font, text: &str, size: f32) -> (f32, f32) {
        let width = text.chars().map(|c| font.metrics(c, size).advance_width).sum();
        let height = font
            .horizontal_line_metrics(size)
            .map(|m| m.ascent)
            .unwrap_or(size);
        (width, height)
    }

    /// Draws a single line of text. `anchor` picks which point of the text
    /// box lands on `at`: `(0, 0)` puts the baseline start there, `(0.5,
    /// 0.5)` centers the text on it.
    fn draw_text_anchored(
        &mut self,
        font: &Font,
        text: &str,
        size: f32,
        at: (f32, f32),
        anchor: (f32, f32),
        color: Color,
    );
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width as u32, self.height as u32)
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Blend a pixel with alpha
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: u32, alpha: u8) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y * self.width + x;
        let bg = self.pixels[idx];

        let bg_r = (bg >> 16) & 0xFF;
        let bg_g = (bg >> 8) & 0xFF;
        let bg_b = bg & 0xFF;

        let fg_r = (color >> 16) & 0xFF;
        let fg_g = (color >> 8) & 0xFF;
        let fg_b = color & 0xFF;

        let a = alpha as u32;
        let inv_a = 255 - a;

        let r = (fg_r * a + bg_r * inv_a) / 255;
        let g = (fg_g * a + bg_g * inv_a) / 255;
        let b = (fg_b * a + bg_b * inv_a) / 255;

        self.pixels[idx] = (r << 16) | (g << 8) | b;
    }

    /// Paints `color` honoring its alpha channel.
    fn paint(&mut self, x: usize, y: usize, color: Color) {
        match color.a {
            0 => {}
            255 => self.set_pixel(x, y, color.to_u32()),
            a => self.blend_pixel(x, y, color.to_u32(), a),
        }
    }

    /// Reallocates to the new size. Existing content stays anchored at the
    /// origin; whatever no longer fits is discarded and new area is white.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        debug!("canvas resize {}x{} -> {}x{}", self.width, self.height, width, height);
        let mut pixels = vec![BACKGROUND; width * height];
        let copy_w = width.min(self.width);
        for y in 0..height.min(self.height) {
            let src = y * self.width;
            let dst = y * width;
            pixels[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
        }
        self.width = width;
        self.height = height;
        self.pixels = pixels;
    }

    /// Bounding rectangle of the pixels that differ from `previous`. A size
    /// change marks the whole canvas.
    pub fn diff_bounds(&self, previous: &Canvas) -> Option<Rect> {
        if self.width != previous.width || self.height != previous.height {
            let all = self.bounds();
            return (!all.is_empty()).then_some(all);
        }

        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        for (y, (row, old)) in self
            .pixels
            .chunks_exact(self.width.max(1))
            .zip(previous.pixels.chunks_exact(self.width.max(1)))
            .enumerate()
        {
            let Some(first) = row.iter().zip(old).position(|(a, b)| a != b) else {
                continue;
            };
            let last = row.iter().zip(old).rposition(|(a, b)| a != b).unwrap_or(first);
            min_x = min_x.min(first);
            max_x = max_x.max(last);
            min_y = min_y.min(y);
            max_y = y;
        }

        if min_x == usize::MAX {
            return None;
        }
        Some(Rect::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        ))
    }

    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            out.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8, 0xFF]);
        }
        out
    }

    /// Writes the whole canvas as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), ExportError> {
        let image = RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba())
            .ok_or(ExportError::BufferSize)?;
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(ExportError::Image)
    }
}

impl DrawSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(clip) = rect.intersect(&self.bounds()) else {
            return;
        };
        for py in clip.y..clip.bottom() {
            for px in clip.x..clip.right() {
                self.paint(px as usize, py as usize, color);
            }
        }
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        if width <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let thickness = width.round().max(1.0) as u32;

        // axis aligned strokes are the common case (borders, caret)
        if from.1 == to.1 {
            let x0 = (from.0.min(to.0) - half).round() as i32;
            let x1 = (from.0.max(to.0) + half).round() as i32;
            let y = (from.1 - half).round() as i32;
            self.fill_rect(Rect::new(x0, y, span(x0, x1), thickness), color);
            return;
        }
        if from.0 == to.0 {
            let y0 = (from.1.min(to.1) - half).round() as i32;
            let y1 = (from.1.max(to.1) + half).round() as i32;
            let x = (from.0 - half).round() as i32;
            self.fill_rect(Rect::new(x, y0, thickness, span(y0, y1)), color);
            return;
        }

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil() as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cx = from.0 + dx * t;
            let cy = from.1 + dy * t;
            let dot = Rect::new((cx - half).round() as i32, (cy - half).round() as i32, thickness, thickness);
            self.fill_rect(dot, color);
        }
    }

    fn draw_text_anchored(
        &mut self,
        font: &Font,
        text: &str,
        size: f32,
        at: (f32, f32),
        anchor: (f32, f32),
        color: Color,
    ) {
        if text.is_empty() || size <= 0.0 {
            return;
        }
        let (w, h) = self.measure_text(font, text, size);
        let x = at.0 - anchor.0 * w;
        let baseline = (at.1 + anchor.1 * h).round() as i64;

        let mut layout: Layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x,
            y: 0.0,
            ..LayoutSettings::default()
        });
        layout.append(&[font], &TextStyle::new(text, size, 0));
        let baseline_in_layout = layout
            .lines()
            .and_then(|lines| lines.first().map(|l| l.baseline_y.round() as i64))
            .unwrap_or(0);
        let dy = baseline - baseline_in_layout;

        let rgb = color.to_u32();
        for glyph in layout.glyphs() {
            let (metrics, bitmap) = font.rasterize_config(glyph.key);
            if metrics.width == 0 {
                continue;
            }
            let gx = glyph.x.round() as i64;
            let gy = glyph.y.round() as i64 + dy;

            for (i, alpha) in bitmap.iter().enumerate() {
                if *alpha == 0 {
                    continue;
                }
                let px = gx + (i % metrics.width) as i64;
                let py = gy + (i / metrics.width) as i64;
                if px >= 0 && py >= 0 {
                    let a = (*alpha as u32 * color.a as u32 / 255) as u8;
                    self.blend_pixel(px as usize, py as usize, rgb, a);
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    BufferSize,
    Image(image::ImageError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::BufferSize => write!(f, "Canvas buffer does not match its size"),
            ExportError::Image(e) => write!(f, "PNG encoding failed: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Image(e) => Some(e),
            ExportError::BufferSize => None,
        }
    }
}

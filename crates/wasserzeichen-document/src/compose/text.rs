// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text tiles: watermark text rasterised onto a transparent RGBA surface with
// glyph coverage in the alpha channel.

use ab_glyph::{Font, FontRef, GlyphId, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};

/// Laid-out watermark text at a given pixel size.
pub struct TextLayout<'f> {
    font: &'f FontRef<'static>,
    scale: PxScale,
    lines: Vec<&'f str>,
    /// Width of the widest line.
    pub width: f32,
    /// Ascent to descent of every line plus the gaps between them.
    pub height: f32,
}

impl<'f> TextLayout<'f> {
    pub fn new(font: &'f FontRef<'static>, size_px: f32, text: &'f str) -> Self {
        let scale = PxScale::from(size_px);
        let scaled = font.as_scaled(scale);
        let lines: Vec<&str> = text.lines().collect();
        let width = lines
            .iter()
            .map(|line| line_width(font, scale, line))
            .fold(0.0f32, f32::max);
        let count = lines.len().max(1) as f32;
        let height = count * line_height(font, scale) + (count - 1.0) * scaled.line_gap();
        Self {
            font,
            scale,
            lines,
            width,
            height,
        }
    }

    /// Draw into a tile with `padding` transparent pixels on every side; the
    /// text box starts at (`padding`, `padding`).
    pub fn render(&self, color: [u8; 3], padding: u32) -> RgbaImage {
        let width = self.width.ceil() as u32 + 2 * padding;
        let height = self.height.ceil() as u32 + 2 * padding;
        let mut tile = RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 0]));

        let scaled = self.font.as_scaled(self.scale);
        let advance = line_height(self.font, self.scale) + scaled.line_gap();
        for (row, line) in self.lines.iter().enumerate() {
            let baseline = padding as f32 + scaled.ascent() + row as f32 * advance;
            let mut cursor = padding as f32;
            let mut previous: Option<GlyphId> = None;
            for c in line.chars() {
                let id = scaled.glyph_id(c);
                if let Some(prev) = previous {
                    cursor += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(self.scale, point(cursor, baseline));
                if let Some(outlined) = self.font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        let x = gx as i64 + bounds.min.x as i64;
                        let y = gy as i64 + bounds.min.y as i64;
                        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                            return;
                        }
                        let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                        let pixel = tile.get_pixel_mut(x as u32, y as u32);
                        // Overlapping glyph edges keep the stronger coverage.
                        pixel[3] = pixel[3].max(alpha);
                    });
                }
                cursor += scaled.h_advance(id);
                previous = Some(id);
            }
        }
        tile
    }
}

fn line_height(font: &FontRef<'static>, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    scaled.ascent() - scaled.descent()
}

fn line_width(font: &FontRef<'static>, scale: PxScale, line: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in line.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::fonts::FontBook;

    #[test]
    fn size_grows_with_text_and_font_size() {
        let book = FontBook::embedded().unwrap();
        let face = book.face("Arial");
        let short = TextLayout::new(face, 40.0, "AB");
        let long = TextLayout::new(face, 40.0, "ABCD");
        let big = TextLayout::new(face, 80.0, "AB");
        assert!(long.width > short.width);
        assert!((big.width - 2.0 * short.width).abs() < 1.0);
        assert!((big.height - 2.0 * short.height).abs() < 1.0);
    }

    #[test]
    fn lines_stack_vertically() {
        let book = FontBook::embedded().unwrap();
        let face = book.face("Arial");
        let one = TextLayout::new(face, 20.0, "DRAFT");
        let two = TextLayout::new(face, 20.0, "DRAFT\nDRAFT");
        assert_eq!(one.width, two.width);
        assert!(two.height > 1.9 * one.height);
    }

    #[test]
    fn tile_carries_coverage_in_alpha_only() {
        let book = FontBook::embedded().unwrap();
        let layout = TextLayout::new(book.face("Georgia"), 32.0, "Wz");
        let tile = layout.render([200, 10, 10], 2);
        assert_eq!(tile.width(), layout.width.ceil() as u32 + 4);
        assert!(tile.pixels().any(|p| p[3] == 255));
        assert!(tile.pixels().all(|p| p[0] == 200 && p[1] == 10 && p[2] == 10));
        // Padding stays clear.
        assert!((0..tile.width()).all(|x| tile.get_pixel(x, 0)[3] == 0));
    }
}

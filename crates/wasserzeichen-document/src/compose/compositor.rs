// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export compositor — burns the watermark into a page surface.
//
// Pipeline per page:
//   1. resample the surface from the page's scale to the export scale
//   2. resolve the anchor in surface pixels
//   3. lay out the text with font size and offsets scaled by the same ratio
//   4. rotate the text tile about the anchor and alpha-blend it
//   5. encode (PNG, or JPEG when the page came from a JPEG)

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, instrument};
use wasserzeichen_core::{EngineConfig, WasserzeichenError, WatermarkSpec};
use wasserzeichen_style::{RenderMode, Size, resolve};

use super::fonts::FontBook;
use super::text::TextLayout;
use crate::image::ImageProcessor;
use crate::image::processor::checked_surface;
use crate::normalize::{Page, RasterPage};

/// Transparent margin around text tiles so bilinear sampling never reads
/// past the glyph edges.
const TILE_PADDING: u32 = 2;

/// An encoded, watermarked page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub page_index: usize,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageBytes {
    /// File extension for the encoded format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("png")
    }
}

/// What exporting a single page produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Image(ImageBytes),
    /// The page has no pixels to burn into; only the settings can be saved.
    NotApplicable,
}

/// Composites watermarks into raster pages.
pub struct Compositor {
    config: EngineConfig,
    fonts: FontBook,
}

impl Compositor {
    pub fn new(config: EngineConfig) -> Result<Self, WasserzeichenError> {
        Ok(Self {
            config,
            fonts: FontBook::embedded()?,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Export one page at `target_scale` (pixels per source unit).
    ///
    /// Markup pages are `NotApplicable`. An empty watermark text exports the
    /// page unchanged.
    #[instrument(skip(self, page, spec), fields(page = page.index()))]
    pub fn export_page(
        &self,
        page: &Page,
        spec: &WatermarkSpec,
        target_scale: f32,
    ) -> Result<ExportOutcome, WasserzeichenError> {
        let Page::Raster(raster) = page else {
            return Ok(ExportOutcome::NotApplicable);
        };
        let ratio = target_scale / raster.scale;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(WasserzeichenError::Rasterize {
                page: raster.index,
                detail: format!("cannot resample from scale {} to {}", raster.scale, target_scale),
            });
        }

        let mut surface = ImageProcessor::from_rgba(raster.image.clone())
            .scale(ratio, raster.index, self.config.max_surface_pixels)?
            .into_rgba8();

        if spec.has_text() {
            self.burn_in(&mut surface, spec, ratio, raster.index)?;
        } else {
            debug!(page = raster.index, "No watermark text; page exported unchanged");
        }

        self.encode(raster, surface)
    }

    /// Draw `spec` into `surface`. Font size and offsets are given in
    /// preview pixels and multiplied by `ratio`.
    pub fn burn_in(
        &self,
        surface: &mut RgbaImage,
        spec: &WatermarkSpec,
        ratio: f32,
        page: usize,
    ) -> Result<(), WasserzeichenError> {
        let (surface_w, surface_h) = surface.dimensions();
        let placement = resolve(spec.anchor, Size::from((surface_w, surface_h)), RenderMode::Raster);

        let layout = TextLayout::new(
            self.fonts.face(&spec.font_family),
            spec.font_size_px as f32 * ratio,
            &spec.text,
        );
        let pad = (2 * TILE_PADDING) as f64;
        checked_surface(
            f64::from(layout.width) + pad,
            f64::from(layout.height) + pad,
            page,
            self.config.max_surface_pixels,
        )?;
        let color = spec.color.to_rgb();
        let tile = layout.render(color, TILE_PADDING);

        // Tile pixel (i, j) covers the text-box point (i + 0.5 - pad, j + 0.5 - pad);
        // the aligned box point lands on the anchor, then the whole box turns about it.
        let (fx, fy) = placement.transform_origin();
        let origin = (fx * layout.width, fy * layout.height);
        let anchor = (
            placement.x + spec.offset_x as f32 * ratio,
            placement.y + spec.offset_y as f32 * ratio,
        );
        let inset = 0.5 - TILE_PADDING as f32;
        let placed = Projection::translate(anchor.0 - 0.5, anchor.1 - 0.5)
            * Projection::rotate((spec.rotation_degrees as f32).to_radians())
            * Projection::translate(inset - origin.0, inset - origin.1);

        let Some((x0, y0, x1, y1)) = visible_bounds(&placed, tile.dimensions(), (surface_w, surface_h)) else {
            debug!(page, "Watermark falls outside the page");
            return Ok(());
        };

        let mut layer = RgbaImage::from_pixel(x1 - x0, y1 - y0, Rgba([color[0], color[1], color[2], 0]));
        let local = Projection::translate(-(x0 as f32), -(y0 as f32)) * placed;
        warp_into(
            &tile,
            &local,
            Interpolation::Bilinear,
            Rgba([color[0], color[1], color[2], 0]),
            &mut layer,
        );

        for (x, y, pixel) in layer.enumerate_pixels() {
            if pixel[3] == 0 {
                continue;
            }
            let target = surface.get_pixel_mut(x0 + x, y0 + y);
            *target = blend_pixels(*target, *pixel, spec.opacity);
        }
        debug!(
            page,
            font_px = spec.font_size_px as f32 * ratio,
            bounds = ?(x0, y0, x1, y1),
            "Watermark composited"
        );
        Ok(())
    }

    fn encode(&self, raster: &RasterPage, surface: RgbaImage) -> Result<ExportOutcome, WasserzeichenError> {
        let wanted = match raster.source_format {
            Some(ImageFormat::Jpeg) => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        };
        let (width, height) = surface.dimensions();
        let (bytes, format) = ImageProcessor::from_rgba(surface).encode(wanted, self.config.jpeg_quality)?;
        Ok(ExportOutcome::Image(ImageBytes {
            page_index: raster.index,
            bytes,
            width,
            height,
            format,
        }))
    }
}

/// Pixel rectangle `[x0, x1) x [y0, y1)` of the surface the transformed tile
/// can touch, or `None` if it misses the surface entirely.
fn visible_bounds(
    projection: &Projection,
    (tile_w, tile_h): (u32, u32),
    (surface_w, surface_h): (u32, u32),
) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (tile_w as f32, tile_h as f32);
    let corners = [(-0.5, -0.5), (w - 0.5, -0.5), (-0.5, h - 0.5), (w - 0.5, h - 0.5)];
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for corner in corners {
        let (x, y) = *projection * corner;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let clamp = |v: f32, limit: u32| v.clamp(0.0, limit as f32) as u32;
    let x0 = clamp(min_x.floor() - 1.0, surface_w);
    let y0 = clamp(min_y.floor() - 1.0, surface_h);
    let x1 = clamp(max_x.ceil() + 2.0, surface_w);
    let y1 = clamp(max_y.ceil() + 2.0, surface_h);
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

/// Porter-Duff "over" with an extra opacity on the foreground.
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (f32::from(foreground[3]) / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = f32::from(background[3]) / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |fg: u8, bg: u8| -> u8 {
        let fg = f32::from(fg) / 255.0;
        let bg = f32::from(bg) / 255.0;
        let value = (fg * fg_alpha + bg * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(foreground[0], background[0]),
        channel(foreground[1], background[1]),
        channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

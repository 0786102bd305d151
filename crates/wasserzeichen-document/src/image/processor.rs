// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, rescale and re-encode page surfaces. Operates on
// in-memory images using the `image` crate.

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, info, instrument};
use wasserzeichen_core::error::WasserzeichenError;

/// Image pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining.
///
/// ```ignore
/// let bytes = ImageProcessor::from_bytes(&upload)?
///     .scale(2.0, 0, 100_000_000)?
///     .encode(ImageFormat::Png, 92)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
    /// Encoding the image was decoded from, if it came from bytes.
    source_format: Option<ImageFormat>,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, WasserzeichenError> {
        let format = image::guess_format(data).map_err(|err| {
            WasserzeichenError::ImageError(format!("unrecognised image encoding: {}", err))
        })?;
        let img = image::load_from_memory_with_format(data, format).map_err(|err| {
            WasserzeichenError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            ?format,
            "Image decoded from bytes"
        );
        Ok(Self {
            image: img,
            source_format: Some(format),
        })
    }

    /// Wrap an already-decoded RGBA surface.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
            source_format: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encoding the image was decoded from.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    /// Consume the processor and return an RGBA surface.
    pub fn into_rgba8(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resample by `factor` (Lanczos3). A factor of 1.0 is a no-op.
    ///
    /// `page` names the page in errors; the resampled surface must stay within
    /// `max_pixels`.
    #[instrument(skip(self), fields(factor))]
    pub fn scale(self, factor: f32, page: usize, max_pixels: u64) -> Result<Self, WasserzeichenError> {
        if (factor - 1.0).abs() < f32::EPSILON {
            return Ok(self);
        }
        let (width, height) = checked_surface(
            f64::from(self.image.width()) * f64::from(factor),
            f64::from(self.image.height()) * f64::from(factor),
            page,
            max_pixels,
        )?;
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Resampling image"
        );
        let resized = self
            .image
            .resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        Ok(Self {
            image: resized,
            source_format: self.source_format,
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as `format`, falling back to PNG for formats we do not write.
    ///
    /// Returns the bytes and the format actually used.
    pub fn encode(
        &self,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> Result<(Vec<u8>, ImageFormat), WasserzeichenError> {
        match format {
            ImageFormat::Jpeg => Ok((self.to_jpeg_bytes(jpeg_quality)?, ImageFormat::Jpeg)),
            ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff | ImageFormat::WebP => {
                Ok((encode_to_format(&self.image, format)?, format))
            }
            _ => Ok((self.to_png_bytes()?, ImageFormat::Png)),
        }
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, WasserzeichenError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, WasserzeichenError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder).map_err(|err| {
            WasserzeichenError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Validate a surface size before allocating it.
///
/// Dimensions are rounded up; anything empty, non-finite or above
/// `max_pixels` is a rasterize error for `page`.
pub fn checked_surface(
    width: f64,
    height: f64,
    page: usize,
    max_pixels: u64,
) -> Result<(u32, u32), WasserzeichenError> {
    // Scale factors are f32, so exact products can land a hair above an integer.
    let snap = |v: f64| {
        let nearest = v.round();
        if (v - nearest).abs() < 1e-3 { nearest } else { v.ceil() }
    };
    let (w, h) = (snap(width), snap(height));
    if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 {
        return Err(WasserzeichenError::Rasterize {
            page,
            detail: format!("cannot allocate a {}x{} surface", width, height),
        });
    }
    if w * h > max_pixels as f64 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
        return Err(WasserzeichenError::Rasterize {
            page,
            detail: format!("{}x{} surface exceeds the {} pixel limit", w, h, max_pixels),
        });
    }
    Ok((w as u32, h as u32))
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, WasserzeichenError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        WasserzeichenError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        ImageProcessor::from_rgba(RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255])))
            .to_png_bytes()
            .unwrap()
    }

    #[test]
    fn decodes_and_remembers_format() {
        let processor = ImageProcessor::from_bytes(&png_bytes(4, 3)).unwrap();
        assert_eq!(processor.source_format(), Some(ImageFormat::Png));
        assert_eq!((processor.width(), processor.height()), (4, 3));
    }

    #[test]
    fn scale_resizes_exactly() {
        let processor = ImageProcessor::from_bytes(&png_bytes(10, 6)).unwrap();
        let scaled = processor.scale(1.5, 0, 1_000_000).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (15, 9));
    }

    #[test]
    fn oversized_surface_is_a_rasterize_error() {
        let processor = ImageProcessor::from_bytes(&png_bytes(10, 10)).unwrap();
        let err = processor.scale(100.0, 4, 10_000).err().unwrap();
        assert!(matches!(err, WasserzeichenError::Rasterize { page: 4, .. }));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(checked_surface(0.0, 10.0, 0, 100).is_err());
        assert!(checked_surface(f64::NAN, 10.0, 0, 100).is_err());
        assert_eq!(checked_surface(2.2, 3.0, 0, 100).unwrap(), (3, 3));
    }

    #[test]
    fn f32_ratios_do_not_add_a_pixel() {
        let ratio = 2.0f32 / 1.5;
        let scaled = ImageProcessor::from_bytes(&png_bytes(150, 45))
            .unwrap()
            .scale(ratio, 0, 1_000_000)
            .unwrap();
        assert_eq!((scaled.width(), scaled.height()), (200, 60));
    }

    #[test]
    fn jpeg_encoding_round_trips_dimensions() {
        let processor = ImageProcessor::from_bytes(&png_bytes(8, 8)).unwrap();
        let (bytes, format) = processor.encode(ImageFormat::Jpeg, 90).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn unwritable_formats_fall_back_to_png() {
        let processor = ImageProcessor::from_bytes(&png_bytes(2, 2)).unwrap();
        let (_, format) = processor.encode(ImageFormat::Ico, 90).unwrap();
        assert_eq!(format, ImageFormat::Png);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterisation. A `PageRasterizer` turns PDF bytes into one RGBA surface
// per page, in page order. The built-in `GeometryRasterizer` paints page boxes,
// filled rectangles and embedded images; text and vector outlines need the
// pdfium backend. Content it cannot draw is recorded per page so callers can
// tell the user.

use std::collections::BTreeSet;

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::point::Point;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{debug, info, instrument, warn};
use wasserzeichen_core::WasserzeichenError;

use crate::image::processor::checked_surface;
use crate::pdf::reader::{PageGeometry, PdfReader};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Form XObjects may nest; stop following them past this depth.
const MAX_FORM_DEPTH: usize = 8;

// What the geometry rasteriser leaves out, as reported to the user.
const TEXT: &str = "text";
const VECTOR_DRAWINGS: &str = "vector drawings";
const SHADINGS: &str = "shadings";
const INLINE_IMAGES: &str = "inline images";
const UNDECODABLE_IMAGES: &str = "undecodable images";
const UNREADABLE_CONTENT: &str = "unreadable content";
const NESTED_FORMS: &str = "deeply nested forms";

/// Rasterised pages, in page order, and what could not be drawn on them.
#[derive(Debug, Clone, Default)]
pub struct Rasterized {
    pub pages: Vec<RgbaImage>,
    /// Zero-based page index and the content left out of it, for each page
    /// drawn incompletely.
    pub omissions: Vec<(usize, Vec<&'static str>)>,
}

impl Rasterized {
    /// One notice covering every incomplete page, `None` when all are complete.
    pub fn notice(&self) -> Option<WasserzeichenError> {
        let (first, _) = self.omissions.first()?;
        let left_out: BTreeSet<&str> = self
            .omissions
            .iter()
            .flat_map(|(_, what)| what.iter().copied())
            .collect();
        Some(WasserzeichenError::PartialDecode(format!(
            "{} not drawn on {} of {} page(s), first on page {}; the pdfium renderer draws them",
            left_out.into_iter().collect::<Vec<_>>().join(", "),
            self.omissions.len(),
            self.pages.len(),
            first + 1
        )))
    }
}

/// Renders the pages of a paginated document.
pub trait PageRasterizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Rasterise every page at `scale` pixels per point.
    ///
    /// Pages are rendered one after another and returned in ascending page
    /// order. An error on any page fails the whole document; content a page
    /// renders without is listed in [`Rasterized::omissions`].
    fn rasterize(&self, data: &[u8], scale: f32) -> Result<Rasterized, WasserzeichenError>;
}

/// Pure-Rust rasteriser built on the page tree and content streams.
#[derive(Debug, Clone)]
pub struct GeometryRasterizer {
    max_surface_pixels: u64,
}

impl GeometryRasterizer {
    pub fn new(max_surface_pixels: u64) -> Self {
        Self { max_surface_pixels }
    }
}

impl PageRasterizer for GeometryRasterizer {
    fn name(&self) -> &'static str {
        "geometry"
    }

    #[instrument(skip(self, data), fields(bytes_len = data.len()))]
    fn rasterize(&self, data: &[u8], scale: f32) -> Result<Rasterized, WasserzeichenError> {
        let reader = PdfReader::from_bytes(data)?;
        let pages = reader.pages()?;
        if pages.is_empty() {
            return Err(WasserzeichenError::PdfError("document has no pages".into()));
        }

        let mut rasterized = Rasterized {
            pages: Vec::with_capacity(pages.len()),
            omissions: Vec::new(),
        };
        for (index, page) in pages.iter().enumerate() {
            let (surface, omitted) = self.render_page(&reader, page, index, scale)?;
            debug!(
                page = page.number,
                width = surface.width(),
                height = surface.height(),
                "Page rasterized"
            );
            if !omitted.is_empty() {
                warn!(page = page.number, ?omitted, "Page drawn without some of its content");
                rasterized.omissions.push((index, omitted.into_iter().collect()));
            }
            rasterized.pages.push(surface);
        }

        info!(
            pages = rasterized.pages.len(),
            incomplete = rasterized.omissions.len(),
            "PDF rasterized"
        );
        Ok(rasterized)
    }
}

impl GeometryRasterizer {
    fn render_page(
        &self,
        reader: &PdfReader,
        page: &PageGeometry,
        index: usize,
        scale: f32,
    ) -> Result<(RgbaImage, BTreeSet<&'static str>), WasserzeichenError> {
        let (width, height) = checked_surface(
            f64::from(page.width()) * f64::from(scale),
            f64::from(page.height()) * f64::from(scale),
            index,
            self.max_surface_pixels,
        )?;
        let mut canvas = RgbaImage::from_pixel(width, height, WHITE);

        // PDF user space has y pointing up from the bottom of the visible box.
        let [x0, _, _, y1] = page.visible_box;
        let device = Matrix::new(scale, 0.0, 0.0, -scale, -x0 * scale, y1 * scale);

        let document = reader.document();
        let mut omitted = BTreeSet::new();
        let operations = match document
            .get_page_content(page.object_id)
            .map_err(|err| err.to_string())
            .and_then(|bytes| Content::decode(&bytes).map_err(|err| err.to_string()))
        {
            Ok(content) => content.operations,
            Err(err) => {
                warn!(page = page.number, %err, "Unreadable content stream, page left blank");
                omitted.insert(UNREADABLE_CONTENT);
                Vec::new()
            }
        };

        let resources = reader.page_resources(page.object_id);
        let mut painter = Painter {
            document,
            canvas: &mut canvas,
            device,
            depth: 0,
            omitted: &mut omitted,
        };
        painter.run(&operations, &resources, Matrix::IDENTITY);

        let surface = match page.rotate {
            90 => image::imageops::rotate90(&canvas),
            180 => image::imageops::rotate180(&canvas),
            270 => image::imageops::rotate270(&canvas),
            _ => canvas,
        };
        Ok((surface, omitted))
    }
}

/// PDF affine matrix `[a b c d e f]`: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn from_operands(document: &Document, operands: &[Object]) -> Option<Self> {
        let [a, b, c, d, e, f] = floats::<6>(document, operands)?;
        Some(Self::new(a, b, c, d, e, f))
    }

    /// `self` applied first, then `next`.
    fn then(self, next: Matrix) -> Matrix {
        Matrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    fn apply(self, (x, y): (f32, f32)) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn to_projection(self) -> Option<Projection> {
        Projection::from_matrix([self.a, self.c, self.e, self.b, self.d, self.f, 0.0, 0.0, 1.0])
    }
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    fill: Rgba<u8>,
}

/// Walks content-stream operators and paints what it understands; the rest
/// is noted in `omitted`.
struct Painter<'a, 'c> {
    document: &'a Document,
    canvas: &'c mut RgbaImage,
    /// User space (at identity CTM) to surface pixels.
    device: Matrix,
    depth: usize,
    omitted: &'c mut BTreeSet<&'static str>,
}

impl<'a> Painter<'a, '_> {
    fn run(&mut self, operations: &[Operation], resources: &[&'a Dictionary], base: Matrix) {
        let mut state = GraphicsState {
            ctm: base,
            fill: BLACK,
        };
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path: Vec<[(f32, f32); 4]> = Vec::new();
        // Set once the current path has segments other than rectangles.
        let mut outline = false;
        let document = self.document;

        for op in operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => stack.push(state),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(document, operands) {
                        state.ctm = m.then(state.ctm);
                    }
                }
                "g" => {
                    if let Some([gray]) = floats::<1>(document, operands) {
                        let v = unit_to_byte(gray);
                        state.fill = Rgba([v, v, v, 255]);
                    }
                }
                "rg" => {
                    if let Some([r, g, b]) = floats::<3>(document, operands) {
                        state.fill = Rgba([unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), 255]);
                    }
                }
                "k" => {
                    if let Some([c, m, y, k]) = floats::<4>(document, operands) {
                        let [r, g, b] = cmyk_to_rgb(
                            unit_to_byte(c),
                            unit_to_byte(m),
                            unit_to_byte(y),
                            unit_to_byte(k),
                        );
                        state.fill = Rgba([r, g, b, 255]);
                    }
                }
                "re" => {
                    if let Some([x, y, w, h]) = floats::<4>(document, operands) {
                        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
                        path.push(corners.map(|p| state.ctm.apply(p)));
                    }
                }
                "m" | "l" | "c" | "v" | "y" | "h" => outline = true,
                "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    if std::mem::take(&mut outline) {
                        self.omitted.insert(VECTOR_DRAWINGS);
                    }
                    for quad in path.drain(..) {
                        self.fill_quad(quad, state.fill);
                    }
                }
                "S" | "s" => {
                    if std::mem::take(&mut outline) || !path.is_empty() {
                        self.omitted.insert(VECTOR_DRAWINGS);
                    }
                    path.clear();
                }
                "n" => {
                    outline = false;
                    path.clear();
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    self.omitted.insert(TEXT);
                }
                "sh" => {
                    self.omitted.insert(SHADINGS);
                }
                "BI" | "ID" | "EI" => {
                    self.omitted.insert(INLINE_IMAGES);
                }
                "Do" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_xobject(name, resources, state.ctm);
                    }
                }
                _ => {}
            }
        }
    }

    fn fill_quad(&mut self, quad: [(f32, f32); 4], color: Rgba<u8>) {
        let mut points: Vec<Point<i32>> = Vec::with_capacity(4);
        for corner in quad {
            let (x, y) = self.device.apply(corner);
            let point = Point::new(x.round() as i32, y.round() as i32);
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            draw_polygon_mut(&mut *self.canvas, &points, color);
        }
    }

    fn draw_xobject(&mut self, name: &[u8], resources: &[&'a Dictionary], ctm: Matrix) {
        let document = self.document;
        let Some(stream) = find_xobject(document, resources, name) else {
            debug!(name = %String::from_utf8_lossy(name), "XObject not found");
            return;
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => match decode_image(document, stream) {
                Ok(image) => self.paint_image(&image, ctm),
                Err(err) => {
                    warn!(name = %String::from_utf8_lossy(name), %err, "Skipping image XObject");
                    self.omitted.insert(UNDECODABLE_IMAGES);
                }
            },
            Ok(b"Form") if self.depth < MAX_FORM_DEPTH => {
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| m.as_array().ok())
                    .and_then(|values| Matrix::from_operands(document, values))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources: Vec<&'a Dictionary> = stream
                    .dict
                    .get_deref(b"Resources", document)
                    .and_then(Object::as_dict)
                    .ok()
                    .into_iter()
                    .chain(resources.iter().copied())
                    .collect();
                let operations = match stream
                    .get_plain_content()
                    .and_then(|bytes| Content::decode(&bytes))
                {
                    Ok(content) => content.operations,
                    Err(err) => {
                        debug!(%err, "Unreadable form XObject");
                        self.omitted.insert(UNREADABLE_CONTENT);
                        return;
                    }
                };
                self.depth += 1;
                self.run(&operations, &form_resources, matrix.then(ctm));
                self.depth -= 1;
            }
            Ok(b"Form") => {
                debug!(depth = self.depth, "Form XObjects nested too deeply");
                self.omitted.insert(NESTED_FORMS);
            }
            _ => {}
        }
    }

    /// Draw `image` into the unit square mapped by `ctm`.
    fn paint_image(&mut self, image: &RgbaImage, ctm: Matrix) {
        let (w, h) = (image.width() as f32, image.height() as f32);
        // Pixel centres sit at integer indices; image row 0 is the top of the unit square.
        let image_to_unit = Matrix::new(1.0 / w, 0.0, 0.0, -1.0 / h, 0.5 / w, 1.0 - 0.5 / h);
        let to_index = Matrix::new(1.0, 0.0, 0.0, 1.0, -0.5, -0.5);
        let mapping = image_to_unit.then(ctm).then(self.device).then(to_index);
        let Some(projection) = mapping.to_projection() else {
            debug!("Degenerate image matrix");
            return;
        };

        // Bilinear sampling drops the outer half pixel, which shows when enlarging.
        let interpolation = if (mapping.a * mapping.d - mapping.b * mapping.c).abs() >= 1.0 {
            Interpolation::Nearest
        } else {
            Interpolation::Bilinear
        };

        let mut layer = RgbaImage::from_pixel(self.canvas.width(), self.canvas.height(), TRANSPARENT);
        warp_into(image, &projection, interpolation, TRANSPARENT, &mut layer);
        image::imageops::overlay(&mut *self.canvas, &layer, 0, 0);
    }
}

fn find_xobject<'a>(document: &'a Document, resources: &[&'a Dictionary], name: &[u8]) -> Option<&'a Stream> {
    resources.iter().find_map(|res| {
        res.get_deref(b"XObject", document)
            .and_then(Object::as_dict)
            .and_then(|xobjects| xobjects.get_deref(name, document))
            .and_then(Object::as_stream)
            .ok()
    })
}

/// Decode an image XObject: JPEG streams through `image`, 8-bit raw or
/// Flate-compressed Gray/RGB/CMYK samples directly.
fn decode_image(document: &Document, stream: &Stream) -> Result<RgbaImage, String> {
    let dimension = |key: &[u8]| {
        stream
            .dict
            .get_deref(key, document)
            .and_then(Object::as_i64)
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
    };
    let (Some(width), Some(height)) = (dimension(b"Width"), dimension(b"Height")) else {
        return Err("image without dimensions".into());
    };

    let filters: Vec<&[u8]> = stream.filters().unwrap_or_default();
    if filters.as_slice() == [b"DCTDecode".as_slice()] {
        return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map(|img| img.into_rgba8())
            .map_err(|err| err.to_string());
    }

    let bits = stream
        .dict
        .get_deref(b"BitsPerComponent", document)
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(format!("{} bits per component", bits));
    }

    let samples = stream.get_plain_content().map_err(|err| err.to_string())?;
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| format!("{}x{} image is too large", width, height))?;
    let components = stream
        .dict
        .get_deref(b"ColorSpace", document)
        .ok()
        .and_then(|cs| colour_components(document, cs))
        .or_else(|| [1, 3, 4].into_iter().find(|n| pixels.checked_mul(*n) == Some(samples.len())))
        .ok_or("unsupported colour space")?;
    match pixels.checked_mul(components) {
        Some(expected) if samples.len() >= expected => {}
        expected => {
            return Err(format!(
                "{}x{} image needs {} samples, found {}",
                width,
                height,
                expected.map_or_else(|| "more than usize::MAX".to_string(), |n| n.to_string()),
                samples.len()
            ));
        }
    }

    let rgba: Vec<u8> = samples
        .chunks_exact(components)
        .take(pixels)
        .flat_map(|px| {
            let [r, g, b] = match px {
                [v] => [*v, *v, *v],
                [r, g, b] => [*r, *g, *b],
                [c, m, y, k] => cmyk_to_rgb(*c, *m, *y, *k),
                _ => [0, 0, 0],
            };
            [r, g, b, 255]
        })
        .collect();
    RgbaImage::from_raw(width, height, rgba).ok_or_else(|| "sample buffer too small".into())
}

fn colour_components(document: &Document, colour_space: &Object) -> Option<usize> {
    if let Ok(name) = colour_space.as_name() {
        return match name {
            b"DeviceGray" | b"CalGray" | b"G" => Some(1),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
            b"DeviceCMYK" | b"CMYK" => Some(4),
            _ => None,
        };
    }
    let array = colour_space.as_array().ok()?;
    match array.first()?.as_name().ok()? {
        b"ICCBased" => {
            let (_, profile) = document.dereference(array.get(1)?).ok()?;
            let n = profile.as_stream().ok()?.dict.get(b"N").and_then(Object::as_i64).ok()?;
            usize::try_from(n).ok().filter(|n| matches!(n, 1 | 3 | 4))
        }
        b"CalGray" => Some(1),
        b"CalRGB" => Some(3),
        _ => None,
    }
}

fn floats<const N: usize>(document: &Document, operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        let (_, value) = document.dereference(operand).ok()?;
        *slot = value.as_float().ok()?;
    }
    Some(out)
}

fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = 255 - u16::from(k);
    let channel = |v: u8| ((255 - u16::from(v)) * k / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{
        page_color, pdf_with_image, pdf_with_pages, pdf_with_raw_image, pdf_with_self_nested_form, pdf_with_text,
    };

    fn rgb(surface: &RgbaImage, x: u32, y: u32) -> [u8; 3] {
        let Rgba([r, g, b, _]) = *surface.get_pixel(x, y);
        [r, g, b]
    }

    #[test]
    fn pages_are_rendered_in_order_at_scale() {
        let bytes = pdf_with_pages(&[(100.0, 200.0), (120.0, 80.0), (60.0, 60.0)]);
        let pages = GeometryRasterizer::new(10_000_000).rasterize(&bytes, 1.5).unwrap().pages;
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].dimensions(), (150, 300));
        assert_eq!(pages[1].dimensions(), (180, 120));
        assert_eq!(pages[2].dimensions(), (90, 90));
    }

    #[test]
    fn filled_rectangles_land_bottom_up() {
        let bytes = pdf_with_pages(&[(100.0, 100.0), (100.0, 100.0)]);
        let pages = GeometryRasterizer::new(10_000_000).rasterize(&bytes, 1.0).unwrap().pages;
        // Square covers x 10..50, y 10..50 in PDF space: rows 50..90 on the surface.
        assert_eq!(rgb(&pages[0], 30, 70), page_color(0));
        assert_eq!(rgb(&pages[1], 30, 70), page_color(1));
        assert_eq!(rgb(&pages[0], 30, 20), [255, 255, 255]);
    }

    #[test]
    fn image_xobjects_are_painted() {
        let rasterized = GeometryRasterizer::new(10_000_000)
            .rasterize(&pdf_with_image(), 2.0)
            .unwrap();
        assert!(rasterized.omissions.is_empty());
        let page = &rasterized.pages[0];
        assert_eq!(page.dimensions(), (200, 200));
        // Image spans 50..150 px; quadrant centres sit 25 px in from each edge.
        assert_eq!(rgb(page, 75, 75), [255, 0, 0]);
        assert_eq!(rgb(page, 125, 75), [0, 255, 0]);
        assert_eq!(rgb(page, 75, 125), [0, 0, 255]);
        assert_eq!(rgb(page, 10, 10), [255, 255, 255]);
    }

    #[test]
    fn rectangles_only_pages_are_complete() {
        let bytes = pdf_with_pages(&[(100.0, 100.0)]);
        let rasterized = GeometryRasterizer::new(10_000_000).rasterize(&bytes, 1.0).unwrap();
        assert!(rasterized.omissions.is_empty());
        assert!(rasterized.notice().is_none());
    }

    #[test]
    fn text_is_reported_as_left_out() {
        let rasterized = GeometryRasterizer::new(10_000_000)
            .rasterize(&pdf_with_text(), 1.0)
            .unwrap();
        assert_eq!(rasterized.pages.len(), 1);
        assert_eq!(rasterized.omissions, vec![(0, vec![TEXT])]);
        let notice = rasterized.notice().unwrap().to_string();
        assert!(notice.contains("text not drawn on 1 of 1 page(s)"), "{notice}");
    }

    #[test]
    fn absurd_image_dimensions_are_skipped() {
        let bytes = pdf_with_raw_image(4_294_967_295, 4_294_967_295, vec![0; 12]);
        let rasterized = GeometryRasterizer::new(10_000_000).rasterize(&bytes, 1.0).unwrap();
        assert_eq!(rasterized.omissions, vec![(0, vec![UNDECODABLE_IMAGES])]);
        assert!(rasterized.pages[0].pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn short_sample_data_is_skipped() {
        let bytes = pdf_with_raw_image(2, 2, vec![255; 5]);
        let rasterized = GeometryRasterizer::new(10_000_000).rasterize(&bytes, 1.0).unwrap();
        assert_eq!(rasterized.omissions, vec![(0, vec![UNDECODABLE_IMAGES])]);
    }

    #[test]
    fn self_referencing_forms_stop_at_the_depth_limit() {
        let rasterized = GeometryRasterizer::new(10_000_000)
            .rasterize(&pdf_with_self_nested_form(), 1.0)
            .unwrap();
        assert_eq!(rasterized.omissions, vec![(0, vec![NESTED_FORMS])]);
    }

    #[test]
    fn surface_limit_is_enforced() {
        let bytes = pdf_with_pages(&[(100.0, 100.0)]);
        let err = GeometryRasterizer::new(1_000).rasterize(&bytes, 1.0).err().unwrap();
        assert!(matches!(err, WasserzeichenError::Rasterize { page: 0, .. }));
    }

    #[test]
    fn matrix_composition_applies_left_first() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        assert_eq!(scale.then(shift).apply((1.0, 1.0)), (12.0, 2.0));
        assert_eq!(shift.then(scale).apply((1.0, 1.0)), (22.0, 2.0));
    }

    #[test]
    fn cmyk_black_and_white() {
        assert_eq!(cmyk_to_rgb(0, 0, 0, 0), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(0, 0, 0, 255), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(255, 0, 0, 0), [0, 255, 255]);
    }
}

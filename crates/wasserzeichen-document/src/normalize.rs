// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format normaliser. Turns any uploaded buffer into a `NormalizedDocument`:
// rasterised pages for PDFs, one native-size page for images, one markup
// fragment for flow documents, and nothing for unrecognised input.

use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use tracing::{info, instrument, warn};
use wasserzeichen_core::{DocumentKind, EmptyInput, EngineConfig, UploadedBuffer, WasserzeichenError};
use wasserzeichen_style::Size;

use crate::detect::{SourceFormat, detect};
use crate::flow::{self, TableMarkup};
use crate::image::ImageProcessor;
use crate::pdf::{GeometryRasterizer, PageRasterizer};

/// One rasterised page.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterPage {
    /// Zero-based position in the source document.
    pub index: usize,
    pub image: RgbaImage,
    /// Pixels per source unit the surface was produced at (1.0 for images).
    pub scale: f32,
    /// Encoding of the source when the page came from an image file.
    pub source_format: Option<ImageFormat>,
}

impl RasterPage {
    pub fn size(&self) -> Size {
        Size::from(self.image.dimensions())
    }
}

/// A flow document rendered as one semantic HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupPage {
    pub html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Raster(RasterPage),
    Markup(MarkupPage),
}

impl Page {
    pub fn index(&self) -> usize {
        match self {
            Page::Raster(page) => page.index,
            Page::Markup(_) => 0,
        }
    }
}

/// Canonical page-by-page representation of an uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub kind: DocumentKind,
    /// In source order; empty only for `Unsupported`.
    pub pages: Vec<Page>,
}

impl NormalizedDocument {
    pub fn unsupported() -> Self {
        Self {
            kind: DocumentKind::Unsupported,
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Result of normalisation. A decode failure still yields a usable
/// (`Unsupported`) document; the failure travels alongside it. A partial
/// decode keeps its document and carries a `PartialDecode` notice.
#[derive(Debug)]
pub struct Normalized {
    pub document: NormalizedDocument,
    pub decode_error: Option<WasserzeichenError>,
}

/// Detects the source format and produces a [`NormalizedDocument`].
#[derive(Clone)]
pub struct Normalizer {
    config: EngineConfig,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl Normalizer {
    /// A normaliser using the built-in geometry rasteriser for PDFs.
    pub fn new(config: EngineConfig) -> Self {
        let rasterizer = Arc::new(GeometryRasterizer::new(config.max_surface_pixels));
        Self { config, rasterizer }
    }

    /// Swap the PDF rasteriser (e.g. for PDFium).
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalise an uploaded buffer.
    ///
    /// Fails only when there is nothing to decode. Every other failure is
    /// reported through [`Normalized::decode_error`] with an `Unsupported`
    /// document. Content left out of an otherwise decoded document is
    /// reported there too, with the document kept.
    #[instrument(skip(self, buffer), fields(name = %buffer.name, size = buffer.size_bytes))]
    pub fn normalize(&self, buffer: &UploadedBuffer) -> Result<Normalized, WasserzeichenError> {
        if buffer.bytes.is_empty() {
            return Err(WasserzeichenError::EmptyInput(EmptyInput::NoFile));
        }

        let format = detect(buffer);
        match self.decode(format, &buffer.bytes) {
            Ok((document, notice)) => {
                info!(
                    kind = ?document.kind,
                    pages = document.page_count(),
                    rasterizer = self.rasterizer.name(),
                    "Document normalized"
                );
                if let Some(notice) = &notice {
                    warn!(%notice, ?format, "Document only partly decoded");
                }
                Ok(Normalized {
                    document,
                    decode_error: notice,
                })
            }
            Err(err) => {
                warn!(error = %err, ?format, "Document could not be decoded; treating as unsupported");
                Ok(Normalized {
                    document: NormalizedDocument::unsupported(),
                    decode_error: Some(err),
                })
            }
        }
    }

    fn decode(
        &self,
        format: SourceFormat,
        bytes: &[u8],
    ) -> Result<(NormalizedDocument, Option<WasserzeichenError>), WasserzeichenError> {
        let kind = format.kind();
        let (pages, notice) = match format {
            SourceFormat::Pdf => self.rasterize_pdf(bytes)?,
            SourceFormat::Image(_) => {
                let processor = ImageProcessor::from_bytes(bytes)?;
                let page = Page::Raster(RasterPage {
                    index: 0,
                    source_format: processor.source_format(),
                    image: processor.into_rgba8(),
                    scale: 1.0,
                });
                (vec![page], None)
            }
            SourceFormat::Docx => (markup(flow::docx_to_html(bytes)?), None),
            SourceFormat::Xlsx => table(flow::first_sheet_to_table(bytes)?),
            SourceFormat::Csv => table(flow::csv_to_table(bytes)?),
            SourceFormat::Text => (markup(flow::text_to_paragraphs(bytes)?), None),
            SourceFormat::Unknown => (Vec::new(), None),
        };
        Ok((NormalizedDocument { kind, pages }, notice))
    }

    /// Rasterise every page at the preview scale, in page order, with a
    /// notice when the rasteriser left content out.
    fn rasterize_pdf(&self, bytes: &[u8]) -> Result<(Vec<Page>, Option<WasserzeichenError>), WasserzeichenError> {
        let scale = self.config.preview_scale;
        let rasterized = self.rasterizer.rasterize(bytes, scale)?;
        if rasterized.pages.is_empty() {
            return Err(WasserzeichenError::Decode("PDF has no pages".into()));
        }
        let notice = rasterized.notice();
        let pages = rasterized
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, image)| {
                Page::Raster(RasterPage {
                    index,
                    image,
                    scale,
                    source_format: None,
                })
            })
            .collect();
        Ok((pages, notice))
    }
}

fn markup(html: String) -> Vec<Page> {
    vec![Page::Markup(MarkupPage { html })]
}

/// A table page; a cut table also yields a partial-decode notice.
fn table(table: TableMarkup) -> (Vec<Page>, Option<WasserzeichenError>) {
    (markup(table.html), table.clipped.map(WasserzeichenError::PartialDecode))
}

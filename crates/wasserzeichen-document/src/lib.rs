// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wasserzeichen-document — Document side of the Wasserzeichen watermark engine.
//
// Normalises uploaded buffers (PDF, images, DOCX, XLSX, CSV, text) into pages,
// dispatches per-kind preview/export behaviour, and burns watermarks into
// raster pages for export.

pub mod compose;
pub mod detect;
pub mod flow;
pub mod image;
pub mod normalize;
pub mod pdf;
pub mod preview;
pub mod strategy;

// Re-export the primary types so callers can use `wasserzeichen_document::Normalizer` etc.
pub use compose::{Compositor, ExportOutcome, ImageBytes};
pub use detect::{SourceFormat, detect};
pub use self::image::processor::ImageProcessor;
pub use normalize::{MarkupPage, Normalized, NormalizedDocument, Normalizer, Page, RasterPage};
pub use pdf::{GeometryRasterizer, PageRasterizer, PdfReader, Rasterized};
pub use preview::preview_html;
pub use strategy::{KindStrategy, PagePreview, export_document, render_document, strategy_for};

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumRasterizer;

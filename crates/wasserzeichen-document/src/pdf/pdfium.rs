// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Full-fidelity rasteriser backed by PDFium (text, vector art, annotations).
// Only built with the "pdfium" feature; needs libpdfium at runtime.

use std::path::PathBuf;

use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};
use wasserzeichen_core::WasserzeichenError;

use crate::image::processor::checked_surface;
use crate::pdf::raster::{PageRasterizer, Rasterized};

/// Renders pages through a dynamically loaded PDFium library.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    /// Directory holding libpdfium; `None` uses the system library search path.
    library_dir: Option<PathBuf>,
    max_surface_pixels: u64,
}

impl PdfiumRasterizer {
    pub fn new(library_dir: Option<PathBuf>, max_surface_pixels: u64) -> Self {
        Self {
            library_dir,
            max_surface_pixels,
        }
    }

    fn bind(&self) -> Result<Pdfium, WasserzeichenError> {
        let bindings = match &self.library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|err| WasserzeichenError::PdfError(format!("failed to load PDFium: {:?}", err)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    #[instrument(skip(self, data), fields(bytes_len = data.len()))]
    fn rasterize(&self, data: &[u8], scale: f32) -> Result<Rasterized, WasserzeichenError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|err| WasserzeichenError::PdfError(format!("PDFium could not open document: {:?}", err)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let mut surfaces = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            checked_surface(
                f64::from(page.width().value) * f64::from(scale),
                f64::from(page.height().value) * f64::from(scale),
                index,
                self.max_surface_pixels,
            )?;
            let bitmap = page
                .render_with_config(&config)
                .map_err(|err| WasserzeichenError::Rasterize {
                    page: index,
                    detail: format!("{:?}", err),
                })?;
            let surface = bitmap.as_image().into_rgba8();
            debug!(page = index + 1, width = surface.width(), height = surface.height(), "Page rendered");
            surfaces.push(surface);
        }

        if surfaces.is_empty() {
            return Err(WasserzeichenError::PdfError("document has no pages".into()));
        }
        info!(pages = surfaces.len(), "PDF rasterized with PDFium");
        Ok(Rasterized {
            pages: surfaces,
            omissions: Vec::new(),
        })
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page tree inspection and page rasterisation.

#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod raster;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use raster::{GeometryRasterizer, PageRasterizer, Rasterized};
pub use reader::{PageGeometry, PdfReader};

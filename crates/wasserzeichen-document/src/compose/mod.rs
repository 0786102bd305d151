// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compose module — burning watermarks into raster pages for export.

pub mod compositor;
pub mod fonts;
pub mod text;

pub use compositor::{Compositor, ExportOutcome, ImageBytes};
pub use fonts::{FontBook, FontClass};

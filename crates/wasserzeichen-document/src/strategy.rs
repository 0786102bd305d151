// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-kind behaviour. Every decision that depends on the document kind (what
// the preview container is, whether and at which scale a page exports) goes
// through `strategy_for`. The page range only narrows pixel-based kinds; flow
// documents are one logical page.

use tracing::{debug, warn};
use wasserzeichen_core::{DocumentKind, EngineConfig, PageRange, WasserzeichenError, WatermarkSpec};
use wasserzeichen_style::{OverlayDescription, Size, render_overlay};

use crate::compose::{Compositor, ExportOutcome};
use crate::normalize::{NormalizedDocument, Page};

/// What the host draws for one page: the page itself plus the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePreview {
    pub index: usize,
    /// Size the overlay is laid out in.
    pub container: Size,
    pub overlay: OverlayDescription,
}

pub trait KindStrategy: Send + Sync {
    fn kind(&self) -> DocumentKind;

    /// Live preview for one page, `None` when nothing can be shown.
    fn render(&self, page: &Page, spec: &WatermarkSpec, config: &EngineConfig) -> Option<PagePreview>;

    /// Export one page.
    fn export(
        &self,
        compositor: &Compositor,
        page: &Page,
        spec: &WatermarkSpec,
    ) -> Result<ExportOutcome, WasserzeichenError>;
}

/// PDFs: overlay on the preview surface, export re-sampled to the export scale.
pub struct PaginatedStrategy;

/// Images: overlay and export at native pixel size.
pub struct RasterStrategy;

/// DOCX, XLSX, CSV and text: overlay on the markup, no pixel export.
pub struct FlowStrategy {
    kind: DocumentKind,
}

/// Nothing to show or export; settings can still be saved.
pub struct UnsupportedStrategy;

static FLOW_TEXT: FlowStrategy = FlowStrategy {
    kind: DocumentKind::FlowText,
};
static FLOW_TABLE: FlowStrategy = FlowStrategy {
    kind: DocumentKind::FlowTable,
};

/// The strategy for a document kind.
pub fn strategy_for(kind: DocumentKind) -> &'static dyn KindStrategy {
    match kind {
        DocumentKind::Paginated => &PaginatedStrategy,
        DocumentKind::Raster => &RasterStrategy,
        DocumentKind::FlowText => &FLOW_TEXT,
        DocumentKind::FlowTable => &FLOW_TABLE,
        DocumentKind::Unsupported => &UnsupportedStrategy,
    }
}

fn raster_preview(page: &Page, spec: &WatermarkSpec) -> Option<PagePreview> {
    let Page::Raster(raster) = page else {
        return None;
    };
    let container = raster.size();
    Some(PagePreview {
        index: raster.index,
        container,
        overlay: render_overlay(spec, container),
    })
}

impl KindStrategy for PaginatedStrategy {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Paginated
    }

    fn render(&self, page: &Page, spec: &WatermarkSpec, _config: &EngineConfig) -> Option<PagePreview> {
        raster_preview(page, spec)
    }

    fn export(
        &self,
        compositor: &Compositor,
        page: &Page,
        spec: &WatermarkSpec,
    ) -> Result<ExportOutcome, WasserzeichenError> {
        compositor.export_page(page, spec, compositor.config().export_scale)
    }
}

impl KindStrategy for RasterStrategy {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Raster
    }

    fn render(&self, page: &Page, spec: &WatermarkSpec, _config: &EngineConfig) -> Option<PagePreview> {
        raster_preview(page, spec)
    }

    fn export(
        &self,
        compositor: &Compositor,
        page: &Page,
        spec: &WatermarkSpec,
    ) -> Result<ExportOutcome, WasserzeichenError> {
        match page {
            Page::Raster(raster) => compositor.export_page(page, spec, raster.scale),
            Page::Markup(_) => Ok(ExportOutcome::NotApplicable),
        }
    }
}

impl KindStrategy for FlowStrategy {
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn render(&self, page: &Page, spec: &WatermarkSpec, config: &EngineConfig) -> Option<PagePreview> {
        let container = Size::from(config.flow_viewport);
        Some(PagePreview {
            index: page.index(),
            container,
            overlay: render_overlay(spec, container),
        })
    }

    fn export(
        &self,
        _compositor: &Compositor,
        _page: &Page,
        _spec: &WatermarkSpec,
    ) -> Result<ExportOutcome, WasserzeichenError> {
        Ok(ExportOutcome::NotApplicable)
    }
}

impl KindStrategy for UnsupportedStrategy {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Unsupported
    }

    fn render(&self, _page: &Page, _spec: &WatermarkSpec, _config: &EngineConfig) -> Option<PagePreview> {
        None
    }

    fn export(
        &self,
        _compositor: &Compositor,
        _page: &Page,
        _spec: &WatermarkSpec,
    ) -> Result<ExportOutcome, WasserzeichenError> {
        Ok(ExportOutcome::NotApplicable)
    }
}

fn in_range(document: &NormalizedDocument, range: &PageRange, page: &Page) -> bool {
    !document.kind.is_pixel_based() || range.contains(page.index())
}

/// Previews for every page, in page order. Pages outside `range` keep their
/// surface but show no overlay.
pub fn render_document(
    document: &NormalizedDocument,
    spec: &WatermarkSpec,
    range: &PageRange,
    config: &EngineConfig,
) -> Vec<PagePreview> {
    let strategy = strategy_for(document.kind);
    document
        .pages
        .iter()
        .filter_map(|page| {
            let mut preview = strategy.render(page, spec, config)?;
            if !in_range(document, range, page) {
                preview.overlay = OverlayDescription::Empty;
            }
            Some(preview)
        })
        .collect()
}

/// Export the pages `range` selects, in page order; pages outside it are left
/// out. Failures are per page. A document without pages, or a range that
/// selects none, yields a single `NotApplicable`.
pub fn export_document(
    document: &NormalizedDocument,
    spec: &WatermarkSpec,
    range: &PageRange,
    compositor: &Compositor,
) -> Vec<Result<ExportOutcome, WasserzeichenError>> {
    let selected: Vec<&Page> = document
        .pages
        .iter()
        .filter(|page| in_range(document, range, page))
        .collect();
    if selected.is_empty() {
        debug!(kind = ?document.kind, pages = document.pages.len(), ?range, "No pages to export");
        return vec![Ok(ExportOutcome::NotApplicable)];
    }
    let strategy = strategy_for(document.kind);
    selected
        .into_iter()
        .map(|page| {
            let outcome = strategy.export(compositor, page, spec);
            if let Err(err) = &outcome {
                warn!(page = page.index(), error = %err, "Page export failed");
            }
            outcome
        })
        .collect()
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standalone HTML preview: each page (raster surface as a data URI, or the
// flow markup) with its live overlay stacked on top.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use wasserzeichen_core::markup::escape_html;
use wasserzeichen_core::{EngineConfig, PageRange, WasserzeichenError, WatermarkSpec};

use crate::image::ImageProcessor;
use crate::normalize::{NormalizedDocument, Page};
use crate::strategy::render_document;

/// Render a complete HTML document previewing `document` with `spec` on the
/// pages `range` selects.
pub fn preview_html(
    title: &str,
    document: &NormalizedDocument,
    spec: &WatermarkSpec,
    range: &PageRange,
    config: &EngineConfig,
) -> Result<String, WasserzeichenError> {
    let mut html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>body{{background:#eee;margin:0;padding:24px;font-family:sans-serif}}\
         .page{{position:relative;margin:0 auto 24px;background:#fff;box-shadow:0 1px 4px #999;overflow:hidden}}\
         .page>img{{display:block}}.flow{{padding:32px;box-sizing:border-box}}\
         .flow table{{border-collapse:collapse}}.flow td{{border:1px solid #ccc;padding:2px 6px}}\
         .unsupported{{text-align:center;color:#666}}</style></head><body>",
        escape_html(title)
    );

    let previews = render_document(document, spec, range, config);
    if previews.is_empty() {
        html.push_str(
            "<p class=\"unsupported\">This file can't be previewed. \
             Watermark settings can still be saved.</p>",
        );
    }

    for (preview, page) in previews.iter().zip(&document.pages) {
        let (width, height) = (preview.container.width, preview.container.height);
        match page {
            Page::Raster(raster) => {
                let png = ImageProcessor::from_rgba(raster.image.clone()).to_png_bytes()?;
                html.push_str(&format!(
                    "<div class=\"page\" style=\"width:{width}px;height:{height}px\">\
                     <img alt=\"Page {}\" width=\"{width}\" height=\"{height}\" src=\"data:image/png;base64,{}\">",
                    raster.index + 1,
                    STANDARD.encode(&png)
                ));
            }
            Page::Markup(markup) => {
                html.push_str(&format!(
                    "<div class=\"page flow\" style=\"width:{width}px;min-height:{height}px\">{}",
                    markup.html
                ));
            }
        }
        html.push_str(&preview.overlay.to_html());
        html.push_str("</div>");
    }

    html.push_str("</body></html>");
    debug!(pages = previews.len(), html_len = html.len(), "Preview rendered");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{MarkupPage, RasterPage};
    use image::RgbaImage;
    use wasserzeichen_core::DocumentKind;

    #[test]
    fn raster_pages_embed_a_png_and_the_overlay() {
        let doc = NormalizedDocument {
            kind: DocumentKind::Raster,
            pages: vec![Page::Raster(RasterPage {
                index: 0,
                image: RgbaImage::new(4, 4),
                scale: 1.0,
                source_format: None,
            })],
        };
        let html = preview_html("photo", &doc, &WatermarkSpec::with_text("<Secret>"), &PageRange::All, &EngineConfig::default())
            .unwrap();
        assert!(html.contains("src=\"data:image/png;base64,iVBOR"));
        assert!(html.contains("watermark-overlay"));
        assert!(html.contains("&lt;Secret&gt;"));
    }

    #[test]
    fn flow_markup_is_inlined() {
        let doc = NormalizedDocument {
            kind: DocumentKind::FlowTable,
            pages: vec![Page::Markup(MarkupPage { html: "<table><tr><td>1</td></tr></table>".into() })],
        };
        let html = preview_html("sheet", &doc, &WatermarkSpec::default(), &PageRange::All, &EngineConfig::default()).unwrap();
        assert!(html.contains("<td>1</td>"));
        assert!(!html.contains("watermark-overlay"));
    }

    #[test]
    fn unsupported_documents_explain_themselves() {
        let html = preview_html(
            "blob",
            &NormalizedDocument::unsupported(),
            &WatermarkSpec::with_text("X"),
            &PageRange::All,
            &EngineConfig::default(),
        )
        .unwrap();
        assert!(html.contains("can't be previewed"));
    }
}

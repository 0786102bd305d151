// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live overlay descriptions for interactive preview.

use serde::Serialize;

use wasserzeichen_core::WatermarkSpec;
use wasserzeichen_core::markup::escape_html;

use crate::anchor::{Placement, RenderMode, Size, resolve};

/// What the preview layer should draw over the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayDescription {
    /// No watermark text; nothing to draw.
    Empty,
    Text(OverlayText),
}

/// A positioned, styled text overlay in container-relative units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayText {
    pub text: String,
    pub placement: Placement,
    pub container: Size,
    pub font_family: String,
    pub font_size_px: u32,
    /// CSS colour string.
    pub color: String,
    pub opacity: f32,
    pub rotation_degrees: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Describe the overlay for `spec` inside `container`. Never touches page content.
pub fn render_overlay(spec: &WatermarkSpec, container: Size) -> OverlayDescription {
    if !spec.has_text() {
        return OverlayDescription::Empty;
    }

    OverlayDescription::Text(OverlayText {
        text: spec.text.clone(),
        placement: resolve(spec.anchor, container, RenderMode::Vector),
        container,
        font_family: spec.font_family.clone(),
        font_size_px: spec.font_size_px,
        color: spec.color.to_string(),
        opacity: wasserzeichen_core::clamp_opacity(spec.opacity),
        rotation_degrees: spec.rotation_degrees,
        offset_x: spec.offset_x,
        offset_y: spec.offset_y,
    })
}

impl OverlayText {
    /// CSS declarations for an absolutely positioned element inside the page container.
    ///
    /// The element is shifted so its aligned point lands on the anchor, then
    /// offset, then rotated about that same point.
    pub fn inline_style(&self) -> String {
        let (fx, fy) = self.placement.transform_origin();
        let (ox, oy) = (fx * 100.0, fy * 100.0);
        format!(
            "position:absolute;left:{x}%;top:{y}%;\
             transform-origin:{ox}% {oy}%;\
             transform:translate(-{ox}%, -{oy}%) translate({dx}px, {dy}px) rotate({deg}deg);\
             font-family:'{font}';font-size:{size}px;color:{color};opacity:{opacity};\
             text-align:{align};white-space:pre;pointer-events:none;user-select:none",
            x = self.placement.x,
            y = self.placement.y,
            dx = self.offset_x,
            dy = self.offset_y,
            deg = self.rotation_degrees,
            font = self.font_family.replace('\'', ""),
            size = self.font_size_px,
            color = self.color,
            opacity = self.opacity,
            align = self.placement.horizontal.as_css(),
        )
    }
}

impl OverlayDescription {
    /// HTML for a layer stacked over the page; empty for [`OverlayDescription::Empty`].
    pub fn to_html(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(overlay) => format!(
                "<div class=\"watermark-overlay\" aria-hidden=\"true\" \
                 style=\"position:absolute;inset:0;overflow:hidden;pointer-events:none\">\
                 <span style=\"{}\">{}</span></div>",
                escape_html(&overlay.inline_style()),
                escape_html(&overlay.text)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasserzeichen_core::{AnchorId, ColorValue};

    fn spec(text: &str) -> WatermarkSpec {
        let mut spec = WatermarkSpec::with_text(text);
        spec.anchor = AnchorId::TopRight;
        spec.rotation_degrees = -30;
        spec.color = ColorValue::rgb(255, 0, 0);
        spec.set_opacity(0.4);
        spec.offset_x = 5;
        spec.offset_y = -3;
        spec
    }

    #[test]
    fn serializes_for_hosts_as_tagged_json() {
        let json = serde_json::to_value(render_overlay(&spec("DRAFT"), Size::new(800.0, 600.0))).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["placement"]["unit"], "percent");
        assert_eq!(json["placement"]["horizontal"], "right");
        assert_eq!(json["color"], "#ff0000");
        assert_eq!(json["offset_y"], -3);
        assert_eq!(
            serde_json::to_value(OverlayDescription::Empty).unwrap(),
            serde_json::json!({ "type": "empty" })
        );
    }

    #[test]
    fn empty_text_renders_nothing() {
        let overlay = render_overlay(&spec(""), Size::new(800.0, 600.0));
        assert_eq!(overlay, OverlayDescription::Empty);
        assert!(overlay.to_html().is_empty());
    }

    #[test]
    fn overlay_uses_vector_placement() {
        let OverlayDescription::Text(text) = render_overlay(&spec("DRAFT"), Size::new(800.0, 600.0)) else {
            panic!("expected text overlay");
        };
        assert_eq!(text.placement.x, 90.0);
        assert_eq!(text.placement.unit, crate::anchor::Unit::Percent);
        assert_eq!(text.color, "#ff0000");
    }

    #[test]
    fn style_rotates_about_the_anchor() {
        let OverlayDescription::Text(text) = render_overlay(&spec("DRAFT"), Size::new(800.0, 600.0)) else {
            panic!("expected text overlay");
        };
        let css = text.inline_style();
        assert!(css.contains("left:90%;top:10%"), "{css}");
        assert!(css.contains("transform-origin:100% 0%"), "{css}");
        assert!(css.contains("translate(-100%, -0%) translate(5px, -3px) rotate(-30deg)"), "{css}");
        assert!(css.contains("opacity:0.4"), "{css}");
    }

    #[test]
    fn html_escapes_text() {
        let html = render_overlay(&spec("<Entwurf>"), Size::new(100.0, 100.0)).to_html();
        assert!(html.contains("&lt;Entwurf&gt;"));
        assert!(!html.contains("<Entwurf>"));
    }

    #[test]
    fn rendering_does_not_mutate_the_spec() {
        let original = spec("DRAFT");
        let copy = original.clone();
        let _ = render_overlay(&original, Size::new(10.0, 10.0));
        assert_eq!(original, copy);
    }
}

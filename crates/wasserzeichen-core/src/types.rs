// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Wasserzeichen watermark engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::ColorValue;
use crate::error::WasserzeichenError;

/// Lower bound of the watermark opacity range.
pub const MIN_OPACITY: f32 = 0.1;
/// Upper bound of the watermark opacity range.
pub const MAX_OPACITY: f32 = 1.0;

/// Unique identifier for an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the nine canonical watermark placements on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorId {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    Centered,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AnchorId {
    pub const ALL: [AnchorId; 9] = [
        AnchorId::TopLeft,
        AnchorId::TopCenter,
        AnchorId::TopRight,
        AnchorId::MiddleLeft,
        AnchorId::Centered,
        AnchorId::MiddleRight,
        AnchorId::BottomLeft,
        AnchorId::BottomCenter,
        AnchorId::BottomRight,
    ];

    /// Keyword form used in seeds, persisted records and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Centered => "centered",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnchorId {
    type Err = WasserzeichenError;

    /// Accepts the keyword form (`top-left`) and the type name (`TopLeft`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        AnchorId::ALL
            .into_iter()
            .find(|anchor| anchor.as_str().replace('-', "") == key)
            .ok_or_else(|| WasserzeichenError::InvalidAnchor(s.to_string()))
    }
}

/// Which generator path produced a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// First generation for a seed, three-font palette.
    Initial,
    /// Regeneration with a nonce, wider ranges and five-font palette.
    Variant,
}

/// A style produced by the seed generator. Applied wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStyle {
    pub font_family: String,
    #[serde(rename = "fontSize")]
    pub font_size_px: u32,
    pub color: ColorValue,
    pub opacity: f32,
    #[serde(rename = "rotation")]
    pub rotation_degrees: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub mode: StyleMode,
    /// The seed string the style was derived from.
    pub seed: String,
    /// The folded 32-bit hash of the encoded seed.
    pub hash: i32,
}

/// Everything needed to draw a watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    pub text: String,
    pub anchor: AnchorId,
    /// Always within `[MIN_OPACITY, MAX_OPACITY]`; use [`WatermarkSpec::set_opacity`].
    pub opacity: f32,
    /// Unbounded, negative values rotate counter-clockwise.
    pub rotation_degrees: i32,
    pub font_family: String,
    pub font_size_px: u32,
    pub color: ColorValue,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            anchor: AnchorId::Centered,
            opacity: 0.3,
            rotation_degrees: -45,
            font_family: "Arial".into(),
            font_size_px: 48,
            color: ColorValue::rgb(128, 128, 128),
            offset_x: 0,
            offset_y: 0,
        }
    }
}

impl WatermarkSpec {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_opacity(opacity);
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size_px = size.max(1);
    }

    /// Whether there is anything to draw.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Overwrite every derived style field; `text` and `anchor` stay as they are.
    pub fn apply_style(&mut self, style: &GeneratedStyle) {
        self.font_family = style.font_family.clone();
        self.set_font_size(style.font_size_px);
        self.color = style.color;
        self.set_opacity(style.opacity);
        self.rotation_degrees = style.rotation_degrees;
        self.offset_x = style.offset_x;
        self.offset_y = style.offset_y;
    }
}

/// Clamp to the watermark opacity range; NaN falls back to the minimum.
pub fn clamp_opacity(value: f32) -> f32 {
    if value.is_nan() {
        MIN_OPACITY
    } else {
        value.clamp(MIN_OPACITY, MAX_OPACITY)
    }
}

/// Raw bytes of a file handed to the engine. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBuffer {
    pub name: String,
    pub mime_hint: Option<String>,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl UploadedBuffer {
    pub fn new(name: impl Into<String>, mime_hint: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_hint,
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }

    /// Lower-cased extension of `name`, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Document metadata supplied by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub title: String,
    pub doc_type: String,
}

/// Canonical classification of a normalized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Fixed page count, each page rasterised (PDF).
    Paginated,
    /// Continuous rich text rendered as markup (DOCX, plain text).
    FlowText,
    /// Tabular data rendered as a markup table (XLSX, CSV).
    FlowTable,
    /// A single bitmap image.
    Raster,
    /// Could not be previewed; watermark settings can still be saved.
    Unsupported,
}

impl DocumentKind {
    /// Whether pages carry pixel surfaces the compositor can burn into.
    pub fn is_pixel_based(self) -> bool {
        matches!(self, Self::Paginated | Self::Raster)
    }
}

/// Pages a watermark applies to, persisted alongside the settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum PageRange {
    #[default]
    All,
    /// Inclusive, one-based.
    Span { first: u32, last: u32 },
}

impl PageRange {
    /// Whether the page at zero-based `index` is covered.
    pub fn contains(&self, index: usize) -> bool {
        match self {
            PageRange::All => true,
            PageRange::Span { first, last } => {
                let index = index as u64;
                index >= u64::from(*first).saturating_sub(1) && index < u64::from(*last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_parses_keyword_and_type_name() {
        for anchor in AnchorId::ALL {
            assert_eq!(anchor.as_str().parse::<AnchorId>().unwrap(), anchor);
            assert_eq!(format!("{anchor:?}").parse::<AnchorId>().unwrap(), anchor);
        }
        assert!("middle".parse::<AnchorId>().is_err());
    }

    #[test]
    fn page_range_is_one_based_and_inclusive() {
        let span = PageRange::Span { first: 2, last: 3 };
        let covered: Vec<usize> = (0..5).filter(|&i| span.contains(i)).collect();
        assert_eq!(covered, vec![1, 2]);
        assert!(PageRange::All.contains(usize::MAX));
        assert!(!PageRange::Span { first: 1, last: u32::MAX }.contains(usize::MAX));
    }

    #[test]
    fn anchor_serializes_as_keyword() {
        let json = serde_json::to_string(&AnchorId::BottomCenter).unwrap();
        assert_eq!(json, "\"bottom-center\"");
    }

    #[test]
    fn opacity_is_clamped() {
        let mut spec = WatermarkSpec::default();
        spec.set_opacity(0.0);
        assert_eq!(spec.opacity, MIN_OPACITY);
        spec.set_opacity(3.0);
        assert_eq!(spec.opacity, MAX_OPACITY);
        spec.set_opacity(f32::NAN);
        assert_eq!(spec.opacity, MIN_OPACITY);
    }

    #[test]
    fn apply_style_keeps_text_and_anchor() {
        let mut spec = WatermarkSpec::with_text("CONFIDENTIAL");
        spec.anchor = AnchorId::TopRight;
        let style = GeneratedStyle {
            font_family: "Georgia".into(),
            font_size_px: 55,
            color: ColorValue::hsl(10, 60, 40),
            opacity: 0.05,
            rotation_degrees: 400,
            offset_x: -7,
            offset_y: 3,
            mode: StyleMode::Initial,
            seed: "seed".into(),
            hash: 1,
        };
        spec.apply_style(&style);
        assert_eq!(spec.text, "CONFIDENTIAL");
        assert_eq!(spec.anchor, AnchorId::TopRight);
        assert_eq!(spec.font_family, "Georgia");
        assert_eq!(spec.opacity, MIN_OPACITY);
        assert_eq!(spec.rotation_degrees, 400);
        assert_eq!((spec.offset_x, spec.offset_y), (-7, 3));
    }

    #[test]
    fn extension_is_lowercased() {
        let buffer = UploadedBuffer::new("Report.PDF", None, vec![1, 2, 3]);
        assert_eq!(buffer.extension().as_deref(), Some("pdf"));
        assert_eq!(buffer.size_bytes, 3);
    }

    #[test]
    fn whitespace_only_text_draws_nothing() {
        assert!(!WatermarkSpec::with_text("  ").has_text());
    }
}

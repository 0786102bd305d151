// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The persisted watermark record, stored as JSON under `watermark-<documentId>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wasserzeichen_core::{AnchorId, ColorValue, GeneratedStyle, PageRange, WatermarkSpec};

/// Everything about a document's watermark that outlives the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkRecord {
    pub document_id: String,
    pub text: String,
    pub location: AnchorId,
    pub opacity: f32,
    pub rotation: i32,
    pub font: String,
    pub font_size: u32,
    pub color: ColorValue,
    /// Records written before offsets were stored load as (0, 0).
    #[serde(default)]
    pub offset_x: i32,
    #[serde(default)]
    pub offset_y: i32,
    pub page_range: PageRange,
    pub generated_style: Option<GeneratedStyle>,
    pub is_locked: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Session state a record is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistContext {
    pub spec: WatermarkSpec,
    pub document_id: String,
    pub user_id: String,
    pub page_range: PageRange,
    pub generated_style: Option<GeneratedStyle>,
    pub locked: bool,
}

impl WatermarkRecord {
    pub fn from_context(ctx: &PersistContext, created_at: DateTime<Utc>) -> Self {
        let spec = &ctx.spec;
        Self {
            document_id: ctx.document_id.clone(),
            text: spec.text.clone(),
            location: spec.anchor,
            opacity: spec.opacity,
            rotation: spec.rotation_degrees,
            font: spec.font_family.clone(),
            font_size: spec.font_size_px,
            color: spec.color,
            offset_x: spec.offset_x,
            offset_y: spec.offset_y,
            page_range: ctx.page_range.clone(),
            generated_style: ctx.generated_style.clone(),
            is_locked: ctx.locked,
            created_by: ctx.user_id.clone(),
            created_at,
        }
    }

    /// Rebuild the spec the record was saved from.
    pub fn to_spec(&self) -> WatermarkSpec {
        let mut spec = WatermarkSpec {
            text: self.text.clone(),
            anchor: self.location,
            font_family: self.font.clone(),
            color: self.color,
            rotation_degrees: self.rotation,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            ..WatermarkSpec::default()
        };
        spec.set_opacity(self.opacity);
        spec.set_font_size(self.font_size);
        spec
    }
}

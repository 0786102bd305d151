// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use serde::{Deserialize, Serialize};

/// Persistent engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rasterisation scale for paginated previews (page points to pixels).
    pub preview_scale: f32,
    /// Rasterisation scale for paginated exports.
    pub export_scale: f32,
    /// Pause between consecutive download artifacts, in milliseconds.
    pub download_delay_ms: u64,
    /// Prefix of the settings-store key, followed by the document id.
    pub settings_key_prefix: String,
    /// Largest output surface the compositor will allocate (width x height).
    pub max_surface_pixels: u64,
    /// How many style snapshots the session keeps for undo.
    pub history_limit: usize,
    /// Overlay container used for flow documents, which have no page size.
    pub flow_viewport: (u32, u32),
    /// Quality for JPEG re-encoding of raster exports (1-100).
    pub jpeg_quality: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_scale: 1.5,
            export_scale: 2.0,
            download_delay_ms: 500,
            settings_key_prefix: "watermark-".into(),
            max_surface_pixels: 100_000_000,
            history_limit: 50,
            flow_viewport: (816, 1056),
            jpeg_quality: 92,
        }
    }
}

impl EngineConfig {
    /// Settings-store key for a document.
    pub fn settings_key(&self, document_id: &str) -> String {
        format!("{}{document_id}", self.settings_key_prefix)
    }
}

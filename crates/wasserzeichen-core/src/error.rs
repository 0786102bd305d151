// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Wasserzeichen.

use thiserror::Error;

/// What was missing when an operation was rejected before any work started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyInput {
    /// No file selected, or the selected buffer is empty.
    NoFile,
    /// The watermark text is empty.
    NoWatermarkText,
}

impl std::fmt::Display for EmptyInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFile => f.write_str("no file selected"),
            Self::NoWatermarkText => f.write_str("no watermark text"),
        }
    }
}

/// Top-level error type for all Wasserzeichen operations.
#[derive(Debug, Error)]
pub enum WasserzeichenError {
    // -- Normalisation --
    #[error("could not decode document: {0}")]
    Decode(String),

    #[error("failed to rasterize page {page}: {detail}")]
    Rasterize { page: usize, detail: String },

    #[error("nothing to do: {0}")]
    EmptyInput(EmptyInput),

    /// Decoding succeeded but left something out; the document is still usable.
    #[error("document only partly decoded: {0}")]
    PartialDecode(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("markup conversion failed: {0}")]
    MarkupError(String),

    // -- Styling --
    #[error("font could not be loaded: {0}")]
    Font(String),

    #[error("invalid colour value: {0}")]
    InvalidColor(String),

    #[error("unknown anchor: {0}")]
    InvalidAnchor(String),

    // -- Session --
    #[error("watermark style is locked")]
    StyleLocked,

    #[error("export is locked until a style has been generated")]
    ExportLocked,

    #[error("load for epoch {epoch} superseded by epoch {current}")]
    StaleLoad { epoch: u64, current: u64 },

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WasserzeichenError>;

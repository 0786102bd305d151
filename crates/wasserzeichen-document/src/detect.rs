// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source format detection. Content wins over metadata: magic bytes are
// checked first, then the MIME hint, then the file extension.

use std::io::Cursor;

use image::ImageFormat;
use tracing::debug;
use wasserzeichen_core::{DocumentKind, UploadedBuffer};

/// Encoding of an uploaded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Image(ImageFormat),
    Docx,
    Xlsx,
    Csv,
    Text,
    Unknown,
}

impl SourceFormat {
    /// The document kind this format normalizes to.
    pub fn kind(self) -> DocumentKind {
        match self {
            Self::Pdf => DocumentKind::Paginated,
            Self::Image(_) => DocumentKind::Raster,
            Self::Docx | Self::Text => DocumentKind::FlowText,
            Self::Xlsx | Self::Csv => DocumentKind::FlowTable,
            Self::Unknown => DocumentKind::Unsupported,
        }
    }

    /// MIME type of the format, if it has a well-known one.
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::Pdf => Some("application/pdf"),
            Self::Image(format) => Some(format.to_mime_type()),
            Self::Docx => {
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            }
            Self::Xlsx => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            Self::Csv => Some("text/csv"),
            Self::Text => Some("text/plain"),
            Self::Unknown => None,
        }
    }
}

/// Work out what an uploaded buffer contains.
pub fn detect(buffer: &UploadedBuffer) -> SourceFormat {
    let detected = sniff(&buffer.bytes)
        .or_else(|| buffer.mime_hint.as_deref().and_then(from_mime))
        .or_else(|| buffer.extension().as_deref().and_then(from_extension))
        .unwrap_or(SourceFormat::Unknown);
    debug!(name = %buffer.name, ?detected, "Source format detected");
    detected
}

/// Identify a format from leading bytes and container layout.
fn sniff(bytes: &[u8]) -> Option<SourceFormat> {
    if bytes.starts_with(b"%PDF-") {
        return Some(SourceFormat::Pdf);
    }
    if bytes.starts_with(b"PK\x03\x04") {
        return sniff_zip(bytes);
    }
    image::guess_format(bytes).ok().map(SourceFormat::Image)
}

/// OOXML packages are ZIP archives told apart by their main part.
fn sniff_zip(bytes: &[u8]) -> Option<SourceFormat> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
    let has = |part: &str| archive.file_names().any(|name| name == part);
    if has("word/document.xml") {
        Some(SourceFormat::Docx)
    } else if has("xl/workbook.xml") {
        Some(SourceFormat::Xlsx)
    } else {
        None
    }
}

fn from_mime(mime: &str) -> Option<SourceFormat> {
    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let format = match essence.as_str() {
        "application/pdf" => SourceFormat::Pdf,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            SourceFormat::Docx
        }
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => SourceFormat::Xlsx,
        "text/csv" => SourceFormat::Csv,
        "text/plain" | "text/markdown" => SourceFormat::Text,
        other => return ImageFormat::from_mime_type(other).map(SourceFormat::Image),
    };
    Some(format)
}

fn from_extension(ext: &str) -> Option<SourceFormat> {
    let format = match ext {
        "pdf" => SourceFormat::Pdf,
        "docx" => SourceFormat::Docx,
        "xlsx" => SourceFormat::Xlsx,
        "csv" => SourceFormat::Csv,
        "txt" | "text" | "md" | "log" => SourceFormat::Text,
        other => return ImageFormat::from_extension(other).map(SourceFormat::Image),
    };
    Some(format)
}

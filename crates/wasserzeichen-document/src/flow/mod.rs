// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flow documents — word-processing files, spreadsheets and plain text turned
// into a single semantic HTML fragment for preview.

pub mod delimited;
pub mod docx;
pub mod xlsx;

use std::io::{Cursor, Read};

use wasserzeichen_core::WasserzeichenError;
use zip::ZipArchive;

pub use delimited::{csv_to_table, text_to_paragraphs};
pub use docx::docx_to_html;
pub use xlsx::first_sheet_to_table;

/// Highest one-based row a sheet can address.
pub const MAX_ROWS: u32 = 1_048_576;
/// Columns a sheet can address, A to XFD.
pub const MAX_COLUMNS: u32 = 16_384;
/// Largest table rendered for preview, in cells.
pub const MAX_TABLE_CELLS: u64 = 250_000;

/// An HTML table and, when it could not be shown whole, what was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMarkup {
    pub html: String,
    pub clipped: Option<String>,
}

/// Rows and columns to render out of a `rows` x `columns` table so that it
/// stays within [`MAX_COLUMNS`] and [`MAX_TABLE_CELLS`], plus a note when
/// anything is cut.
fn table_bounds(rows: u64, columns: u64) -> (u64, u64, Option<String>) {
    let kept_columns = columns.min(u64::from(MAX_COLUMNS));
    let kept_rows = match kept_columns {
        0 => rows,
        width => rows.min((MAX_TABLE_CELLS / width).max(1)),
    };
    let clipped = (kept_rows < rows || kept_columns < columns).then(|| {
        format!("{rows} x {columns} table cut to the first {kept_rows} rows and {kept_columns} columns")
    });
    (kept_rows, kept_columns, clipped)
}

type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Open an OOXML package held in memory.
fn open_package(bytes: &[u8]) -> Result<Package<'_>, WasserzeichenError> {
    ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| WasserzeichenError::Decode(format!("not a valid OOXML package: {}", err)))
}

/// Read one part of a package as UTF-8 text, `None` if the part is absent.
fn read_part(package: &mut Package<'_>, name: &str) -> Result<Option<String>, WasserzeichenError> {
    let mut file = match package.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(err) => {
            return Err(WasserzeichenError::Decode(format!("cannot open {}: {}", name, err)));
        }
    };
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|err| WasserzeichenError::Decode(format!("cannot read {}: {}", name, err)))?;
    Ok(Some(text))
}

/// Like [`read_part`], but a missing part is a decode error.
fn require_part(package: &mut Package<'_>, name: &str) -> Result<String, WasserzeichenError> {
    read_part(package, name)?
        .ok_or_else(|| WasserzeichenError::Decode(format!("package has no {}", name)))
}

fn parse_xml<'a>(
    part: &str,
    text: &'a str,
) -> Result<roxmltree::Document<'a>, WasserzeichenError> {
    roxmltree::Document::parse(text)
        .map_err(|err| WasserzeichenError::MarkupError(format!("{} is not well-formed: {}", part, err)))
}

/// Value of an attribute by local name, ignoring its namespace prefix.
fn attr<'a>(node: roxmltree::Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attribute| attribute.name() == local)
        .map(|attribute| attribute.value())
}

/// First element child with the given local name.
fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    local: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_tables_are_kept_whole() {
        assert_eq!(table_bounds(3, 4), (3, 4, None));
        assert_eq!(table_bounds(0, 0), (0, 0, None));
    }

    #[test]
    fn large_tables_are_cut_to_the_cell_budget() {
        let (rows, columns, clipped) = table_bounds(1_048_576, 16_384);
        assert_eq!((rows, columns), (15, 16_384));
        assert!(rows * columns <= MAX_TABLE_CELLS);
        assert!(clipped.unwrap().starts_with("1048576 x 16384 table"));

        let (rows, columns, _) = table_bounds(2, u64::from(u32::MAX));
        assert_eq!((rows, columns), (2, u64::from(MAX_COLUMNS)));
    }
}

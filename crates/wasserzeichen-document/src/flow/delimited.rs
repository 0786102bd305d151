// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain text and comma-separated values.

use tracing::debug;
use wasserzeichen_core::WasserzeichenError;
use wasserzeichen_core::markup::escape_html;

use super::{TableMarkup, table_bounds};

/// Decode bytes as UTF-8, dropping a leading byte-order mark.
fn utf8(bytes: &[u8]) -> Result<&str, WasserzeichenError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| WasserzeichenError::Decode(format!("text is not valid UTF-8: {}", err)))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Blank-line separated paragraphs; single newlines become `<br>`.
pub fn text_to_paragraphs(bytes: &[u8]) -> Result<String, WasserzeichenError> {
    let text = utf8(bytes)?.replace("\r\n", "\n");
    let html: String = text
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            let lines: Vec<String> = block.lines().map(escape_html).collect();
            format!("<p>{}</p>", lines.join("<br>"))
        })
        .collect();
    Ok(html)
}

/// A `<table>` with one row per record. Quoted fields may contain commas,
/// doubled quotes and newlines. Tables over the cell budget are cut.
pub fn csv_to_table(bytes: &[u8]) -> Result<TableMarkup, WasserzeichenError> {
    let records = parse_records(utf8(bytes)?);
    let width = records.iter().map(Vec::len).max().unwrap_or(0);
    let (rows, width, clipped) = table_bounds(records.len() as u64, width as u64);
    debug!(records = records.len(), width, clipped = ?clipped, "CSV parsed");

    let mut html = String::from("<table>");
    // Both bounds are at most the parsed sizes, so they fit in usize.
    for record in records.iter().take(rows as usize) {
        html.push_str("<tr>");
        for column in 0..width as usize {
            html.push_str("<td>");
            if let Some(field) = record.get(column) {
                html.push_str(&escape_html(field));
            }
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    Ok(TableMarkup { html, clipped })
}

fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => quoted = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_and_line_breaks() {
        let html = text_to_paragraphs(b"\xef\xbb\xbfFirst line\nsecond <line>\r\n\r\n\n\nNext").unwrap();
        assert_eq!(html, "<p>First line<br>second &lt;line&gt;</p><p>Next</p>");
    }

    #[test]
    fn quoted_fields_and_ragged_rows() {
        let table = csv_to_table(b"name,note\n\"Doe, J\",\"said \"\"hi\"\"\"\nsolo\n").unwrap();
        assert!(table.clipped.is_none());
        assert_eq!(
            table.html,
            "<table><tr><td>name</td><td>note</td></tr>\
             <tr><td>Doe, J</td><td>said &quot;hi&quot;</td></tr>\
             <tr><td>solo</td><td></td></tr></table>"
        );
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        assert!(matches!(
            csv_to_table(&[0xff, 0xfe, 0x00]),
            Err(WasserzeichenError::Decode(_))
        ));
    }

    #[test]
    fn wide_ragged_csv_is_cut_to_the_cell_budget() {
        let mut csv = ",".repeat(20_000).into_bytes();
        csv.extend_from_slice(b"\n");
        csv.extend(b"x\n".repeat(100));
        let table = csv_to_table(&csv).unwrap();
        assert_eq!(table.html.matches("<tr>").count(), 15);
        assert_eq!(table.html.matches("<td>").count(), 15 * 16_384);
        assert_eq!(
            table.clipped.as_deref(),
            Some("101 x 20001 table cut to the first 15 rows and 16384 columns")
        );
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SpreadsheetML to an HTML table. Only the first sheet in workbook order is
// converted; formulas show their cached value. Cells outside the sheet limits
// are dropped and large tables are cut, both reported in `clipped`.

use std::collections::BTreeMap;

use roxmltree::Node;
use tracing::{debug, instrument};
use wasserzeichen_core::WasserzeichenError;
use wasserzeichen_core::markup::escape_html;

use super::{
    MAX_COLUMNS, MAX_ROWS, Package, TableMarkup, attr, child, open_package, parse_xml, read_part, require_part,
    table_bounds,
};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const FALLBACK_SHEET_PART: &str = "xl/worksheets/sheet1.xml";

/// Convert the first worksheet of an .xlsx package into a `<table>`.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn first_sheet_to_table(bytes: &[u8]) -> Result<TableMarkup, WasserzeichenError> {
    let mut package = open_package(bytes)?;
    let sheet_part = first_sheet_part(&mut package)?;
    let shared = shared_strings(&mut package)?;

    let xml = require_part(&mut package, &sheet_part)?;
    let doc = parse_xml(&sheet_part, &xml)?;

    let mut grid: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    let mut outside = 0u64;
    let mut next_row = 1u32;
    for row in doc.descendants().filter(|n| n.has_tag_name("row")) {
        let row_number = attr(row, "r")
            .and_then(|r| r.trim().parse::<u32>().ok())
            .unwrap_or(next_row);
        next_row = row_number.saturating_add(1);

        let mut next_column = 0u32;
        for cell in row.children().filter(|n| n.has_tag_name("c")) {
            let column = attr(cell, "r")
                .and_then(column_index)
                .unwrap_or(next_column);
            next_column = column.saturating_add(1);
            let Some(value) = cell_value(cell, &shared) else {
                continue;
            };
            if !(1..=MAX_ROWS).contains(&row_number) || column >= MAX_COLUMNS {
                outside += 1;
                continue;
            }
            grid.entry(row_number).or_default().insert(column, value);
        }
    }

    let mut table = render_table(&grid);
    if outside > 0 {
        let dropped = format!("{outside} cell(s) outside the sheet limits dropped");
        table.clipped = Some(match table.clipped {
            Some(cut) => format!("{cut}; {dropped}"),
            None => dropped,
        });
    }
    debug!(part = %sheet_part, rows = grid.len(), clipped = ?table.clipped, "Sheet converted to table");
    Ok(table)
}

/// Locate the first sheet via the workbook and its relationships.
fn first_sheet_part(package: &mut Package<'_>) -> Result<String, WasserzeichenError> {
    let workbook = require_part(package, WORKBOOK_PART)?;
    let workbook = parse_xml(WORKBOOK_PART, workbook.as_str())?;
    let sheets: Vec<Node<'_, '_>> = workbook
        .descendants()
        .filter(|n| n.has_tag_name("sheet"))
        .collect();
    if sheets.len() > 1 {
        let ignored: Vec<&str> = sheets[1..].iter().filter_map(|s| attr(*s, "name")).collect();
        debug!(?ignored, "Only the first sheet is previewed");
    }
    let Some(relationship_id) = sheets.first().and_then(|sheet| attr(*sheet, "id")) else {
        return Ok(FALLBACK_SHEET_PART.to_string());
    };

    let Some(rels) = read_part(package, WORKBOOK_RELS_PART)? else {
        return Ok(FALLBACK_SHEET_PART.to_string());
    };
    let rels = parse_xml(WORKBOOK_RELS_PART, &rels)?;
    let target = rels
        .descendants()
        .filter(|n| n.has_tag_name("Relationship"))
        .find(|n| attr(*n, "Id") == Some(relationship_id))
        .and_then(|n| attr(n, "Target"));

    Ok(match target {
        Some(absolute) if absolute.starts_with('/') => absolute.trim_start_matches('/').to_string(),
        Some(relative) => format!("xl/{}", relative),
        None => FALLBACK_SHEET_PART.to_string(),
    })
}

/// The shared string table; each entry concatenates its rich-text runs.
fn shared_strings(package: &mut Package<'_>) -> Result<Vec<String>, WasserzeichenError> {
    let Some(xml) = read_part(package, SHARED_STRINGS_PART)? else {
        return Ok(Vec::new());
    };
    let doc = parse_xml(SHARED_STRINGS_PART, &xml)?;
    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("si"))
        .map(string_item_text)
        .collect())
}

/// Text of an `si`/`is` item, skipping phonetic runs.
fn string_item_text(item: Node<'_, '_>) -> String {
    item.descendants()
        .filter(|n| n.has_tag_name("t"))
        .filter(|t| !t.ancestors().any(|a| a.has_tag_name("rPh")))
        .filter_map(|t| t.text())
        .collect()
}

/// Display value of a cell, or `None` when it has no value.
fn cell_value(cell: Node<'_, '_>, shared: &[String]) -> Option<String> {
    let raw = child(cell, "v").and_then(|v| v.text());
    let value = match attr(cell, "t").unwrap_or("n") {
        "s" => {
            let index: usize = raw?.trim().parse().ok()?;
            shared.get(index)?.clone()
        }
        "inlineStr" => string_item_text(child(cell, "is")?),
        "b" => match raw?.trim() {
            "1" => "TRUE".to_string(),
            _ => "FALSE".to_string(),
        },
        _ => raw?.to_string(),
    };
    Some(value)
}

/// Zero-based column of an A1-style reference (`"AB12"` is column 27).
fn column_index(reference: &str) -> Option<u32> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters
        .iter()
        .try_fold(0u32, |acc, &b| {
            acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)
        })
        .map(|n| n - 1)
}

/// Rows between the first and last populated row, columns from A to the
/// widest populated column, so sparse sheets keep their shape. Cut to the
/// cell budget from the top-left corner.
fn render_table(grid: &BTreeMap<u32, BTreeMap<u32, String>>) -> TableMarkup {
    let mut html = String::from("<table>");
    let (Some(&first), Some(&last)) = (grid.keys().next(), grid.keys().next_back()) else {
        html.push_str("</table>");
        return TableMarkup { html, clipped: None };
    };
    let width = grid
        .values()
        .filter_map(|cells| cells.keys().next_back())
        .max()
        .map_or(0, |&last_column| u64::from(last_column) + 1);
    let (rows, width, clipped) = table_bounds(u64::from(last - first) + 1, width);

    for offset in 0..rows {
        // `rows` never exceeds the populated span, so this stays within u32.
        let row = first + offset as u32;
        html.push_str("<tr>");
        let cells = grid.get(&row);
        for column in 0..width as u32 {
            let text = cells.and_then(|c| c.get(&column)).map(String::as_str).unwrap_or("");
            html.push_str("<td>");
            html.push_str(&escape_html(text));
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    TableMarkup { html, clipped }
}

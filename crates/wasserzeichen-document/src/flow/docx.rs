// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WordprocessingML to semantic HTML. Only structure survives: headings,
// paragraphs, list items, bold/italic runs, line breaks and tables. Page
// layout, fonts and colours are dropped.

use roxmltree::Node;
use tracing::{debug, instrument};
use wasserzeichen_core::WasserzeichenError;
use wasserzeichen_core::markup::escape_html;

use super::{attr, child, open_package, parse_xml, require_part};

const DOCUMENT_PART: &str = "word/document.xml";

/// Convert a .docx package into an HTML fragment.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn docx_to_html(bytes: &[u8]) -> Result<String, WasserzeichenError> {
    let mut package = open_package(bytes)?;
    let xml = require_part(&mut package, DOCUMENT_PART)?;
    let doc = parse_xml(DOCUMENT_PART, &xml)?;

    let body = doc
        .descendants()
        .find(|n| n.has_tag_name("body"))
        .ok_or_else(|| WasserzeichenError::MarkupError("document has no body".into()))?;

    let mut html = String::new();
    let blocks = write_blocks(&mut html, body);
    debug!(blocks, html_len = html.len(), "Document converted to markup");
    Ok(html)
}

/// Write the block-level children of `container`; returns how many were written.
fn write_blocks(html: &mut String, container: Node<'_, '_>) -> usize {
    let mut written = 0;
    let mut in_list = false;
    for node in container.children().filter(Node::is_element) {
        let list_item = node.has_tag_name("p") && is_list_item(node);
        if in_list && !list_item {
            html.push_str("</ul>");
            in_list = false;
        }
        match node.tag_name().name() {
            "p" => {
                let inner = inline_content(node);
                if inner.is_empty() {
                    continue;
                }
                if list_item {
                    if !in_list {
                        html.push_str("<ul>");
                        in_list = true;
                    }
                    html.push_str(&format!("<li>{inner}</li>"));
                } else {
                    let tag = block_tag(node);
                    html.push_str(&format!("<{tag}>{inner}</{tag}>"));
                }
                written += 1;
            }
            "tbl" => {
                write_table(html, node);
                written += 1;
            }
            // Content controls wrap ordinary blocks.
            "sdt" => {
                if let Some(content) = child(node, "sdtContent") {
                    written += write_blocks(html, content);
                }
            }
            _ => {}
        }
    }
    if in_list {
        html.push_str("</ul>");
    }
    written
}

fn write_table(html: &mut String, table: Node<'_, '_>) {
    html.push_str("<table>");
    for row in table.children().filter(|n| n.has_tag_name("tr")) {
        html.push_str("<tr>");
        for cell in row.children().filter(|n| n.has_tag_name("tc")) {
            html.push_str("<td>");
            write_blocks(html, cell);
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
}

/// `h1`..`h6` for heading and title styles, `p` otherwise.
fn block_tag(paragraph: Node<'_, '_>) -> &'static str {
    let style = child(paragraph, "pPr")
        .and_then(|ppr| child(ppr, "pStyle"))
        .and_then(|style| attr(style, "val"))
        .unwrap_or_default()
        .to_ascii_lowercase();
    if style == "title" {
        return "h1";
    }
    match style.strip_prefix("heading").and_then(|level| level.trim().parse::<u8>().ok()) {
        Some(1) => "h1",
        Some(2) => "h2",
        Some(3) => "h3",
        Some(4) => "h4",
        Some(5) => "h5",
        Some(6..) => "h6",
        _ => "p",
    }
}

fn is_list_item(paragraph: Node<'_, '_>) -> bool {
    child(paragraph, "pPr").and_then(|ppr| child(ppr, "numPr")).is_some()
}

/// Runs of a paragraph as inline HTML. Hyperlinks and smart tags are flattened.
fn inline_content(paragraph: Node<'_, '_>) -> String {
    let mut html = String::new();
    for run in paragraph.descendants().filter(|n| n.has_tag_name("r")) {
        let text = run_text(run);
        if text.is_empty() {
            continue;
        }
        let props = child(run, "rPr");
        let bold = props.is_some_and(|p| toggled(p, "b"));
        let italic = props.is_some_and(|p| toggled(p, "i"));
        match (bold, italic) {
            (true, true) => html.push_str(&format!("<strong><em>{text}</em></strong>")),
            (true, false) => html.push_str(&format!("<strong>{text}</strong>")),
            (false, true) => html.push_str(&format!("<em>{text}</em>")),
            (false, false) => html.push_str(&text),
        }
    }
    html
}

/// Escaped text of a single run, with breaks and tabs.
fn run_text(run: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in run.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "t" => text.push_str(&escape_html(node.text().unwrap_or_default())),
            "br" | "cr" => text.push_str("<br>"),
            "tab" => text.push('\t'),
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

/// On/off run property: present means on unless `w:val` says otherwise.
fn toggled(props: Node<'_, '_>, local: &str) -> bool {
    child(props, local)
        .is_some_and(|prop| !matches!(attr(prop, "val"), Some("0" | "false" | "off")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::tests::zip_with;

    fn docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        zip_with(&[(DOCUMENT_PART, xml.as_str())])
    }

    #[test]
    fn headings_and_paragraphs() {
        let bytes = docx(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Terms</w:t></w:r></w:p>
               <w:p><w:r><w:t>Plain &amp; simple</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            docx_to_html(&bytes).unwrap(),
            "<h2>Terms</h2><p>Plain &amp; simple</p>"
        );
    }

    #[test]
    fn bold_italic_and_breaks() {
        let bytes = docx(
            r#"<w:p>
                 <w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r>
                 <w:r><w:rPr><w:b w:val="0"/><w:i/></w:rPr><w:t>it</w:t><w:br/><w:t>next</w:t></w:r>
               </w:p>"#,
        );
        assert_eq!(
            docx_to_html(&bytes).unwrap(),
            "<p><strong>Bold</strong><em>it<br>next</em></p>"
        );
    }

    #[test]
    fn lists_and_tables() {
        let bytes = docx(
            r#"<w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>one</w:t></w:r></w:p>
               <w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>two</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        assert_eq!(
            docx_to_html(&bytes).unwrap(),
            "<ul><li>one</li><li>two</li></ul><table><tr><td><p>cell</p></td></tr></table>"
        );
    }

    #[test]
    fn missing_document_part_is_a_decode_error() {
        let bytes = zip_with(&[("word/styles.xml", "<styles/>")]);
        assert!(matches!(
            docx_to_html(&bytes),
            Err(WasserzeichenError::Decode(_))
        ));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a PDF and inspect its page tree (page order, boxes,
// rotation, resources) using the `lopdf` crate.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument};
use wasserzeichen_core::WasserzeichenError;

/// US Letter, used when no page box can be found anywhere in the tree.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum depth followed through `/Parent` when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Geometry of a single page in PDF user space (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// 1-based page number in document order.
    pub number: u32,
    pub object_id: ObjectId,
    /// Visible region `[x0, y0, x1, y1]`: the crop box clipped to the media box.
    pub visible_box: [f32; 4],
    /// Clockwise display rotation, normalised to 0, 90, 180 or 270.
    pub rotate: u32,
}

impl PageGeometry {
    pub fn width(&self) -> f32 {
        self.visible_box[2] - self.visible_box[0]
    }

    pub fn height(&self) -> f32 {
        self.visible_box[3] - self.visible_box[1]
    }
}

/// Reads an existing PDF held in memory.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, WasserzeichenError> {
        let document = Document::load_mem(data).map_err(|err| {
            WasserzeichenError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Borrow the underlying lopdf document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Geometry of every page, in ascending page order.
    pub fn pages(&self) -> Result<Vec<PageGeometry>, WasserzeichenError> {
        // `get_pages` is a BTreeMap keyed by page number, so iteration is ordered.
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, object_id)| self.page_geometry(number, object_id))
            .collect()
    }

    fn page_geometry(
        &self,
        number: u32,
        object_id: ObjectId,
    ) -> Result<PageGeometry, WasserzeichenError> {
        let page = self.document.get_dictionary(object_id).map_err(|err| {
            WasserzeichenError::PdfError(format!("page {} is not a dictionary: {}", number, err))
        })?;

        let media_box = self
            .inherited(page, b"MediaBox")
            .and_then(|obj| self.rect(obj))
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let visible_box = self
            .inherited(page, b"CropBox")
            .and_then(|obj| self.rect(obj))
            .and_then(|crop| intersect(crop, media_box))
            .unwrap_or(media_box);

        let rotate = self
            .inherited(page, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);
        // Only quarter turns are valid; anything else is treated as upright.
        let rotate = if rotate % 90 == 0 { rotate as u32 } else { 0 };

        if visible_box[2] - visible_box[0] <= 0.0 || visible_box[3] - visible_box[1] <= 0.0 {
            return Err(WasserzeichenError::PdfError(format!(
                "page {} has an empty page box",
                number
            )));
        }

        Ok(PageGeometry {
            number,
            object_id,
            visible_box,
            rotate,
        })
    }

    /// Resource dictionaries that apply to a page, nearest first.
    pub fn page_resources(&self, page_id: ObjectId) -> Vec<&Dictionary> {
        let Ok((inline, inherited)) = self.document.get_page_resources(page_id) else {
            return Vec::new();
        };
        inline
            .into_iter()
            .chain(
                inherited
                    .into_iter()
                    .filter_map(|id| self.document.get_dictionary(id).ok()),
            )
            .collect()
    }

    /// Look up a page attribute, walking up the page tree for inheritable keys.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut node = page;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get_deref(key, &self.document) {
                return Some(value);
            }
            node = node
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.document.get_dictionary(id))
                .ok()?;
        }
        None
    }

    /// Parse a PDF rectangle, normalising so that x0 <= x1 and y0 <= y1.
    fn rect(&self, object: &Object) -> Option<[f32; 4]> {
        let values = object.as_array().ok()?;
        if values.len() != 4 {
            return None;
        }
        let mut coords = [0.0f32; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            let (_, value) = self.document.dereference(value).ok()?;
            *slot = value.as_float().ok()?;
        }
        let [ax, ay, bx, by] = coords;
        Some([ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)])
    }
}

fn intersect(a: [f32; 4], b: [f32; 4]) -> Option<[f32; 4]> {
    let r = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (r[2] > r[0] && r[3] > r[1]).then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::pdf_with_pages;

    #[test]
    fn pages_come_back_in_source_order() {
        let bytes = pdf_with_pages(&[(200.0, 100.0), (300.0, 150.0), (400.0, 200.0)]);
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        let pages = reader.pages().unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.iter().map(|p| p.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(pages[0].width(), 200.0);
        assert_eq!(pages[2].height(), 200.0);
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        let err = PdfReader::from_bytes(b"%PDF-1.5 definitely not a pdf").err().unwrap();
        assert!(matches!(err, WasserzeichenError::PdfError(_)));
    }

    #[test]
    fn crop_box_is_clipped_to_media_box() {
        assert_eq!(
            intersect([-10.0, -10.0, 50.0, 50.0], [0.0, 0.0, 100.0, 100.0]),
            Some([0.0, 0.0, 50.0, 50.0])
        );
        assert_eq!(intersect([200.0, 200.0, 300.0, 300.0], [0.0, 0.0, 100.0, 100.0]), None);
    }
}

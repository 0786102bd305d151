// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small in-memory PDF fixtures for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// Fill colour painted on page `k` (0-based), so tests can tell pages apart.
pub fn page_color(k: usize) -> [u8; 3] {
    [[204, 0, 0], [0, 153, 0], [0, 0, 204]][k % 3]
}

/// A PDF whose page `k` has the given size in points and a filled square at
/// (10, 10, 40x40) in [`page_color`]`(k)`.
pub fn pdf_with_pages(sizes: &[(f32, f32)]) -> Vec<u8> {
    build(sizes.len(), |doc, k| {
        let (w, h) = sizes[k];
        let [r, g, b] = page_color(k).map(|c| f32::from(c) / 255.0);
        let content = Content {
            operations: vec![
                Operation::new("rg", vec![r.into(), g.into(), b.into()]),
                Operation::new("re", vec![10.into(), 10.into(), 40.into(), 40.into()]),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {},
        }
    })
}

/// A single 100x100 pt page with a 2x2 RGB image drawn over (25, 25, 50x50).
/// The image pixels are red, green, blue and white (row-major from the top).
pub fn pdf_with_image() -> Vec<u8> {
    pdf_with_raw_image(2, 2, vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255])
}

/// Like [`pdf_with_image`], but the DeviceRGB image XObject declares whatever
/// dimensions and carries whatever samples it is given.
pub fn pdf_with_raw_image(width: i64, height: i64, samples: Vec<u8>) -> Vec<u8> {
    build(1, |doc, _| {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            samples.clone(),
        ));
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![50.into(), 0.into(), 0.into(), 50.into(), 25.into(), 25.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => dictionary! { "Im0" => image_id } },
        }
    })
}

/// A single 200x100 pt page that only shows a line of text.
pub fn pdf_with_text() -> Vec<u8> {
    build(1, |doc, _| {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 24.into()]),
                Operation::new("Td", vec![20.into(), 40.into()]),
                Operation::new("Tj", vec![Object::string_literal("Quarterly report")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {},
        }
    })
}

/// A single page drawing a form XObject that draws itself.
pub fn pdf_with_self_nested_form() -> Vec<u8> {
    build(1, |doc, _| {
        let draw_form = Content {
            operations: vec![Operation::new("Do", vec![Object::Name(b"Fm0".to_vec())])],
        }
        .encode()
        .unwrap();
        let form_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            },
            draw_form.clone(),
        ));
        let content_id = doc.add_object(Stream::new(dictionary! {}, draw_form));
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => dictionary! { "Fm0" => form_id } },
        }
    })
}

fn build(
    count: usize,
    mut page: impl FnMut(&mut Document, usize) -> Dictionary,
) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(count);
    for k in 0..count {
        let mut dict = page(&mut doc, k);
        dict.set("Type", "Page");
        dict.set("Parent", pages_id);
        kids.push(doc.add_object(dict).into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

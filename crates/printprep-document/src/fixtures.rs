// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory PDF fixtures for unit tests.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

/// A PDF whose pages have the given `(width, height)` media boxes. Each page
/// carries its own content stream (`% page N`) so pages are distinguishable.
pub(crate) fn pdf_with_pages(sizes: &[(i64, i64)]) -> Vec<u8> {
    pdf_with_inherited(sizes, Dictionary::new())
}

/// `count` US Letter pages.
pub(crate) fn letter_pdf(count: usize) -> Vec<u8> {
    pdf_with_pages(&vec![(612, 792); count])
}

/// Pages sized as in [`pdf_with_pages`], all inheriting `/Rotate degrees`
/// from `/Pages`.
pub(crate) fn pdf_with_inherited_rotation(sizes: &[(i64, i64)], degrees: i64) -> Vec<u8> {
    pdf_with_inherited(sizes, dictionary! { "Rotate" => degrees })
}

/// A PDF whose pages carry no MediaBox and inherit an A4 one from `/Pages`.
pub(crate) fn pdf_with_inherited_media_box(count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let page_ids: Vec<Object> = (0..count)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }))
        })
        .collect();

    let inherited = dictionary! { "MediaBox" => media_box(595, 842) };
    save(finish(doc, pages_id, page_ids, inherited))
}

/// Two Letter pages behind a standard security handler whose user password
/// is not empty.
pub(crate) fn encrypted_pdf() -> Vec<u8> {
    let mut doc = document_with_pages(&[(612, 792), (612, 792)], Dictionary::new());

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1i64,
        "R" => 2i64,
        "O" => Object::String(vec![0x5a; 32], StringFormat::Hexadecimal),
        "U" => Object::String(vec![0xa5; 32], StringFormat::Hexadecimal),
        "P" => -44i64,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(vec![0x11; 16], StringFormat::Hexadecimal),
            Object::String(vec![0x11; 16], StringFormat::Hexadecimal),
        ]),
    );
    save(doc)
}

fn pdf_with_inherited(sizes: &[(i64, i64)], inherited: Dictionary) -> Vec<u8> {
    save(document_with_pages(sizes, inherited))
}

fn document_with_pages(sizes: &[(i64, i64)], inherited: Dictionary) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut page_ids: Vec<Object> = Vec::new();
    for (index, &(width, height)) in sizes.iter().enumerate() {
        let content = format!("% page {}\n", index + 1).into_bytes();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(width, height),
            "Contents" => content_id,
        });
        page_ids.push(Object::Reference(page_id));
    }

    finish(doc, pages_id, page_ids, inherited)
}

fn media_box(width: i64, height: i64) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(height),
    ])
}

fn finish(
    mut doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<Object>,
    inherited: Dictionary,
) -> Document {
    let count = page_ids.len() as i64;
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids,
        "Count" => count,
    };
    for (key, value) in inherited.iter() {
        pages.set(key.clone(), value.clone());
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// The `N` of the `% page N` marker in a page's content, if present.
pub(crate) fn page_marker(pdf_bytes: &[u8]) -> Option<u32> {
    const MARKER: &[u8] = b"% page ";
    let start = pdf_bytes
        .windows(MARKER.len())
        .position(|window| window == MARKER)?
        + MARKER.len();
    let digits: String = pdf_bytes[start..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .map(|&byte| byte as char)
        .collect();
    digits.parse().ok()
}

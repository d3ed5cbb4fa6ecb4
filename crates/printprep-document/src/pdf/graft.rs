// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page grafting — copy a page and everything it references from one lopdf
// document into another.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use printprep_core::error::{PrepError, Result};
use tracing::warn;

/// Page attributes a page may inherit from its ancestors in the page tree
/// (PDF 32000-1 §7.7.3.4). They are materialised on the copy because the
/// copy gets a new parent.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Create an empty document with a catalog and an empty page tree.
pub(crate) fn new_document() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Serialise a document to bytes.
pub(crate) fn save_to_bytes(doc: &mut Document, what: &str) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| PrepError::Decode(format!("failed to serialise {what}: {err}")))?;
    Ok(output)
}

/// Look up `key` on the page dictionary, walking up `/Parent` links when the
/// page does not carry it itself.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current_id = page_id;
    // Bounded walk: a malformed tree with a /Parent cycle must not hang us.
    for _ in 0..64 {
        let dict = doc.get_object(current_id).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// Follow a reference to the object it names; other objects pass through.
pub(crate) fn dereference<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Width and height of a page's (possibly inherited) `/MediaBox`, in points.
pub(crate) fn media_box_size(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let media_box = resolve_inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| dereference(doc, obj))
        .ok_or_else(|| {
            PrepError::Decode(format!("page {page_id:?} has no MediaBox on page or ancestors"))
        })?;

    let corners = media_box
        .as_array()
        .map_err(|err| PrepError::Decode(format!("MediaBox is not an array: {err}")))?;
    if corners.len() != 4 {
        return Err(PrepError::Decode(format!(
            "MediaBox has {} entries, expected 4",
            corners.len()
        )));
    }

    let mut values = [0f32; 4];
    for (slot, corner) in values.iter_mut().zip(corners) {
        *slot = match dereference(doc, corner) {
            Some(Object::Integer(i)) => *i as f32,
            Some(Object::Real(r)) => *r as f32,
            other => {
                return Err(PrepError::Decode(format!(
                    "MediaBox entry is not a number: {other:?}"
                )));
            }
        };
    }

    let [llx, lly, urx, ury] = values;
    Ok(((urx - llx).abs(), (ury - lly).abs()))
}

/// Size of a page as displayed: the MediaBox with its sides swapped when the
/// (possibly inherited) `/Rotate` is a quarter turn. Renderers apply the
/// rotation, so this is the shape of the bitmap they produce.
pub(crate) fn display_size(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let (width, height) = media_box_size(doc, page_id)?;
    let rotate = resolve_inherited(doc, page_id, b"Rotate")
        .and_then(|obj| dereference(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    match rotate.rem_euclid(360) {
        90 | 270 => Ok((height, width)),
        _ => Ok((width, height)),
    }
}

/// Id of the target document's `/Pages` root.
fn pages_root(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .map_err(|err| PrepError::Decode(format!("no catalog: {err}")))?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|err| PrepError::Decode(format!("no /Pages reference: {err}")))
}

/// Copy the page `page_id` of `source` to the end of `target`'s page tree.
///
/// Every object the page references is copied once. Inherited attributes are
/// written onto the copy. Returns the id of the new page.
pub(crate) fn graft_page(
    source: &Document,
    target: &mut Document,
    page_id: ObjectId,
) -> Result<ObjectId> {
    let mut page_dict = source
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|err| {
            PrepError::Decode(format!("cannot read page object {page_id:?}: {err}"))
        })?
        .clone();

    for key in INHERITABLE_KEYS {
        if page_dict.has(key) {
            continue;
        }
        if let Some(value) = resolve_inherited(source, page_id, key) {
            page_dict.set(key.to_vec(), value.clone());
        }
    }

    let pages_id = pages_root(target)?;
    let new_page_id = target.new_object_id();

    let mut graft = Graft {
        source,
        mapping: HashMap::from([(page_id, new_page_id)]),
    };
    let mut cloned = graft.dictionary(target, &page_dict);
    cloned.set("Parent", Object::Reference(pages_id));
    target
        .objects
        .insert(new_page_id, Object::Dictionary(cloned));

    let pages_dict = target
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|err| PrepError::Decode(format!("/Pages is not a dictionary: {err}")))?;
    if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
        kids.push(Object::Reference(new_page_id));
    }
    let count = pages_dict
        .get(b"Count")
        .and_then(Object::as_i64)
        .unwrap_or(0);
    pages_dict.set("Count", Object::Integer(count + 1));

    Ok(new_page_id)
}

/// Object-graph copier. `mapping` records source ids already copied, which
/// both shares objects referenced twice and breaks reference cycles.
struct Graft<'a> {
    source: &'a Document,
    mapping: HashMap<ObjectId, ObjectId>,
}

impl Graft<'_> {
    fn object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let dict = self.dictionary(target, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            Object::Reference(id) => Object::Reference(self.reference(target, *id)),
            other => other.clone(),
        }
    }

    /// Copy a dictionary, dropping `/Parent` (the caller re-links it).
    fn dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.object(target, value));
        }
        copy
    }

    fn reference(&mut self, target: &mut Document, id: ObjectId) -> ObjectId {
        if let Some(mapped) = self.mapping.get(&id) {
            return *mapped;
        }
        let new_id = target.new_object_id();
        self.mapping.insert(id, new_id);

        let copied = match self.source.get_object(id) {
            Ok(object) => self.object(target, object),
            Err(err) => {
                warn!(?id, %err, "cannot resolve reference, using Null");
                Object::Null
            }
        };
        target.objects.insert(new_id, copied);
        new_id
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembler — serialise a PageBuffer into one printable PDF.
//
// Vector pages are grafted in from their single-page PDFs with `lopdf`.
// Raster pages are first laid out with `printpdf` 0.8 (one full-bleed
// grayscale image per page, sized to the page geometry) and then grafted the
// same way, so the final document is always built by one code path.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::GrayImage;
use lopdf::Document;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use printprep_core::error::{PrepError, Result};
use tracing::{debug, info, instrument};

use crate::buffer::{PageBuffer, PageContent};
use crate::pdf::graft;

/// Millimetres per PDF point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Title metadata of the intermediate raster page documents.
const RASTER_PAGE_TITLE: &str = "Printprep raster page";

/// Builds one PDF document from a [`PageBuffer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfAssembler;

impl PdfAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Serialise every page of `buffer`, in order, into a single PDF.
    #[instrument(skip_all, fields(pages = buffer.count()))]
    pub fn to_pdf_bytes(&self, buffer: &PageBuffer) -> Result<Vec<u8>> {
        let mut target = graft::new_document();
        // Replicated buffers share page content; parse each distinct page once.
        let mut parsed: HashMap<usize, Document> = HashMap::new();

        for (index, page) in buffer.iter().enumerate() {
            let key = content_key(page.content());

            if !parsed.contains_key(&key) {
                let loaded = match page.content() {
                    PageContent::Vector(bytes) => Document::load_mem(bytes),
                    PageContent::Raster(bitmap) => {
                        let bytes = self.raster_page_pdf(bitmap, page.width(), page.height())?;
                        Document::load_mem(&bytes)
                    }
                };
                let document = loaded.map_err(|err| {
                    PrepError::Decode(format!("page {} is not a valid PDF: {}", index + 1, err))
                })?;
                parsed.insert(key, document);
            }

            let source = &parsed[&key];
            let page_id = *source.get_pages().get(&1).ok_or_else(|| {
                PrepError::Decode(format!("page {} has an empty page tree", index + 1))
            })?;
            graft::graft_page(source, &mut target, page_id)?;
        }

        let output = graft::save_to_bytes(&mut target, "assembled document")?;
        debug!(output_bytes = output.len(), "PDF assembled");
        Ok(output)
    }

    /// Assemble `buffer` and write it to `path`.
    pub fn write_to_file(&self, buffer: &PageBuffer, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_pdf_bytes(buffer)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote {} page PDF to {}", buffer.count(), path.as_ref().display());
        Ok(())
    }

    /// Lay out one grayscale bitmap as a single full-bleed page.
    fn raster_page_pdf(&self, bitmap: &GrayImage, width_pt: f32, height_pt: f32) -> Result<Vec<u8>> {
        let img_width = bitmap.width() as usize;
        let img_height = bitmap.height() as usize;
        if img_width == 0 || img_height == 0 {
            return Err(PrepError::Decode("raster page has an empty bitmap".into()));
        }

        let raw = RawImage {
            pixels: RawImageData::U8(bitmap.as_raw().clone()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::R8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(RASTER_PAGE_TITLE);
        let xobject_id = doc.add_image(&raw);

        // printpdf places an image at `px / dpi * 72` points; scale that to
        // cover the whole page.
        let dpi: f32 = 72.0;
        let scale_x = width_pt / img_width as f32;
        let scale_y = height_pt / img_height as f32;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(dpi),
                rotate: None,
            },
        }];

        let page = PdfPage::new(Mm(width_pt * MM_PER_PT), Mm(height_pt * MM_PER_PT), ops);
        doc.with_pages(vec![page]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}

/// Identity of a page's shared content allocation.
fn content_key(content: &PageContent) -> usize {
    match content {
        PageContent::Vector(bytes) => Arc::as_ptr(bytes) as *const u8 as usize,
        PageContent::Raster(bitmap) => Arc::as_ptr(bitmap) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Page;
    use crate::fixtures;
    use crate::pdf::reader::PdfReader;

    fn assemble(buffer: &PageBuffer) -> Result<Vec<u8>> {
        PdfAssembler::new().to_pdf_bytes(buffer)
    }

    fn page_sizes(pdf_bytes: &[u8]) -> Vec<(f32, f32)> {
        let doc = Document::load_mem(pdf_bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| graft::media_box_size(&doc, page_id).unwrap())
            .collect()
    }

    #[test]
    fn vector_pages_assemble_in_order() {
        let bytes = fixtures::pdf_with_pages(&[(612, 792), (842, 595), (300, 400)]);
        let buffer = PdfReader::from_bytes(&bytes).unwrap().to_page_buffer().unwrap();
        let reordered: PageBuffer = [3, 1]
            .into_iter()
            .map(|n| buffer.get(n).unwrap().clone())
            .collect();

        let output = assemble(&reordered).unwrap();

        assert_eq!(
            page_sizes(&output),
            vec![(300.0, 400.0), (612.0, 792.0)]
        );
    }

    #[test]
    fn shared_pages_are_emitted_once_per_occurrence() {
        let bytes = fixtures::pdf_with_pages(&[(612, 792)]);
        let buffer = PdfReader::from_bytes(&bytes).unwrap().to_page_buffer().unwrap();
        let tripled = buffer.concatenate(&buffer).concatenate(&buffer);

        let output = assemble(&tripled).unwrap();
        assert_eq!(page_sizes(&output).len(), 3);
    }

    #[test]
    fn raster_pages_take_page_geometry() {
        let bitmap = GrayImage::from_pixel(20, 30, image::Luma([128u8]));
        let page = Page::new(200.0, 300.0, PageContent::raster(bitmap)).unwrap();
        let buffer: PageBuffer = std::iter::once(page).collect();

        let output = assemble(&buffer).unwrap();
        let sizes = page_sizes(&output);

        assert_eq!(sizes.len(), 1);
        assert!((sizes[0].0 - 200.0).abs() < 1.0);
        assert!((sizes[0].1 - 300.0).abs() < 1.0);
    }

    #[test]
    fn empty_buffer_assembles_to_zero_pages() {
        let output = assemble(&PageBuffer::new()).unwrap();
        assert!(page_sizes(&output).is_empty());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open an existing PDF with `lopdf` and split it into
// standalone single-page documents.

use std::path::Path;

use lopdf::Document;
use printprep_core::error::{PrepError, Result};
use tracing::{debug, info, instrument};

use crate::buffer::{Page, PageBuffer, PageContent};
use crate::pdf::graft;

/// Reads an existing PDF and exposes it page by page.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    ///
    /// An unreadable file is reported as `Decode`, the same as a corrupt one.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let data = std::fs::read(path_ref).map_err(|err| {
            PrepError::Decode(format!("cannot read {}: {}", path_ref.display(), err))
        })?;

        let mut reader = Self::from_bytes(&data)?;
        reader.source_path = Some(path_ref.display().to_string());
        Ok(reader)
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| classify_load_error(&err))?;

        if document.is_encrypted() {
            return Err(PrepError::PasswordProtected(
                "document is encrypted and no password was supplied".into(),
            ));
        }

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    // -- Extraction -----------------------------------------------------------

    /// Split the whole document into a [`PageBuffer`] of vector pages, one
    /// standalone single-page PDF per page, in document order.
    ///
    /// Page geometry is the page as displayed, so a page with a quarter-turn
    /// `/Rotate` reports its MediaBox sides swapped.
    #[instrument(skip(self), fields(source = self.source_path.as_deref().unwrap_or("<memory>")))]
    pub fn to_page_buffer(&self) -> Result<PageBuffer> {
        let pages = self.document.get_pages();
        let mut buffer = PageBuffer::with_capacity(pages.len());

        // `get_pages` is a BTreeMap keyed by page number, so this is document order.
        for (&page_number, &page_id) in &pages {
            let (width, height) = graft::display_size(&self.document, page_id)?;
            let bytes = self.extract_object(page_id)?;
            debug!(page_number, width, height, "Page split");
            buffer.append(Page::new(width, height, PageContent::vector(bytes))?);
        }

        info!(pages = buffer.count(), "PDF split into page buffer");
        Ok(buffer)
    }

    // -- Helpers --------------------------------------------------------------

    fn extract_object(&self, page_id: lopdf::ObjectId) -> Result<Vec<u8>> {
        let mut single = graft::new_document();
        graft::graft_page(&self.document, &mut single, page_id)?;
        graft::save_to_bytes(&mut single, "extracted page")
    }
}

/// Map a lopdf load failure onto our taxonomy. lopdf reports failed
/// decryption through its error text only ("decryption", "encrypted",
/// "password").
fn classify_load_error(err: &lopdf::Error) -> PrepError {
    let detail = err.to_string();
    let lower = detail.to_ascii_lowercase();
    if lower.contains("password") || lower.contains("crypt") {
        PrepError::PasswordProtected(detail)
    } else {
        PrepError::Decode(format!("failed to parse PDF: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let result = PdfReader::from_bytes(b"definitely not a pdf");
        assert!(matches!(result, Err(PrepError::Decode(_))));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let result = PdfReader::open("/nonexistent/printprep/missing.pdf");
        assert!(matches!(result, Err(PrepError::Decode(_))));
    }

    #[test]
    fn page_buffer_keeps_order_and_geometry() {
        let bytes = fixtures::pdf_with_pages(&[(612, 792), (842, 595), (300, 400)]);
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 3);

        let buffer = reader.to_page_buffer().unwrap();
        assert_eq!(buffer.count(), 3);
        assert_eq!(buffer.get(1).unwrap().dimensions(), (612.0, 792.0));
        assert_eq!(buffer.get(2).unwrap().dimensions(), (842.0, 595.0));
        assert_eq!(buffer.get(3).unwrap().dimensions(), (300.0, 400.0));
    }

    #[test]
    fn split_pages_are_standalone_pdfs() {
        let bytes = fixtures::pdf_with_pages(&[(612, 792), (842, 595)]);
        let buffer = PdfReader::from_bytes(&bytes).unwrap().to_page_buffer().unwrap();

        let PageContent::Vector(second) = buffer.get(2).unwrap().content() else {
            panic!("expected vector content");
        };
        let single = PdfReader::from_bytes(second).unwrap();
        assert_eq!(single.page_count(), 1);
        assert_eq!(fixtures::page_marker(second), Some(2));
        assert_eq!(
            single.to_page_buffer().unwrap().get(1).unwrap().dimensions(),
            (842.0, 595.0)
        );
    }

    #[test]
    fn rotated_pages_report_displayed_geometry() {
        let bytes = fixtures::pdf_with_inherited_rotation(&[(612, 792), (842, 595)], 270);
        let buffer = PdfReader::from_bytes(&bytes).unwrap().to_page_buffer().unwrap();
        assert_eq!(buffer.get(1).unwrap().dimensions(), (792.0, 612.0));
        assert_eq!(buffer.get(2).unwrap().dimensions(), (595.0, 842.0));
    }

    #[test]
    fn encrypted_document_is_password_protected() {
        let result = PdfReader::from_bytes(&fixtures::encrypted_pdf());
        assert!(matches!(result, Err(PrepError::PasswordProtected(_))));
    }

    #[test]
    fn inherited_media_box_survives_the_split() {
        let bytes = fixtures::pdf_with_inherited_media_box(2);
        let buffer = PdfReader::from_bytes(&bytes).unwrap().to_page_buffer().unwrap();
        assert_eq!(buffer.count(), 2);
        assert_eq!(buffer.get(2).unwrap().dimensions(), (595.0, 842.0));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document loaders — turn a file on disk into a PageBuffer, one loader per
// supported format.

use std::collections::HashMap;
use std::path::Path;

use printprep_core::config::PrepConfig;
use printprep_core::error::{PrepError, Result};
use printprep_core::types::DocumentFormat;
use tracing::{debug, info, instrument};

use crate::buffer::PageBuffer;
use crate::convert::{DocumentConverter, SofficeConverter};
use crate::pdf::PdfReader;

/// Decodes one document format into pages.
pub trait DocumentLoader: Send + Sync {
    /// The format this loader accepts.
    fn format(&self) -> DocumentFormat;

    fn load(&self, path: &Path) -> Result<PageBuffer>;
}

/// Splits a PDF into one vector page per PDF page.
#[derive(Debug, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn load(&self, path: &Path) -> Result<PageBuffer> {
        PdfReader::open(path)?.to_page_buffer()
    }
}

/// Paginates a word-processing document by converting it to PDF first.
pub struct DocxLoader {
    converter: Box<dyn DocumentConverter>,
}

impl DocxLoader {
    pub fn new(converter: Box<dyn DocumentConverter>) -> Self {
        Self { converter }
    }
}

impl DocumentLoader for DocxLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn load(&self, path: &Path) -> Result<PageBuffer> {
        if !path.is_file() {
            return Err(PrepError::Decode(format!(
                "cannot read {}: not a file",
                path.display()
            )));
        }

        let pdf = self.converter.convert_to_pdf(path)?;
        // A PDF our converter produced that we then cannot read is the
        // converter's fault, not the input's.
        let reader = PdfReader::from_bytes(&pdf).map_err(|err| match err {
            PrepError::Decode(detail) => {
                PrepError::Conversion(format!("converter output is unreadable: {detail}"))
            }
            other => other,
        })?;
        reader.to_page_buffer()
    }
}

/// Maps each supported format to its loader.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<DocumentFormat, Box<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// An empty registry. Every lookup fails until loaders are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// PDF plus DOCX via the configured LibreOffice binary.
    pub fn with_defaults(config: &PrepConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PdfLoader));
        registry.register(Box::new(DocxLoader::new(Box::new(
            SofficeConverter::from_config(&config.converter),
        ))));
        registry
    }

    /// Install `loader` for its format, replacing any previous one.
    pub fn register(&mut self, loader: Box<dyn DocumentLoader>) {
        debug!(format = %loader.format(), "registering document loader");
        self.loaders.insert(loader.format(), loader);
    }

    pub fn resolve(&self, format: DocumentFormat) -> Result<&dyn DocumentLoader> {
        self.loaders
            .get(&format)
            .map(|loader| loader.as_ref())
            .ok_or_else(|| PrepError::UnsupportedFormat {
                extension: format.extension().to_string(),
            })
    }

    /// Resolve the format of `path` and load it.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<PageBuffer> {
        let format = DocumentFormat::from_path(path)?;
        let buffer = self.resolve(format)?.load(path)?;
        info!(%format, pages = buffer.count(), "document loaded");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    /// Stands in for LibreOffice by handing back fixed bytes.
    struct CannedConverter(Vec<u8>);

    impl DocumentConverter for CannedConverter {
        fn convert_to_pdf(&self, _path: &Path) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn registry_with(converter_output: Vec<u8>) -> LoaderRegistry {
        let mut registry = LoaderRegistry::new();
        registry.register(Box::new(PdfLoader));
        registry.register(Box::new(DocxLoader::new(Box::new(CannedConverter(
            converter_output,
        )))));
        registry
    }

    #[test]
    fn loads_pdf_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, fixtures::pdf_with_pages(&[(612, 792), (842, 595)])).unwrap();

        let buffer = registry_with(Vec::new()).load(&path).unwrap();
        assert_eq!(buffer.count(), 2);
        assert_eq!(buffer.get(2).unwrap().dimensions(), (842.0, 595.0));
    }

    #[test]
    fn docx_goes_through_the_converter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        std::fs::write(&path, b"PK fake docx").unwrap();

        let buffer = registry_with(fixtures::letter_pdf(3)).load(&path).unwrap();
        assert_eq!(buffer.count(), 3);
    }

    #[test]
    fn unreadable_converter_output_is_a_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        std::fs::write(&path, b"PK fake docx").unwrap();

        let result = registry_with(b"not a pdf".to_vec()).load(&path);
        assert!(matches!(result, Err(PrepError::Conversion(_))));
    }

    #[test]
    fn corrupt_pdf_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.5 truncated").unwrap();

        let result = registry_with(Vec::new()).load(&path);
        assert!(matches!(result, Err(PrepError::Decode(_))));
    }

    #[test]
    fn missing_docx_is_a_decode_error() {
        let result = registry_with(fixtures::letter_pdf(1)).load(Path::new("/nonexistent/a.docx"));
        assert!(matches!(result, Err(PrepError::Decode(_))));
    }

    #[test]
    fn unregistered_format_is_unsupported() {
        let registry = LoaderRegistry::new();
        match registry.load(Path::new("report.pdf")) {
            Err(PrepError::UnsupportedFormat { extension }) => assert_eq!(extension, "pdf"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn extensionless_path_is_rejected_before_loading() {
        let result = registry_with(Vec::new()).load(Path::new("report"));
        assert!(matches!(result, Err(PrepError::MissingExtension { .. })));
    }
}

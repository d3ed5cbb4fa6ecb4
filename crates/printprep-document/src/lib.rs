// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printprep-document — Document preparation for Printprep.
//
// Provides the page buffer model, format-specific loaders (PDF natively, DOCX
// through an external converter), grayscale rasterisation, page-range
// extraction, copy replication, PDF assembly, and the pipeline that chains
// them.

pub mod buffer;
pub mod convert;
pub mod extract;
pub mod load;
pub mod pdf;
pub mod pipeline;
pub mod raster;
pub mod replicate;

#[cfg(test)]
mod fixtures;

// Re-export the primary types so callers can use `printprep_document::Pipeline` etc.
pub use buffer::{Page, PageBuffer, PageContent};
pub use convert::{DocumentConverter, SofficeConverter};
pub use extract::RangeExtractor;
pub use load::{DocumentLoader, DocxLoader, LoaderRegistry, PdfLoader};
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfAssembler;
pub use pipeline::Pipeline;
pub use raster::{PageRenderer, PdftoppmRenderer, Rasterizer};
pub use replicate::Replicator;

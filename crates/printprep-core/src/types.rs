// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Printprep pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PrepError, Result};

/// Hard ceiling on the number of copies a single request may ask for.
pub const MAX_COPIES: u32 = 100;

/// Unique identifier for one preparation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Natively page-addressable.
    Pdf,
    /// Word-processing document, converted to PDF before loading.
    Docx,
}

impl DocumentFormat {
    /// Normalised extension keyword.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Infer the format from a bare extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Resolve the format of `path` from the suffix after the last `.` of its
    /// file name. Touches no files.
    ///
    /// A name without a dot, or with nothing after the last dot, is
    /// `MissingExtension`; a suffix we have no loader for is `UnsupportedFormat`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => {
                return Err(PrepError::MissingExtension {
                    path: path.display().to_string(),
                });
            }
        };

        Self::from_extension(extension).ok_or_else(|| PrepError::UnsupportedFormat {
            extension: extension.to_ascii_lowercase(),
        })
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Colour handling requested for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Pass page content through unchanged.
    Color,
    /// Force rasterisation to grayscale.
    Monochrome,
    /// No preference given. Behaves as `Monochrome`.
    #[default]
    Unspecified,
}

impl ColorMode {
    /// Grayscale unless colour was explicitly asked for.
    pub fn needs_rasterization(&self) -> bool {
        !matches!(self, Self::Color)
    }
}

/// Page range specification, 1-indexed and inclusive on both ends.
///
/// Bounds are signed and unchecked. Zero, negative, inverted, or
/// past-the-end bounds are accepted here and truncate during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: i64,
    pub end: i64,
}

impl PageRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// Opaque handle naming a print destination (a printer URI or output
/// directory). Resolution and availability are the sink's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SinkDescriptor(String);

impl SinkDescriptor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SinkDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw job description as read from a job file. Every field except the
/// source path may be absent; defaults are applied by [`PrintRequestSpec::build`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrintRequestSpec {
    pub source_path: PathBuf,
    #[serde(default)]
    pub sink: Option<SinkDescriptor>,
    #[serde(default)]
    pub copies: Option<u32>,
    #[serde(default)]
    pub page_range: Option<PageRange>,
    #[serde(default)]
    pub color_mode: Option<ColorMode>,
}

impl PrintRequestSpec {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Default::default()
        }
    }

    pub fn sink(mut self, sink: SinkDescriptor) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn copies(mut self, copies: u32) -> Self {
        self.copies = Some(copies);
        self
    }

    pub fn page_range(mut self, start: i64, end: i64) -> Self {
        self.page_range = Some(PageRange::new(start, end));
        self
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = Some(mode);
        self
    }

    /// Freeze into a [`PrintRequest`], substituting defaults for absent fields.
    ///
    /// The copy count is carried as given; the ceiling is enforced by the
    /// pipeline so the failure is reported against a stage.
    pub fn build(self) -> PrintRequest {
        PrintRequest {
            id: JobId::new(),
            source_path: self.source_path,
            sink: self.sink,
            copies: self.copies.unwrap_or(1),
            page_range: self.page_range,
            color_mode: self.color_mode.unwrap_or_default(),
        }
    }
}

/// Immutable configuration for one preparation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintRequest {
    id: JobId,
    source_path: PathBuf,
    sink: Option<SinkDescriptor>,
    copies: u32,
    page_range: Option<PageRange>,
    color_mode: ColorMode,
}

impl PrintRequest {
    /// Shorthand for `PrintRequestSpec::new(path)`.
    pub fn builder(source_path: impl Into<PathBuf>) -> PrintRequestSpec {
        PrintRequestSpec::new(source_path)
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn sink(&self) -> Option<&SinkDescriptor> {
        self.sink.as_ref()
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    /// `None` means the whole document.
    pub fn page_range(&self) -> Option<PageRange> {
        self.page_range
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }
}

impl From<PrintRequestSpec> for PrintRequest {
    fn from(spec: PrintRequestSpec) -> Self {
        spec.build()
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printprep.

use std::fmt;

use thiserror::Error;

/// Top-level error type for all Printprep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    // -- Load errors --
    #[error("no file extension found in '{path}'")]
    MissingExtension { path: String },

    #[error("unsupported document format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("document could not be decoded: {0}")]
    Decode(String),

    #[error("document is password protected: {0}")]
    PasswordProtected(String),

    #[error("document conversion failed: {0}")]
    Conversion(String),

    // -- Transform errors --
    #[error("failed to render page {page}: {detail}")]
    Render { page: usize, detail: String },

    /// Out-of-range page lookup. `extract` recovers from this locally.
    #[error("page {number} not found (document has {count} pages)")]
    PageNotFound { number: u32, count: usize },

    #[error("{requested} copies requested, allowed range is 1..={max}")]
    CopyLimitExceeded { requested: u32, max: u32 },

    #[error("page geometry must be positive, got {width} x {height}")]
    InvalidGeometry { width: f32, height: f32 },

    #[error("run cancelled")]
    Cancelled,

    // -- Submission errors --
    #[error("document has no pages")]
    EmptyDocument,

    #[error("print sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("submission to print sink failed: {0}")]
    Submission(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrepError>;

/// The pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Request checks performed before any document I/O.
    Preflight,
    Load,
    Rasterize,
    Extract,
    Replicate,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Load => "load",
            Self::Rasterize => "rasterize",
            Self::Extract => "extract",
            Self::Replicate => "replicate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pipeline failure tagged with the stage that produced it.
///
/// `error` is the stage's own error, passed through untouched.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub error: PrepError,
}

impl StageError {
    pub fn new(stage: Stage, error: PrepError) -> Self {
        Self { stage, error }
    }

    /// Drop the stage tag and return the underlying error.
    pub fn into_inner(self) -> PrepError {
        self.error
    }
}

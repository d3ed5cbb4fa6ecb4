// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Geometry given to rasterised pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryPolicy {
    /// Every output page takes the first page's media box.
    #[default]
    FirstPage,
    /// Each output page keeps its own media box.
    PerPage,
}

/// External page renderer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Path or name of poppler's `pdftoppm` binary.
    pub pdftoppm: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
        }
    }
}

/// External word-processing converter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Path or name of the LibreOffice `soffice` binary.
    pub soffice: PathBuf,
    /// Wall-clock limit for one conversion.
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            soffice: PathBuf::from("soffice"),
            timeout_secs: 120,
        }
    }
}

/// Settings shared by every run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Rasterisation resolution in dots per inch.
    pub dpi: u32,
    /// Geometry of rasterised pages.
    pub geometry: GeometryPolicy,
    /// Worker threads for per-page rendering. `0` uses one per core.
    pub render_workers: usize,
    pub renderer: RendererConfig,
    pub converter: ConverterConfig,
    /// When set, the output of every stage is written here as a PDF.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            geometry: GeometryPolicy::FirstPage,
            render_workers: 0,
            renderer: RendererConfig::default(),
            converter: ConverterConfig::default(),
            snapshot_dir: None,
        }
    }
}

impl PrepConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(PrepError::Config("dpi must be at least 1".into()));
        }
        if self.converter.timeout_secs == 0 {
            return Err(PrepError::Config(
                "converter.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

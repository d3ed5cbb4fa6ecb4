// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderers — draw one page into a bitmap.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use image::DynamicImage;
use printprep_core::error::{PrepError, Result};
use tracing::{debug, instrument};

use crate::buffer::{Page, PageContent};

/// Renders a single page at a given resolution.
///
/// Implementations must be shareable across the render pool. Errors carry
/// page index 0; the rasterizer re-tags them with the real page.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &Page, dpi: u32) -> Result<DynamicImage>;
}

/// Renders vector pages with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: PathBuf,
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PdftoppmRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl PageRenderer for PdftoppmRenderer {
    #[instrument(skip(self, page))]
    fn render(&self, page: &Page, dpi: u32) -> Result<DynamicImage> {
        let pdf = match page.content() {
            PageContent::Vector(bytes) => bytes,
            // Already a bitmap; nothing to draw.
            PageContent::Raster(bitmap) => {
                return Ok(DynamicImage::ImageLuma8(bitmap.as_ref().clone()));
            }
        };

        let scratch = tempfile::tempdir().map_err(|err| render_error(err.to_string()))?;
        let input = scratch.path().join("page.pdf");
        let prefix = scratch.path().join("page");
        std::fs::write(&input, pdf).map_err(|err| render_error(err.to_string()))?;

        let output = Command::new(&self.binary)
            .arg("-gray")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&input)
            .arg(&prefix)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                render_error(format!("cannot start {}: {}", self.binary.display(), err))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_error(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let png = prefix.with_extension("png");
        let bitmap = image::open(&png)
            .map_err(|err| render_error(format!("cannot read rendered bitmap: {err}")))?;
        debug!(width = bitmap.width(), height = bitmap.height(), "page rendered");
        Ok(bitmap)
    }
}

fn render_error(detail: String) -> PrepError {
    PrepError::Render { page: 0, detail }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer — replace every page of a buffer with a single-channel bitmap.
//
// Pages are rendered concurrently on a bounded rayon pool. Results are
// collected by page index, so output order always matches input order, and
// the first failing page fails the whole stage.

use std::sync::Arc;

use printprep_core::cancel::CancelToken;
use printprep_core::config::{GeometryPolicy, PrepConfig};
use printprep_core::error::{PrepError, Result};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::buffer::{Page, PageBuffer, PageContent};
use crate::raster::renderer::{PageRenderer, PdftoppmRenderer};

/// Default rasterisation resolution.
pub const DEFAULT_DPI: u32 = 300;

pub struct Rasterizer {
    renderer: Arc<dyn PageRenderer>,
    dpi: u32,
    geometry: GeometryPolicy,
    /// Render threads. `0` lets rayon pick one per core.
    workers: usize,
}

impl Rasterizer {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            renderer,
            dpi: DEFAULT_DPI,
            geometry: GeometryPolicy::default(),
            workers: 0,
        }
    }

    /// A `pdftoppm`-backed rasterizer using the configured resolution,
    /// geometry policy, and pool size.
    pub fn from_config(config: &PrepConfig) -> Self {
        Self::new(Arc::new(PdftoppmRenderer::new(&config.renderer.pdftoppm)))
            .with_dpi(config.dpi)
            .with_geometry(config.geometry)
            .with_workers(config.render_workers)
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryPolicy) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Render every page of `buffer` to grayscale.
    ///
    /// Output pages take the first page's geometry under
    /// [`GeometryPolicy::FirstPage`] and their own under
    /// [`GeometryPolicy::PerPage`]. The input is never modified. Any page
    /// failure yields `Render` for that page and no buffer; a cancellation
    /// observed before a page starts yields `Cancelled`.
    #[instrument(skip_all, fields(pages = buffer.count(), dpi = self.dpi, geometry = ?self.geometry))]
    pub fn to_grayscale(&self, buffer: &PageBuffer, cancel: &CancelToken) -> Result<PageBuffer> {
        let Some(first) = buffer.pages().first() else {
            debug!("empty buffer, nothing to rasterize");
            return Ok(PageBuffer::new());
        };
        let first_page_size = first.dimensions();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("printprep-render-{index}"))
            .build()
            .map_err(|err| PrepError::Config(format!("cannot start render pool: {err}")))?;

        let pages: Vec<Page> = pool.install(|| {
            buffer
                .pages()
                .par_iter()
                .enumerate()
                .map(|(index, page)| {
                    cancel.check()?;
                    let number = index + 1;

                    let bitmap = self
                        .renderer
                        .render(page, self.dpi)
                        .map_err(|err| tag_page(err, number))?
                        .into_luma8();

                    let (width, height) = match self.geometry {
                        GeometryPolicy::FirstPage => first_page_size,
                        GeometryPolicy::PerPage => page.dimensions(),
                    };
                    debug!(page = number, width, height, "page rasterized");
                    Page::new(width, height, PageContent::raster(bitmap))
                        .map_err(|err| tag_page(err, number))
                })
                .collect::<Result<Vec<Page>>>()
        })?;

        info!(pages = pages.len(), "buffer rasterized");
        Ok(pages.into_iter().collect())
    }
}

/// Attribute a renderer failure to page `number`. Cancellation passes
/// through untouched.
fn tag_page(err: PrepError, number: usize) -> PrepError {
    match err {
        PrepError::Cancelled => PrepError::Cancelled,
        PrepError::Render { detail, .. } => PrepError::Render {
            page: number,
            detail,
        },
        other => PrepError::Render {
            page: number,
            detail: other.to_string(),
        },
    }
}

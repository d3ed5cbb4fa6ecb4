// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preparation pipeline — load, optionally rasterise and extract, then
// replicate.
//
// The run is strictly linear and stops at the first failing stage. Every
// stage consumes the previous buffer by reference and produces a new one, so
// a failed stage leaves nothing half-built behind. Errors come back tagged
// with the stage that raised them.

use std::path::{Path, PathBuf};

use printprep_core::cancel::CancelToken;
use printprep_core::config::PrepConfig;
use printprep_core::error::{PrepError, Stage, StageError};
use printprep_core::types::{DocumentFormat, PrintRequest};
use tracing::{debug, info, instrument, warn};

use crate::buffer::PageBuffer;
use crate::extract::RangeExtractor;
use crate::load::LoaderRegistry;
use crate::pdf::PdfAssembler;
use crate::raster::Rasterizer;
use crate::replicate::Replicator;

/// Runs print requests through the preparation stages.
pub struct Pipeline {
    config: PrepConfig,
    loaders: LoaderRegistry,
    rasterizer: Rasterizer,
}

impl Pipeline {
    pub fn new(config: PrepConfig, loaders: LoaderRegistry, rasterizer: Rasterizer) -> Self {
        Self {
            config,
            loaders,
            rasterizer,
        }
    }

    /// Default loaders and a `pdftoppm` rasterizer, both taken from `config`.
    pub fn from_config(config: PrepConfig) -> Self {
        let loaders = LoaderRegistry::with_defaults(&config);
        let rasterizer = Rasterizer::from_config(&config);
        Self::new(config, loaders, rasterizer)
    }

    /// Prepare `request` for printing.
    ///
    /// Preflight runs before anything touches the source file: the format
    /// must resolve to a registered loader and the copy count must be within
    /// bounds. `cancel` is polled before every stage.
    #[instrument(skip_all, fields(job = %request.id(), source = %request.source_path().display()))]
    pub fn run(&self, request: &PrintRequest, cancel: &CancelToken) -> Result<PageBuffer, StageError> {
        // -- Preflight ----------------------------------------------------------
        let format = DocumentFormat::from_path(request.source_path()).map_err(at(Stage::Preflight))?;
        let loader = self.loaders.resolve(format).map_err(at(Stage::Preflight))?;
        Replicator::check_copies(request.copies()).map_err(at(Stage::Preflight))?;

        let mut snapshots = Snapshots::new(self.config.snapshot_dir.as_deref());

        // -- Load ---------------------------------------------------------------
        checkpoint(cancel, Stage::Load)?;
        let mut buffer = loader
            .load(request.source_path())
            .map_err(at(Stage::Load))?;
        info!(%format, pages = buffer.count(), "loaded");
        snapshots.record(Stage::Load, &buffer);

        // -- Rasterize ------------------------------------------------------------
        if request.color_mode().needs_rasterization() {
            checkpoint(cancel, Stage::Rasterize)?;
            buffer = self
                .rasterizer
                .to_grayscale(&buffer, cancel)
                .map_err(at(Stage::Rasterize))?;
            snapshots.record(Stage::Rasterize, &buffer);
        } else {
            debug!("colour requested, skipping rasterization");
        }

        // -- Extract --------------------------------------------------------------
        if let Some(range) = request.page_range() {
            checkpoint(cancel, Stage::Extract)?;
            buffer = RangeExtractor::extract(&buffer, range.start, range.end);
            snapshots.record(Stage::Extract, &buffer);
        }

        // -- Replicate ------------------------------------------------------------
        checkpoint(cancel, Stage::Replicate)?;
        buffer = Replicator::replicate(&buffer, request.copies()).map_err(at(Stage::Replicate))?;
        snapshots.record(Stage::Replicate, &buffer);

        info!(pages = buffer.count(), copies = request.copies(), "document prepared");
        Ok(buffer)
    }
}

fn at(stage: Stage) -> impl FnOnce(PrepError) -> StageError {
    move |error| StageError::new(stage, error)
}

fn checkpoint(cancel: &CancelToken, next: Stage) -> Result<(), StageError> {
    cancel.check().map_err(|error| {
        info!(stage = %next, "run cancelled");
        StageError::new(next, error)
    })
}

/// Writes each stage's output as `NN-<stage>.pdf` when a snapshot directory
/// is configured.
struct Snapshots {
    dir: Option<PathBuf>,
    sequence: u32,
}

impl Snapshots {
    fn new(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
            sequence: 0,
        }
    }

    /// Failures are logged and otherwise ignored.
    fn record(&mut self, stage: Stage, buffer: &PageBuffer) {
        let Some(dir) = &self.dir else {
            return;
        };
        self.sequence += 1;
        let path = dir.join(format!("{:02}-{}.pdf", self.sequence, stage));

        let written = std::fs::create_dir_all(dir)
            .map_err(PrepError::from)
            .and_then(|()| PdfAssembler::new().write_to_file(buffer, &path));
        match written {
            Ok(()) => debug!(path = %path.display(), "stage snapshot written"),
            Err(err) => warn!(path = %path.display(), %err, "could not write stage snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use image::{DynamicImage, GrayImage, Luma};
    use printprep_core::config::GeometryPolicy;
    use printprep_core::types::ColorMode;
    use printprep_core::error::Result;

    use crate::buffer::{Page, PageContent};
    use crate::fixtures;
    use crate::load::PdfLoader;
    use crate::pdf::PdfReader;
    use crate::raster::PageRenderer;

    /// Tiny flat bitmaps whose gray level is the source page number, so
    /// page order can be checked after rasterisation.
    struct MarkerRenderer {
        fail: bool,
    }

    impl PageRenderer for MarkerRenderer {
        fn render(&self, page: &Page, _dpi: u32) -> Result<DynamicImage> {
            if self.fail {
                return Err(PrepError::Render {
                    page: 0,
                    detail: "decoder fault".into(),
                });
            }
            let PageContent::Vector(bytes) = page.content() else {
                panic!("rasterizing an already rasterized page");
            };
            let number = fixtures::page_marker(bytes).expect("fixture page marker");
            Ok(DynamicImage::ImageLuma8(GrayImage::from_pixel(
                8,
                11,
                Luma([number as u8]),
            )))
        }
    }

    /// Source page number carried by each output page.
    fn source_pages(buffer: &PageBuffer) -> Vec<u32> {
        buffer
            .iter()
            .map(|page| match page.content() {
                PageContent::Raster(bitmap) => u32::from(bitmap.get_pixel(0, 0).0[0]),
                PageContent::Vector(bytes) => {
                    fixtures::page_marker(bytes).expect("fixture page marker")
                }
            })
            .collect()
    }

    fn pipeline_with(config: PrepConfig, failing_renderer: bool) -> Pipeline {
        let mut loaders = LoaderRegistry::new();
        loaders.register(Box::new(PdfLoader));
        let rasterizer = Rasterizer::new(Arc::new(MarkerRenderer {
            fail: failing_renderer,
        }))
        .with_geometry(config.geometry)
        .with_workers(2);
        Pipeline::new(config, loaders, rasterizer)
    }

    fn pipeline() -> Pipeline {
        pipeline_with(PrepConfig::default(), false)
    }

    fn source(dir: &tempfile::TempDir, pages: usize) -> PathBuf {
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, fixtures::letter_pdf(pages)).unwrap();
        path
    }

    #[test]
    fn monochrome_range_and_copies() {
        let dir = tempfile::tempdir().unwrap();
        let request = PrintRequest::builder(source(&dir, 10))
            .page_range(3, 7)
            .copies(2)
            .color_mode(ColorMode::Monochrome)
            .build();

        let output = pipeline().run(&request, &CancelToken::new()).unwrap();

        assert_eq!(output.count(), 10);
        assert!(output.iter().all(|page| page.content().is_grayscale()));
        assert!(output.iter().all(|page| page.dimensions() == (612.0, 792.0)));
        assert_eq!(source_pages(&output), vec![3, 4, 5, 6, 7, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn range_past_end_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let request = PrintRequest::builder(source(&dir, 5))
            .page_range(4, 20)
            .color_mode(ColorMode::Color)
            .build();

        let output = pipeline().run(&request, &CancelToken::new()).unwrap();
        assert_eq!(source_pages(&output), vec![4, 5]);
    }

    #[test]
    fn negative_range_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let request = PrintRequest::builder(source(&dir, 5))
            .page_range(-1, 3)
            .color_mode(ColorMode::Color)
            .build();

        let output = pipeline().run(&request, &CancelToken::new()).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn copy_ceiling_fails_in_preflight() {
        // The source does not exist: reaching Load would fail differently.
        let request = PrintRequest::builder("/nonexistent/printprep/report.pdf")
            .copies(150)
            .build();

        let err = pipeline().run(&request, &CancelToken::new()).unwrap_err();
        assert_eq!(err.stage, Stage::Preflight);
        assert!(matches!(
            err.error,
            PrepError::CopyLimitExceeded {
                requested: 150,
                max: 100
            }
        ));
    }

    #[test]
    fn missing_extension_fails_before_io() {
        let request = PrintRequest::builder("report").build();
        let err = pipeline().run(&request, &CancelToken::new()).unwrap_err();
        assert_eq!(err.stage, Stage::Preflight);
        assert!(matches!(err.error, PrepError::MissingExtension { .. }));
    }

    #[test]
    fn unregistered_format_fails_in_preflight() {
        let request = PrintRequest::builder("/nonexistent/letter.docx").build();
        let err = pipeline().run(&request, &CancelToken::new()).unwrap_err();
        assert_eq!(err.stage, Stage::Preflight);
        assert!(matches!(err.error, PrepError::UnsupportedFormat { .. }));
    }

    #[test]
    fn color_without_range_returns_loaded_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = source(&dir, 3);
        let request = PrintRequest::builder(&path)
            .color_mode(ColorMode::Color)
            .build();

        let output = pipeline().run(&request, &CancelToken::new()).unwrap();
        let loaded = PdfReader::open(&path).unwrap().to_page_buffer().unwrap();
        assert_eq!(output, loaded);
    }

    #[test]
    fn unspecified_color_is_rasterized() {
        let dir = tempfile::tempdir().unwrap();
        let request = PrintRequest::builder(source(&dir, 2)).build();

        let output = pipeline().run(&request, &CancelToken::new()).unwrap();
        assert!(output.iter().all(|page| page.content().is_grayscale()));
    }

    #[test]
    fn render_failure_is_tagged_with_its_stage() {
        let dir = tempfile::tempdir().unwrap();
        let request = PrintRequest::builder(source(&dir, 2)).build();

        let err = pipeline_with(PrepConfig::default(), true)
            .run(&request, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.stage, Stage::Rasterize);
        assert!(matches!(err.error, PrepError::Render { page: 1..=2, .. }));
    }

    #[test]
    fn corrupt_source_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = pipeline()
            .run(&PrintRequest::builder(path).build(), &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.stage, Stage::Load);
        assert!(matches!(err.error, PrepError::Decode(_)));
    }

    #[test]
    fn encrypted_source_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        std::fs::write(&path, fixtures::encrypted_pdf()).unwrap();

        let err = pipeline()
            .run(&PrintRequest::builder(path).build(), &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.stage, Stage::Load);
        assert!(matches!(err.error, PrepError::PasswordProtected(_)));
    }

    #[test]
    fn cancelled_before_load() {
        let dir = tempfile::tempdir().unwrap();
        let request = PrintRequest::builder(source(&dir, 2)).build();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = pipeline().run(&request, &cancel).unwrap_err();
        assert_eq!(err.stage, Stage::Load);
        assert!(matches!(err.error, PrepError::Cancelled));
    }

    #[test]
    fn snapshots_are_written_per_stage() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_dir = dir.path().join("snapshots");
        let config = PrepConfig {
            snapshot_dir: Some(snapshot_dir.clone()),
            geometry: GeometryPolicy::PerPage,
            ..PrepConfig::default()
        };
        let request = PrintRequest::builder(source(&dir, 3))
            .page_range(1, 2)
            .build();

        pipeline_with(config, false)
            .run(&request, &CancelToken::new())
            .unwrap();

        for name in ["01-load.pdf", "02-rasterize.pdf", "03-extract.pdf", "04-replicate.pdf"] {
            assert!(snapshot_dir.join(name).is_file(), "missing snapshot {name}");
        }
    }
}

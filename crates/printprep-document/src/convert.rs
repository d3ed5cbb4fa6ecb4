// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word-processing document conversion.
//
// Formats we cannot paginate ourselves are handed to an external converter
// that produces a PDF, which then goes through the normal PDF loader. The
// default converter drives a headless LibreOffice (`soffice`).

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use printprep_core::config::ConverterConfig;
use printprep_core::error::{PrepError, Result};
use tracing::{debug, info, instrument, warn};

/// Turns a non-native document into PDF bytes.
pub trait DocumentConverter: Send + Sync {
    fn convert_to_pdf(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Converter backed by `soffice --headless --convert-to pdf`.
pub struct SofficeConverter {
    binary: PathBuf,
    timeout: Duration,
}

impl SofficeConverter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(&config.soffice, Duration::from_secs(config.timeout_secs))
    }
}

impl DocumentConverter for SofficeConverter {
    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    fn convert_to_pdf(&self, path: &Path) -> Result<Vec<u8>> {
        let out_dir = tempfile::tempdir()
            .map_err(|err| PrepError::Conversion(format!("cannot create scratch dir: {err}")))?;

        info!(source = %path.display(), "converting document to PDF");

        let mut child = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir.path())
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                PrepError::Conversion(format!(
                    "cannot start {}: {}",
                    self.binary.display(),
                    err
                ))
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= self.timeout => {
                    warn!(timeout_secs = self.timeout.as_secs(), "converter timed out, killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PrepError::Conversion(format!(
                        "conversion timed out after {}s",
                        self.timeout.as_secs()
                    )));
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(100)),
                Err(err) => {
                    return Err(PrepError::Conversion(format!(
                        "lost track of converter process: {err}"
                    )));
                }
            }
        };

        if !status.success() {
            return Err(PrepError::Conversion(format!(
                "{} exited with {}",
                self.binary.display(),
                status
            )));
        }

        let stem = path.file_stem().ok_or_else(|| {
            PrepError::Conversion(format!("{} has no file name", path.display()))
        })?;
        let output = out_dir.path().join(stem).with_extension("pdf");
        let bytes = std::fs::read(&output).map_err(|err| {
            PrepError::Conversion(format!(
                "converter produced no output at {}: {}",
                output.display(),
                err
            ))
        })?;

        debug!(output_bytes = bytes.len(), "conversion complete");
        Ok(bytes)
    }
}

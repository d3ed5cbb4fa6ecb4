// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface and job file loading.

use std::path::{Path, PathBuf};

use clap::Parser;

use printprep_core::config::PrepConfig;
use printprep_core::error::Result;
use printprep_core::types::{PrintRequest, PrintRequestSpec, SinkDescriptor};

/// Prepare a document for printing (grayscale, page range, copies) and send
/// it to a print sink.
#[derive(Debug, Parser)]
#[command(name = "printprep", about, version)]
pub struct Cli {
    /// Job description (JSON: source_path, sink, copies, page_range, color_mode)
    #[arg(value_name = "JOB")]
    pub job: PathBuf,

    /// Pipeline settings (JSON). Default: built-in settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print sink URI, overriding the job's `sink`
    #[arg(long, value_name = "URI")]
    pub sink: Option<String>,

    /// Prepare the document but do not submit it
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, write the prepared document to this PDF file
    #[arg(long, value_name = "FILE", requires = "dry_run")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn load_config(&self) -> Result<PrepConfig> {
        match &self.config {
            Some(path) => PrepConfig::load(path),
            None => Ok(PrepConfig::default()),
        }
    }

    /// Read the job file and apply command-line overrides.
    pub fn load_request(&self) -> Result<PrintRequest> {
        let mut spec = read_job(&self.job)?;
        if let Some(sink) = &self.sink {
            spec = spec.sink(SinkDescriptor::new(sink.clone()));
        }
        Ok(spec.build())
    }
}

fn read_job(path: &Path) -> Result<PrintRequestSpec> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printprep — document print preparation.
//
// Entry point. Initialises logging, loads settings and the job, runs the
// preparation pipeline, and hands the result to the print sink.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use printprep_core::cancel::CancelToken;
use printprep_core::error::{PrepError, StageError};
use printprep_core::human_errors::{HumanError, humanize_error, humanize_stage_error};
use printprep_document::{PdfAssembler, Pipeline};
use printprep_print::{PrintSubmitter, SinkSubmitter};

use cli::Cli;

/// Anything that can end a run.
#[derive(Debug)]
enum Failure {
    Stage(StageError),
    Other(PrepError),
}

impl From<StageError> for Failure {
    fn from(err: StageError) -> Self {
        Self::Stage(err)
    }
}

impl From<PrepError> for Failure {
    fn from(err: PrepError) -> Self {
        Self::Other(err)
    }
}

impl Failure {
    fn humanize(&self) -> HumanError {
        match self {
            Self::Stage(err) => humanize_stage_error(err),
            Self::Other(err) => humanize_error(err),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            match &failure {
                Failure::Stage(err) => error!(stage = %err.stage, error = %err.error, "run failed"),
                Failure::Other(err) => error!(error = %err, "run failed"),
            }
            let human = failure.humanize();
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Failure> {
    let config = cli.load_config()?;
    let request = cli.load_request()?;
    info!(job = %request.id(), source = %request.source_path().display(), "Printprep starting");

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    // The pipeline is synchronous and CPU-heavy.
    let pipeline = Pipeline::from_config(config);
    let job = request.clone();
    let run_cancel = cancel.clone();
    let buffer = tokio::task::spawn_blocking(move || pipeline.run(&job, &run_cancel))
        .await
        .map_err(|e| PrepError::Io(std::io::Error::other(e)))??;

    if cli.dry_run {
        if let Some(output) = &cli.output {
            PdfAssembler::new().write_to_file(&buffer, output)?;
        }
        println!("{} pages prepared (dry run, nothing submitted)", buffer.count());
        return Ok(());
    }

    // Last chance to back out before anything reaches the sink.
    cancel.check()?;

    let receipt = SinkSubmitter::new()
        .submit(buffer, request.sink())
        .await?;
    println!("{}", serde_json::to_string_pretty(&receipt).map_err(PrepError::from)?);
    Ok(())
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory sink — drop the finished PDF into a spool directory.

use std::path::{Path, PathBuf};

use printprep_core::error::{PrepError, Result};
use tracing::info;

/// Write `document` as `<file_stem>.pdf` inside `dir`.
///
/// The directory must already exist; a missing one means the sink is not
/// there, not that we should create it.
pub async fn write_to_dir(dir: &Path, file_stem: &str, document: &[u8]) -> Result<PathBuf> {
    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(PrepError::SinkUnavailable(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let path = dir.join(format!("{file_stem}.pdf"));
    // Spool watchers must never pick up a partial file.
    let partial = dir.join(format!(".{file_stem}.pdf.part"));
    tokio::fs::write(&partial, document)
        .await
        .map_err(|e| PrepError::Submission(format!("write {}: {e}", partial.display())))?;
    tokio::fs::rename(&partial, &path)
        .await
        .map_err(|e| PrepError::Submission(format!("rename to {}: {e}", path.display())))?;

    info!(path = %path.display(), bytes = document.len(), "document written to spool directory");
    Ok(path)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print submission — hand a prepared buffer to a print sink.
//
// The buffer is taken by value: once submitted, the caller no longer owns it.
// Nothing is sent until the whole document has been assembled, so a failing
// assembly never leaves a sink with half a job.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use uuid::Uuid;

use printprep_core::error::{PrepError, Result};
use printprep_core::types::SinkDescriptor;
use printprep_document::{PageBuffer, PdfAssembler};

use crate::directory::write_to_dir;
use crate::ipp_client::IppClient;
use crate::lpr_client::send_lpr;
use crate::raw_client::send_raw;
use crate::sink::SinkKind;

/// Proof of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    /// Local identifier for this submission.
    pub job_id: Uuid,
    pub sink: SinkDescriptor,
    pub pages: usize,
    /// Size of the submitted PDF.
    pub bytes: usize,
    /// Lowercase hex SHA-256 of the submitted PDF.
    pub sha256: String,
    pub submitted_at: DateTime<Utc>,
    /// Job id assigned by the printer, for sinks that report one (IPP).
    pub remote_job_id: Option<i32>,
}

/// Accepts finished page buffers for printing.
pub trait PrintSubmitter: Send + Sync {
    /// Submit `buffer` to `sink`.
    ///
    /// An empty buffer is `EmptyDocument`; a missing or unroutable sink is
    /// `SinkUnavailable`. Both are checked before any work is done.
    fn submit(
        &self,
        buffer: PageBuffer,
        sink: Option<&SinkDescriptor>,
    ) -> impl Future<Output = Result<SubmissionReceipt>> + Send;
}

/// Submits to the sink named by the descriptor's URI scheme.
#[derive(Debug, Clone)]
pub struct SinkSubmitter {
    /// Prefix for the job name shown in printer queues.
    job_name: String,
}

impl Default for SinkSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkSubmitter {
    pub fn new() -> Self {
        Self {
            job_name: "printprep".into(),
        }
    }

    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = job_name.into();
        self
    }
}

impl PrintSubmitter for SinkSubmitter {
    #[instrument(skip_all, fields(pages = buffer.count(), sink = ?sink.map(SinkDescriptor::as_str)))]
    async fn submit(
        &self,
        buffer: PageBuffer,
        sink: Option<&SinkDescriptor>,
    ) -> Result<SubmissionReceipt> {
        if buffer.is_empty() {
            return Err(PrepError::EmptyDocument);
        }
        let sink = sink
            .ok_or_else(|| PrepError::SinkUnavailable("no print sink was given".into()))?;
        let kind = SinkKind::parse(sink)?;

        let job_id = Uuid::new_v4();
        let pages = buffer.count();

        // Assembly is CPU-bound; keep it off the async workers.
        let document = tokio::task::spawn_blocking(move || PdfAssembler::new().to_pdf_bytes(&buffer))
            .await
            .map_err(|e| PrepError::Submission(format!("document assembly task failed: {e}")))??;
        let sha256 = hash_bytes(&document);
        let bytes = document.len();
        let job_name = format!("{}-{}", self.job_name, job_id);

        let remote_job_id = match kind {
            SinkKind::Ipp { uri } => Some(IppClient::new(&uri)?.print_job(document, &job_name).await?),
            SinkKind::Raw { host, port } => {
                send_raw(&host, port, &document).await?;
                None
            }
            SinkKind::Lpd { host, port, queue } => {
                // Low bits of the uuid; only the last three digits are used.
                let job_number = (job_id.as_u128() & 0xffff) as u32;
                send_lpr(&host, port, &queue, &document, &job_name, job_number).await?;
                None
            }
            SinkKind::Directory { path } => {
                write_to_dir(&path, &job_name, &document).await?;
                None
            }
        };

        let receipt = SubmissionReceipt {
            job_id,
            sink: sink.clone(),
            pages,
            bytes,
            sha256,
            submitted_at: Utc::now(),
            remote_job_id,
        };
        info!(job_id = %receipt.job_id, pages, bytes, "document submitted");
        Ok(receipt)
    }
}

/// SHA-256 of `data` as lowercase hex.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

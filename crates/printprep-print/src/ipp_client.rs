// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async IPP client for network printers.
//
// Sends Print-Job (RFC 8011 §4.2.1) through the `ipp` crate's async API.

use std::io::Cursor;

use ipp::prelude::*;
use tracing::{error, info, instrument};

use printprep_core::error::{PrepError, Result};

/// MIME type of every document we submit.
pub const PDF_MIME: &str = "application/pdf";

/// Async IPP client bound to a single printer URI.
pub struct IppClient {
    /// The target printer URI (ipp:// or ipps://).
    uri: Uri,
}

impl IppClient {
    /// Create a client for `uri`. An unparseable URI is `SinkUnavailable`.
    pub fn new(uri: &str) -> Result<Self> {
        let parsed: Uri = uri
            .parse()
            .map_err(|e| PrepError::SinkUnavailable(format!("invalid URI '{uri}': {e}")))?;
        Ok(Self { uri: parsed })
    }

    /// Submit a PDF as a Print-Job and return the printer-assigned job-id.
    #[instrument(skip(self, document), fields(uri = %self.uri, bytes = document.len()))]
    pub async fn print_job(&self, document: Vec<u8>, job_name: &str) -> Result<i32> {
        let payload = IppPayload::new(Cursor::new(document));

        let operation = IppOperationBuilder::print_job(self.uri.clone(), payload)
            .job_title(job_name)
            .document_format(PDF_MIME)
            .build();

        let client = AsyncIppClient::new(self.uri.clone());

        info!("sending Print-Job");
        let response = client
            .send(operation)
            .await
            .map_err(|e| PrepError::Submission(format!("Print-Job: {e}")))?;

        if !response.header().status_code().is_success() {
            let code = response.header().status_code();
            error!(status = ?code, "Print-Job failed");
            return Err(PrepError::Submission(format!(
                "Print-Job returned status {code:?}"
            )));
        }

        let job_id = extract_job_id(response.attributes()).ok_or_else(|| {
            PrepError::Submission("Print-Job response missing job-id attribute".into())
        })?;

        info!(job_id, "print job accepted by printer");
        Ok(job_id)
    }
}

/// The `job-id` integer from a response's Job Attributes group.
fn extract_job_id(attrs: &IppAttributes) -> Option<i32> {
    attrs
        .groups_of(DelimiterTag::JobAttributes)
        .find_map(|group| match group.attributes().get("job-id")?.value() {
            IppValue::Integer(id) => Some(*id),
            _ => None,
        })
}

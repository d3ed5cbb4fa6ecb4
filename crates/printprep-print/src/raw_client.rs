// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP print client (JetDirect, port 9100).
//
// Open a socket and stream the document. There is no job tracking and no
// feedback; the printer has to understand PDF natively.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use printprep_core::error::{PrepError, Result};

/// Default raw TCP port (HP JetDirect).
pub const RAW_PORT: u16 = 9100;

/// Connect timeout for raw TCP sinks.
const RAW_TIMEOUT_SECS: u64 = 60;

/// Written per `write_all` call so progress shows up in the logs.
const CHUNK_SIZE: usize = 8192;

/// Stream `document` to `host:port`.
#[instrument(skip(document), fields(total = document.len()))]
pub async fn send_raw(host: &str, port: u16, document: &[u8]) -> Result<()> {
    let addr = format!("{host}:{port}");
    info!(addr = %addr, "connecting via raw TCP");

    let mut stream = connect(&addr, "Raw TCP").await?;

    let mut sent = 0usize;
    for chunk in document.chunks(CHUNK_SIZE) {
        stream.write_all(chunk).await.map_err(|e| {
            PrepError::Submission(format!("Raw TCP send failed at byte {sent}: {e}"))
        })?;
        sent += chunk.len();
        debug!(sent, "raw TCP progress");
    }

    stream
        .flush()
        .await
        .map_err(|e| PrepError::Submission(format!("Raw TCP flush: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e| PrepError::Submission(format!("Raw TCP shutdown: {e}")))?;

    info!(sent, "raw TCP print job sent");
    Ok(())
}

/// Connect with the sink timeout; both a timeout and a refusal are
/// submission failures.
pub(crate) async fn connect(addr: &str, protocol: &str) -> Result<TcpStream> {
    tokio::time::timeout(Duration::from_secs(RAW_TIMEOUT_SECS), TcpStream::connect(addr))
        .await
        .map_err(|_| {
            PrepError::Submission(format!(
                "{protocol} connection to {addr} timed out after {RAW_TIMEOUT_SECS}s"
            ))
        })?
        .map_err(|e| PrepError::Submission(format!("{protocol} connect to {addr}: {e}")))
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LPR/LPD client (RFC 1179) for legacy print servers.
//
// One connection per job: "receive job" command, then a control file
// (metadata), then the data file (the document). Every step is acknowledged
// by a single zero byte.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use printprep_core::error::{PrepError, Result};

use crate::raw_client::connect;

/// Default LPR port.
pub const LPR_PORT: u16 = 515;

/// Queue used when the sink URI names none.
pub const DEFAULT_QUEUE: &str = "lp";

/// Name we announce as the submitting host.
const CLIENT_HOST: &str = "printprep";

/// Send `document` to `queue` on `host:port`.
///
/// `job_number` goes into the control and data file names; RFC 1179 allows
/// three digits, so it is taken modulo 1000.
#[instrument(skip(document), fields(total = document.len()))]
pub async fn send_lpr(
    host: &str,
    port: u16,
    queue: &str,
    document: &[u8],
    job_name: &str,
    job_number: u32,
) -> Result<()> {
    let addr = format!("{host}:{port}");
    info!(addr = %addr, "connecting via LPR");

    let mut stream = connect(&addr, "LPR").await?;
    let job_num = job_number % 1000;

    // 02 queue LF: receive a printer job.
    send(&mut stream, format!("\x02{queue}\n").as_bytes(), "receive-job command").await?;
    expect_ack(&mut stream, "receive-job command").await?;

    let control_file = format!(
        "H{CLIENT_HOST}\nP{CLIENT_HOST}\nJ{job_name}\nldfA{job_num:03}{CLIENT_HOST}\nUdfA{job_num:03}{CLIENT_HOST}\nN{job_name}\n"
    );

    // 02 count SP name LF: receive control file.
    let cf_header = format!("\x02{} cfA{job_num:03}{CLIENT_HOST}\n", control_file.len());
    send(&mut stream, cf_header.as_bytes(), "control file header").await?;
    expect_ack(&mut stream, "control file header").await?;
    send(&mut stream, control_file.as_bytes(), "control file").await?;
    send(&mut stream, &[0], "control file terminator").await?;
    expect_ack(&mut stream, "control file").await?;
    debug!("control file accepted");

    // 03 count SP name LF: receive data file.
    let df_header = format!("\x03{} dfA{job_num:03}{CLIENT_HOST}\n", document.len());
    send(&mut stream, df_header.as_bytes(), "data file header").await?;
    expect_ack(&mut stream, "data file header").await?;
    send(&mut stream, document, "data file").await?;
    send(&mut stream, &[0], "data file terminator").await?;
    expect_ack(&mut stream, "data file").await?;

    info!(queue, "LPR job sent");
    Ok(())
}

async fn send(stream: &mut TcpStream, bytes: &[u8], step: &str) -> Result<()> {
    stream
        .write_all(bytes)
        .await
        .map_err(|e| PrepError::Submission(format!("LPR {step}: {e}")))
}

async fn expect_ack(stream: &mut TcpStream, step: &str) -> Result<()> {
    let mut ack = [0u8; 1];
    stream
        .read_exact(&mut ack)
        .await
        .map_err(|e| PrepError::Submission(format!("LPR {step} ack: {e}")))?;
    if ack[0] != 0 {
        return Err(PrepError::Submission(format!(
            "LPR server rejected the {step} (code {})",
            ack[0]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    /// Read one `count SP name LF` subcommand and its body, acking both.
    async fn read_file(reader: &mut BufReader<TcpStream>) -> Vec<u8> {
        let mut header = Vec::new();
        reader.read_until(b'\n', &mut header).await.unwrap();
        let header = String::from_utf8_lossy(&header[1..]).into_owned();
        let len: usize = header.split(' ').next().unwrap().parse().unwrap();
        reader.get_mut().write_all(&[0]).await.unwrap();

        let mut body = vec![0u8; len + 1];
        reader.read_exact(&mut body).await.unwrap();
        assert_eq!(body.pop(), Some(0));
        reader.get_mut().write_all(&[0]).await.unwrap();
        body
    }

    /// Minimal LPD that accepts one job and returns `(queue, control, data)`.
    async fn fake_lpd(listener: TcpListener, reject_queue: bool) -> (String, String, Vec<u8>) {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);

        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line).await.unwrap();
        let queue = String::from_utf8_lossy(&line[1..line.len() - 1]).into_owned();
        if reject_queue {
            reader.get_mut().write_all(&[1]).await.unwrap();
            return (queue, String::new(), Vec::new());
        }
        reader.get_mut().write_all(&[0]).await.unwrap();

        let control = read_file(&mut reader).await;
        let data = read_file(&mut reader).await;
        (queue, String::from_utf8(control).unwrap(), data)
    }

    #[tokio::test]
    async fn delivers_control_and_data_files() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(fake_lpd(listener, false));

        send_lpr("127.0.0.1", port, "office", b"%PDF-1.5 body", "report", 1042)
            .await
            .unwrap();

        let (queue, control, data) = server.await.unwrap();
        assert_eq!(queue, "office");
        assert!(control.contains("Jreport\n"));
        assert!(control.contains("ldfA042printprep\n"));
        assert_eq!(data, b"%PDF-1.5 body");
    }

    #[tokio::test]
    async fn rejected_queue_is_a_submission_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(fake_lpd(listener, true));

        let result = send_lpr("127.0.0.1", port, "missing", b"%PDF", "report", 1).await;
        match result {
            Err(PrepError::Submission(detail)) => assert!(detail.contains("rejected")),
            other => panic!("expected Submission error, got {other:?}"),
        }
        server.await.unwrap();
    }
}

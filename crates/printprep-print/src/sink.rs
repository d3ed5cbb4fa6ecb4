// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sink resolution — turn an opaque sink descriptor into a concrete transport.
//
// Recognised forms:
//   ipp://host[:port]/path, ipps://host[:port]/path   IPP Print-Job
//   socket://host[:port]                              raw JetDirect (9100)
//   lpd://host[:port]/queue                           RFC 1179 LPR (515)
//   file:///absolute/dir                              PDF written to a directory

use std::path::PathBuf;

use printprep_core::error::{PrepError, Result};
use printprep_core::types::SinkDescriptor;

use crate::lpr_client::{DEFAULT_QUEUE, LPR_PORT};
use crate::raw_client::RAW_PORT;

/// A resolved print destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    /// IPP printer; the full `ipp://`/`ipps://` URI.
    Ipp { uri: String },
    Raw { host: String, port: u16 },
    Lpd { host: String, port: u16, queue: String },
    /// Output directory. Must already exist.
    Directory { path: PathBuf },
}

impl SinkKind {
    /// Resolve `descriptor`. Anything we cannot route is `SinkUnavailable`.
    pub fn parse(descriptor: &SinkDescriptor) -> Result<Self> {
        let raw = descriptor.as_str().trim();
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| unavailable(raw, "expected a URI such as ipp://host/ipp/print"))?;

        match scheme.to_ascii_lowercase().as_str() {
            "ipp" | "ipps" => {
                if authority(rest).is_empty() {
                    return Err(unavailable(raw, "missing host"));
                }
                Ok(Self::Ipp {
                    uri: raw.to_string(),
                })
            }
            "socket" => {
                let (host, port) = host_port(raw, authority(rest), RAW_PORT)?;
                Ok(Self::Raw { host, port })
            }
            "lpd" => {
                let (host, port) = host_port(raw, authority(rest), LPR_PORT)?;
                let queue = rest
                    .split_once('/')
                    .map(|(_, queue)| queue.trim_matches('/'))
                    .filter(|queue| !queue.is_empty())
                    .unwrap_or(DEFAULT_QUEUE)
                    .to_string();
                Ok(Self::Lpd { host, port, queue })
            }
            "file" => {
                if !rest.starts_with('/') {
                    return Err(unavailable(raw, "file sinks need an absolute path"));
                }
                Ok(Self::Directory {
                    path: PathBuf::from(rest),
                })
            }
            other => Err(unavailable(raw, &format!("unsupported scheme '{other}'"))),
        }
    }
}

/// The `host[:port]` part of everything after `scheme://`.
fn authority(rest: &str) -> &str {
    rest.split('/').next().unwrap_or_default()
}

fn host_port(raw: &str, authority: &str, default_port: u16) -> Result<(String, u16)> {
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| unavailable(raw, &format!("invalid port '{port}'")))?;
            (host, port)
        }
        None => (authority, default_port),
    };
    if host.is_empty() {
        return Err(unavailable(raw, "missing host"));
    }
    Ok((host.to_string(), port))
}

fn unavailable(raw: &str, why: &str) -> PrepError {
    PrepError::SinkUnavailable(format!("'{raw}': {why}"))
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printprep Print — submission of prepared documents to print sinks: IPP
// printers, raw JetDirect sockets, LPD queues, and spool directories.

pub mod directory;
pub mod ipp_client;
pub mod lpr_client;
pub mod raw_client;
pub mod sink;
pub mod submit;

pub use ipp_client::IppClient;
pub use sink::SinkKind;
pub use submit::{PrintSubmitter, SinkSubmitter, SubmissionReceipt};

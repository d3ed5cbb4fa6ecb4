// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Copy replication.

use printprep_core::error::{PrepError, Result};
use printprep_core::types::MAX_COPIES;
use tracing::debug;

use crate::buffer::PageBuffer;

/// Repeats a buffer end to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct Replicator;

impl Replicator {
    /// Accept `1..=MAX_COPIES`; anything else is `CopyLimitExceeded`.
    pub fn check_copies(copies: u32) -> Result<()> {
        if (1..=MAX_COPIES).contains(&copies) {
            Ok(())
        } else {
            Err(PrepError::CopyLimitExceeded {
                requested: copies,
                max: MAX_COPIES,
            })
        }
    }

    /// `copies` back-to-back repetitions of `buffer`: all of copy 1, then all
    /// of copy 2, and so on. The count is checked before any page is copied.
    pub fn replicate(buffer: &PageBuffer, copies: u32) -> Result<PageBuffer> {
        Self::check_copies(copies)?;

        let mut replicated = PageBuffer::with_capacity(buffer.count() * copies as usize);
        for _ in 0..copies {
            replicated.extend_from(buffer);
        }

        debug!(copies, pages = replicated.count(), "buffer replicated");
        Ok(replicated)
    }
}

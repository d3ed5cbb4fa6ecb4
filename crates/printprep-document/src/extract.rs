// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Range extraction with truncation.

use printprep_core::error::PrepError;
use tracing::{debug, warn};

use crate::buffer::PageBuffer;

/// Copies a contiguous, 1-indexed, inclusive page range into a new buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeExtractor;

impl RangeExtractor {
    /// Pages `lower..=upper` of `buffer`.
    ///
    /// Extraction stops at the first page number that does not exist and
    /// returns what was collected so far. A range past the end, starting at
    /// 0 or below, or with `lower > upper` therefore yields a short or empty
    /// buffer, never an error.
    pub fn extract(buffer: &PageBuffer, lower: i64, upper: i64) -> PageBuffer {
        let mut extracted = PageBuffer::new();

        for number in lower..=upper {
            let lookup = u32::try_from(number).map_err(|_| PrepError::PageNotFound {
                number: 0,
                count: buffer.count(),
            });
            match lookup.and_then(|number| buffer.get(number)) {
                Ok(page) => extracted.append(page.clone()),
                Err(err) => {
                    warn!(
                        lower,
                        upper,
                        kept = extracted.count(),
                        %err,
                        "page range truncated"
                    );
                    break;
                }
            }
        }

        debug!(lower, upper, pages = extracted.count(), "range extracted");
        extracted
    }
}

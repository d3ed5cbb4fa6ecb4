// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page and PageBuffer — the ordered page collection every pipeline stage
// reads and writes.
//
// Stages never mutate a buffer they were handed. Each one builds a fresh
// `PageBuffer` and returns it whole, so a failure part-way through a stage
// cannot leave a half-built buffer visible to anyone else. Page content is
// reference-counted, which keeps copying pages between buffers cheap.

use std::fmt;
use std::sync::Arc;

use image::GrayImage;
use printprep_core::error::{PrepError, Result};

/// What is drawn on a page.
#[derive(Clone, PartialEq)]
pub enum PageContent {
    /// Native vector/text content, stored as a standalone single-page PDF.
    Vector(Arc<[u8]>),
    /// A rasterised single-channel (8-bit luma) bitmap.
    Raster(Arc<GrayImage>),
}

impl PageContent {
    /// Wrap the bytes of a single-page PDF.
    pub fn vector(pdf_bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Vector(pdf_bytes.into())
    }

    pub fn raster(bitmap: GrayImage) -> Self {
        Self::Raster(Arc::new(bitmap))
    }

    /// True when the content is a single-channel bitmap.
    pub fn is_grayscale(&self) -> bool {
        matches!(self, Self::Raster(_))
    }
}

impl fmt::Debug for PageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector(bytes) => write!(f, "Vector({} bytes)", bytes.len()),
            Self::Raster(bitmap) => {
                write!(f, "Raster({}x{} luma8)", bitmap.width(), bitmap.height())
            }
        }
    }
}

/// One printable surface. Width and height are in PDF points.
///
/// Geometry is fixed at construction; transformations build new pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    width: f32,
    height: f32,
    content: PageContent,
}

impl Page {
    /// Build a page, rejecting zero, negative, or non-finite dimensions.
    pub fn new(width: f32, height: f32, content: PageContent) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(PrepError::InvalidGeometry { width, height });
        }
        Ok(Self {
            width,
            height,
            content,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// `(width, height)` in points.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }
}

/// Ordered sequence of pages. Insertion order is print order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBuffer {
    pages: Vec<Page>,
}

impl PageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: Vec::with_capacity(capacity),
        }
    }

    /// Add a page at the end.
    pub fn append(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Look up a page by its 1-indexed page number.
    ///
    /// Page 0 and numbers past the end yield `PageNotFound`.
    pub fn get(&self, number: u32) -> Result<&Page> {
        (number as usize)
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or(PrepError::PageNotFound {
                number,
                count: self.pages.len(),
            })
    }

    pub fn count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// A new buffer holding `self`'s pages followed by `other`'s.
    /// Neither input is modified.
    pub fn concatenate(&self, other: &PageBuffer) -> PageBuffer {
        let mut joined = PageBuffer::with_capacity(self.count() + other.count());
        joined.extend_from(self);
        joined.extend_from(other);
        joined
    }

    /// Append clones of every page in `other`. Only used while a stage is
    /// still building its own output buffer.
    pub(crate) fn extend_from(&mut self, other: &PageBuffer) {
        self.pages.extend(other.pages.iter().cloned());
    }
}

impl FromIterator<Page> for PageBuffer {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PageBuffer {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

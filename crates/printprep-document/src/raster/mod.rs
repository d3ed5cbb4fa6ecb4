// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale rasterisation of page buffers.

pub mod renderer;
pub mod rasterizer;

pub use rasterizer::Rasterizer;
pub use renderer::{PageRenderer, PdftoppmRenderer};

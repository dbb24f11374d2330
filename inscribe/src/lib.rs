// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markup text layout and geometry synthesis.
//!
//! The pipeline turns a [`MarkupText`](markup_text::MarkupText) into flat
//! geometry arrays:
//!
//! 1. A markup parser plugin (resolved through [`ParserSystem`]) populates
//!    the run/line/paragraph/block structure. Unknown or absent languages
//!    fall back to a plain-text collapse, never to an error.
//! 2. The layout pass positions runs and lines inside their blocks,
//!    wrapping against width constraints and flowing across columns.
//! 3. The [`GeometryEngine`] walks the laid out runs, fetches glyphs from
//!    the font device in the representation the active
//!    [`TextRenderer`] declares, and accumulates vertex positions, texture
//!    coordinates, colors, opacities and decoration segments.
//!
//! Generation is atomic: any failure aborts the whole request and nothing
//! partial is returned.

pub use fontique;
pub use swash;

mod device;
mod error;
mod geometry;
mod layout;
mod settings;

pub mod parser;
pub mod render;

#[cfg(test)]
mod tests;

pub use device::{FontDevice, FontMetricsData, TrueTypeFontDevice};
pub use error::GenerateError;
pub use geometry::{DecorationSegment, GeometryEngine, TextGeometry};
pub use parser::{MarkupParser, ParserSystem};
pub use render::{
    GlyphBitmap, GlyphData, GlyphGeometry, GlyphInput, GlyphOutline, RendererRegistry, TextRenderer,
};
pub use settings::PluginSettings;

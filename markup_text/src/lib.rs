// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural and style model for markup text.
//!
//! A [`MarkupText`] owns an annotated string together with the containers a
//! markup parser populates: [`Run`]s (the only holders of character data),
//! [`Line`]s, [`Paragraph`]s and [`Block`]s. Lines and the containers above
//! them never copy character data; they address runs and lines through
//! index-based [`RunRange`]/[`LineRange`] pairs, so structural mutation can
//! never leave a dangling reference behind.

mod arena;
mod block;
mod line;
mod markup;
mod paragraph;
mod run;
mod style;

#[cfg(test)]
mod tests;

pub use arena::{LineId, LineRange, RunId, RunRange};
pub use block::{Block, BlockAlignment, Margins};
pub use line::{Line, LineBreak, LineKind};
pub use markup::MarkupText;
pub use paragraph::{
    LineSpaceType, Paragraph, ParagraphAlignment, ParagraphStyle, TabStop, TabStopKind,
};
pub use run::{Run, RunKind};
pub use style::{DecorationType, StyleChange, TextProperty, TextStyle, STYLE_EPSILON};

pub use peniko::Color;

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::render::GlyphInput;

/// Failures surfaced by parsing, layout and geometry generation.
///
/// An unsupported markup language is deliberately not represented here:
/// it degrades to the plain-text path inside
/// [`ParserSystem::parse_text`](crate::ParserSystem::parse_text). Range
/// violations on the structural model (for example shortening a run past
/// its length) are programming errors and panic instead of returning.
#[derive(Clone, PartialEq, Eq, Error, Debug)]
pub enum GenerateError {
    /// A style attribute generation cannot proceed without is absent.
    #[error("required style attribute `{0}` is missing")]
    MissingRequiredStyle(&'static str),

    /// The resolved typeface cannot be located or loaded.
    #[error("font for typeface `{0}` could not be loaded")]
    FontLoadFailure(String),

    /// A renderable character has no glyph in the resolved typeface.
    #[error("no glyph for {0:?} in typeface `{1}`")]
    MissingGlyph(char, String),

    /// The structural model was inconsistent when layout consumed it.
    #[error("invalid layout: {0}")]
    InvalidLayout(&'static str),

    /// A parser or renderer plugin failed to initialize.
    #[error("plugin initialization failed: {0}")]
    PluginInitFailure(String),

    /// The active renderer requires a glyph representation the font device
    /// cannot supply.
    #[error("renderer requires {0:?} glyph input, which the font device cannot supply")]
    RendererInputMismatch(GlyphInput),
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine tests, driven by a fixed-metrics font device so every position
//! is exact.

mod test_layout;
mod test_registry;

use swash::zeno::{Vector, Verb};

use markup_text::TextStyle;

use crate::device::{FontDevice, FontMetricsData};
use crate::error::GenerateError;
use crate::render::{GlyphInput, GlyphOutline};

/// Fraction of the height above the baseline.
pub(crate) const ASCENT: f32 = 0.8;
/// Fraction of the height below the baseline.
pub(crate) const DESCENT: f32 = 0.2;
/// Advance of every glyph as a fraction of the height.
pub(crate) const ADVANCE: f32 = 0.6;

/// A font device with fixed proportional metrics: every glyph advances
/// `0.6 * height` and draws as a rectangle from the baseline up.
pub(crate) struct FixedMetricsDevice;

impl FontDevice for FixedMetricsDevice {
    fn supports(&self, input: GlyphInput) -> bool {
        input == GlyphInput::ControlPoints
    }

    fn metrics(&mut self, style: &TextStyle) -> Result<FontMetricsData, GenerateError> {
        let height = style.height as f32;
        Ok(FontMetricsData {
            ascent: ASCENT * height,
            descent: DESCENT * height,
        })
    }

    fn advance(&mut self, style: &TextStyle, _ch: char) -> Result<f32, GenerateError> {
        Ok(ADVANCE * style.height as f32 * style.width_factor)
    }

    fn outline(&mut self, style: &TextStyle, ch: char) -> Result<GlyphOutline, GenerateError> {
        if ch == '\u{fffd}' {
            return Err(GenerateError::MissingGlyph(ch, style.typeface.clone()));
        }
        let height = style.height as f32;
        let w = 0.5 * height * style.width_factor;
        let h = 0.7 * height;
        Ok(GlyphOutline {
            verbs: vec![
                Verb::MoveTo,
                Verb::LineTo,
                Verb::LineTo,
                Verb::LineTo,
                Verb::Close,
            ],
            points: vec![
                Vector::new(0.0, 0.0),
                Vector::new(w, 0.0),
                Vector::new(w, h),
                Vector::new(0.0, h),
            ],
        })
    }
}

/// A device refusing every glyph representation, for mismatch tests.
pub(crate) struct NoGlyphDevice;

impl FontDevice for NoGlyphDevice {
    fn supports(&self, _input: GlyphInput) -> bool {
        false
    }

    fn metrics(&mut self, _style: &TextStyle) -> Result<FontMetricsData, GenerateError> {
        Ok(FontMetricsData::default())
    }

    fn advance(&mut self, _style: &TextStyle, _ch: char) -> Result<f32, GenerateError> {
        Ok(0.0)
    }

    fn outline(&mut self, _style: &TextStyle, _ch: char) -> Result<GlyphOutline, GenerateError> {
        Err(GenerateError::RendererInputMismatch(
            GlyphInput::ControlPoints,
        ))
    }
}

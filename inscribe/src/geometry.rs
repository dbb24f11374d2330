// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry orchestrator.

use markup_text::{MarkupText, RunKind};

use crate::device::{full_size_style, FontDevice, TrueTypeFontDevice};
use crate::error::GenerateError;
use crate::layout;
use crate::render::{GlyphData, GlyphInput, RendererRegistry};
use crate::settings::PluginSettings;

/// One decoration line segment, ready for a line primitive.
#[derive(Copy, Clone, Debug)]
pub struct DecorationSegment {
    pub start: [f32; 3],
    pub end: [f32; 3],
    pub color: [f32; 3],
    pub opacity: f32,
}

/// Flat geometry arrays for one text primitive.
///
/// `points`, `tex_coords`, `colors` and `opacities` run parallel over the
/// glyph vertices; decorations are emitted separately as segments.
#[derive(Clone, Default, Debug)]
pub struct TextGeometry {
    pub points: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 4]>,
    pub colors: Vec<[f32; 3]>,
    pub opacities: Vec<f32>,
    pub decorations: Vec<DecorationSegment>,
}

/// Drives layout and glyph rendering for one `MarkupText` at a time.
///
/// The engine owns its font device and settings; renderers resolve through
/// the process-wide [`RendererRegistry`]. Generation is atomic: any error
/// is returned before anything is surfaced.
pub struct GeometryEngine {
    device: Box<dyn FontDevice>,
    settings: PluginSettings,
}

impl GeometryEngine {
    /// An engine backed by the TrueType font device.
    pub fn new(settings: PluginSettings) -> Self {
        let device = Box::new(TrueTypeFontDevice::new(&settings));
        Self { device, settings }
    }

    /// An engine with an injected font device.
    pub fn with_device(settings: PluginSettings, device: Box<dyn FontDevice>) -> Self {
        Self { device, settings }
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Generates geometry for `markup`, which must have been populated by
    /// a parse (an unparsed value collapses to plain text first).
    ///
    /// `renderer_name` resolves through the registry; the default renderer
    /// serves empty and unknown names.
    pub fn generate(
        &mut self,
        markup: &mut MarkupText,
        renderer_name: &str,
    ) -> Result<TextGeometry, GenerateError> {
        let renderer = RendererRegistry::global().get_text_renderer(renderer_name);
        let input = renderer.require_input();
        if !self.device.supports(input) {
            return Err(GenerateError::RendererInputMismatch(input));
        }

        if markup.lines().is_empty() {
            markup.collapse_to_plain_text();
        }
        let layout = layout::generate_layout(markup, self.device.as_mut(), &self.settings)?;

        let global = markup.global_style().clone();
        let default_color = markup.default_color();
        let mut out = TextGeometry::default();

        for (line_index, line_id) in markup.line_ids().enumerate() {
            let line = markup.line(line_id);
            let line_layout = &layout.lines[line_index];

            if let Some(range) = line.runs() {
                for (slot, id) in range.iter().enumerate() {
                    let run = markup.run(id);
                    if run.kind() != RunKind::String {
                        continue;
                    }
                    let style = run.resolve_style(&global);
                    let (full_style, _) = full_size_style(&style);
                    let run_layout = &layout.runs[id.index()];
                    let scale = run_layout.scale;
                    let baseline = layout.run_baseline(markup, line_index, slot);
                    let components = run.color_or(default_color).components;
                    let rgb = [components[0], components[1], components[2]];
                    let opacity = components[3];

                    for metrics in &run_layout.chars {
                        if metrics.ch.is_whitespace() {
                            continue;
                        }
                        let glyph = match input {
                            GlyphInput::ControlPoints => GlyphData::ControlPoints(
                                self.device.outline(&full_style, metrics.ch)?,
                            ),
                            GlyphInput::Rasterization => GlyphData::Rasterization(
                                self.device.rasterize(&full_style, metrics.ch)?,
                            ),
                        };
                        let piece = renderer.generate_geometry_and_coords(&glyph)?;
                        debug_assert_eq!(piece.points.len(), piece.tex_coords.len());
                        for (point, tex) in piece.points.iter().zip(&piece.tex_coords) {
                            out.points.push([
                                baseline[0] + metrics.start + point[0] * scale,
                                baseline[1] + point[1] * scale,
                                point[2] * scale,
                            ]);
                            out.tex_coords.push(*tex);
                            out.colors.push(rgb);
                            out.opacities.push(opacity);
                        }
                    }
                }
            }

            // Decoration segments, positioned off the line's baseline.
            let block = &markup.blocks()[line_layout.block];
            let origin = [
                block.offset()[0] + line_layout.position[0],
                block.offset()[1] + line_layout.position[1] - line_layout.ascent,
            ];
            for decoration in &line_layout.decorations {
                for section in &decoration.sections {
                    let components = section.color.components;
                    out.decorations.push(DecorationSegment {
                        start: [origin[0] + section.start_x, origin[1] + decoration.y, 0.0],
                        end: [origin[0] + section.end_x, origin[1] + decoration.y, 0.0],
                        color: [components[0], components[1], components[2]],
                        opacity: components[3],
                    });
                }
            }
        }

        Ok(out)
    }
}

impl core::fmt::Debug for GeometryEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeometryEngine")
            .field("settings", &self.settings)
            .finish()
    }
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built-in renderer: fill tessellation of glyph outlines.

use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use swash::zeno::Verb;

use super::{GlyphData, GlyphGeometry, GlyphInput, GlyphOutline, TextRenderer};
use crate::error::GenerateError;

/// Turns outline control points into a triangle list with non-zero fill.
#[derive(Copy, Clone, Default, Debug)]
pub struct TessellationRenderer;

impl TessellationRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TextRenderer for TessellationRenderer {
    fn require_input(&self) -> GlyphInput {
        GlyphInput::ControlPoints
    }

    fn generate_geometry_and_coords(
        &self,
        glyph: &GlyphData,
    ) -> Result<GlyphGeometry, GenerateError> {
        let GlyphData::ControlPoints(outline) = glyph else {
            return Err(GenerateError::RendererInputMismatch(
                GlyphInput::ControlPoints,
            ));
        };
        if outline.points.is_empty() {
            return Ok(GlyphGeometry::default());
        }

        let path = build_path(outline);
        let (min, max) = outline.bounds();
        let extent = [(max[0] - min[0]).max(f32::EPSILON), (max[1] - min[1]).max(f32::EPSILON)];

        let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        let tolerance = (extent[0].max(extent[1]) / 256.0).max(0.005);
        let options = FillOptions::tolerance(tolerance).with_fill_rule(FillRule::NonZero);
        let mut tessellator = FillTessellator::new();
        tessellator
            .tessellate_path(
                &path,
                &options,
                &mut BuffersBuilder::new(&mut buffers, |v: FillVertex<'_>| {
                    let p = v.position();
                    [p.x, p.y]
                }),
            )
            .map_err(|_| GenerateError::InvalidLayout("glyph outline failed to tessellate"))?;

        let mut geometry = GlyphGeometry {
            points: Vec::with_capacity(buffers.indices.len()),
            tex_coords: Vec::with_capacity(buffers.indices.len()),
        };
        for &index in &buffers.indices {
            let [x, y] = buffers.vertices[index as usize];
            geometry.points.push([x, y, 0.0]);
            geometry.tex_coords.push([
                (x - min[0]) / extent[0],
                (y - min[1]) / extent[1],
                extent[0],
                extent[1],
            ]);
        }
        Ok(geometry)
    }
}

/// Converts zeno verbs and points into a lyon path, closing any contour
/// left open.
fn build_path(outline: &GlyphOutline) -> Path {
    let mut builder = Path::builder();
    let mut contour_open = false;
    let mut points = outline.points.iter();
    let mut next = || {
        let p = points.next().copied().unwrap_or_default();
        point(p.x, p.y)
    };
    for verb in &outline.verbs {
        match verb {
            Verb::MoveTo => {
                if contour_open {
                    builder.close();
                }
                builder.begin(next());
                contour_open = true;
            }
            Verb::LineTo => {
                let p = next();
                if contour_open {
                    builder.line_to(p);
                }
            }
            Verb::QuadTo => {
                let ctrl = next();
                let p = next();
                if contour_open {
                    builder.quadratic_bezier_to(ctrl, p);
                }
            }
            Verb::CurveTo => {
                let c0 = next();
                let c1 = next();
                let p = next();
                if contour_open {
                    builder.cubic_bezier_to(c0, c1, p);
                }
            }
            Verb::Close => {
                if contour_open {
                    builder.close();
                    contour_open = false;
                }
            }
        }
    }
    if contour_open {
        builder.close();
    }
    builder.build()
}

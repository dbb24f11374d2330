// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph-to-geometry renderer plugins.
//!
//! A [`TextRenderer`] declares the glyph representation it consumes and
//! turns one glyph at a time into triangle geometry. Implementations hold
//! no mutable state, so a single renderer can serve concurrent generation
//! requests.

mod tessellate;

use std::sync::{Arc, OnceLock, RwLock};

use swash::zeno::{Vector, Verb};

use crate::error::GenerateError;

pub use tessellate::TessellationRenderer;

/// Glyph representation a renderer consumes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GlyphInput {
    /// Outline control points (path verbs + points).
    ControlPoints,
    /// A rasterized coverage bitmap.
    Rasterization,
}

/// A glyph outline in unscaled layout units, origin on the baseline.
#[derive(Clone, Debug)]
pub struct GlyphOutline {
    pub verbs: Vec<Verb>,
    pub points: Vec<Vector>,
}

impl GlyphOutline {
    /// Bounding box of the control points as `(min, max)`.
    ///
    /// Control points of curve segments lie outside the curve, so this is
    /// conservative; it is exact for the extremes that matter here because
    /// glyph contours start and end on the outline.
    pub fn bounds(&self) -> ([f32; 2], [f32; 2]) {
        let mut min = [f32::MAX, f32::MAX];
        let mut max = [f32::MIN, f32::MIN];
        for p in &self.points {
            min[0] = min[0].min(p.x);
            min[1] = min[1].min(p.y);
            max[0] = max[0].max(p.x);
            max[1] = max[1].max(p.y);
        }
        if self.points.is_empty() {
            ([0.0, 0.0], [0.0, 0.0])
        } else {
            (min, max)
        }
    }
}

/// A rasterized glyph: coverage data with its placement.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    /// Offset of the bitmap's top-left corner from the glyph origin.
    pub left: f32,
    pub top: f32,
    pub width: u32,
    pub height: u32,
    /// One coverage byte per pixel, row-major.
    pub data: Vec<u8>,
}

/// The glyph handed to a renderer, in the representation it declared.
#[derive(Clone, Debug)]
pub enum GlyphData {
    ControlPoints(GlyphOutline),
    Rasterization(GlyphBitmap),
}

/// Geometry produced for a single glyph.
///
/// `points` is a triangle list; `tex_coords` carries one 4-component
/// coordinate per vertex: `[u, v, w, h]` where `u`/`v` normalize the
/// vertex into the glyph extent and `w`/`h` are the extent dimensions.
#[derive(Clone, Default, Debug)]
pub struct GlyphGeometry {
    pub points: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 4]>,
}

/// A glyph-to-geometry backend.
///
/// `generate_geometry_and_coords` is a pure per-glyph function: it takes
/// `&self`, may not cache across calls, and must be safe to call from
/// multiple threads at once.
pub trait TextRenderer: Send + Sync {
    /// The glyph representation this renderer consumes. The orchestrator
    /// only requests extraction in this mode and fails generation when the
    /// font device cannot supply it.
    fn require_input(&self) -> GlyphInput;

    /// Produces vertex positions and texture coordinates for one glyph.
    fn generate_geometry_and_coords(
        &self,
        glyph: &GlyphData,
    ) -> Result<GlyphGeometry, GenerateError>;
}

/// Constructor registered for a named renderer.
pub type RendererFactory = fn() -> Arc<dyn TextRenderer>;

fn default_renderer() -> Arc<dyn TextRenderer> {
    Arc::new(TessellationRenderer::new())
}

/// Name → constructor registry for renderer plugins.
///
/// Lookup never fails: an empty or unknown name resolves to the built-in
/// tessellation renderer.
pub struct RendererRegistry {
    entries: RwLock<Vec<(String, RendererFactory)>>,
}

impl RendererRegistry {
    fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<RendererRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::new)
    }

    /// Registers `factory` under `name`, replacing an existing entry of
    /// the same name in place so registration order stays stable.
    pub fn register(&self, name: impl Into<String>, factory: RendererFactory) {
        let name = name.into();
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = factory;
        } else {
            entries.push((name, factory));
        }
    }

    /// Resolves `name` to a renderer. Unknown and empty names fall back to
    /// the default renderer.
    pub fn get_text_renderer(&self, name: &str) -> Arc<dyn TextRenderer> {
        if !name.is_empty() {
            let entries = self.entries.read().unwrap();
            if let Some((_, factory)) = entries.iter().find(|(n, _)| n == name) {
                return factory();
            }
            tracing::debug!(renderer = name, "unknown text renderer, using default");
        }
        default_renderer()
    }
}

impl core::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries = self.entries.read().unwrap();
        f.debug_struct("RendererRegistry")
            .field("names", &entries.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font access for layout and glyph extraction.

use fontique::{Blob, Collection, CollectionOptions, GenericFamily, SourceCache};
use fontique::{FontStyle, FontWeight, FontWidth};
use hashbrown::HashMap;
use swash::scale::ScaleContext;
use swash::FontRef;

use markup_text::TextStyle;

use crate::error::GenerateError;
use crate::render::{GlyphBitmap, GlyphInput, GlyphOutline};
use crate::settings::PluginSettings;

/// Vertical font metrics at a resolved style, in model units.
#[derive(Copy, Clone, Default, Debug)]
pub struct FontMetricsData {
    /// Distance from the baseline to the top of the line.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line, positive.
    pub descent: f32,
}

/// Supplies font metrics and glyph representations to layout and geometry.
///
/// Font loading happens behind this seam; nothing above it performs I/O.
pub trait FontDevice: Send {
    /// Whether this device can produce the given glyph representation.
    fn supports(&self, input: GlyphInput) -> bool;

    /// Font-wide vertical metrics for `style`.
    fn metrics(&mut self, style: &TextStyle) -> Result<FontMetricsData, GenerateError>;

    /// Advance of `ch` at `style`, with the style's width factor applied.
    fn advance(&mut self, style: &TextStyle, ch: char) -> Result<f32, GenerateError>;

    /// Outline of `ch` at `style`, origin on the baseline, width factor
    /// and oblique shear applied.
    fn outline(&mut self, style: &TextStyle, ch: char) -> Result<GlyphOutline, GenerateError>;

    /// Rasterized coverage of `ch` at `style`.
    fn rasterize(&mut self, _style: &TextStyle, _ch: char) -> Result<GlyphBitmap, GenerateError> {
        Err(GenerateError::RendererInputMismatch(
            GlyphInput::Rasterization,
        ))
    }
}

/// Height below which layout is generated at full size and scaled back
/// down, keeping glyph placement stable across zoom levels.
const MIN_STABLE_HEIGHT: i32 = 32;
/// The height used for full-size layout generation.
const FULL_LAYOUT_HEIGHT: i32 = 1024;

/// Returns the style to query the font device with and the uniform factor
/// that maps the resulting geometry back to the nominal height.
pub(crate) fn full_size_style(style: &TextStyle) -> (TextStyle, f32) {
    if style.height >= MIN_STABLE_HEIGHT {
        (style.clone(), 1.0)
    } else {
        let mut full = style.clone();
        full.height = FULL_LAYOUT_HEIGHT;
        (full, style.height as f32 / FULL_LAYOUT_HEIGHT as f32)
    }
}

type FaceKey = (String, bool, bool);

/// A loaded face: shared font data plus the face index inside it. Cloning
/// is cheap, the data is reference counted.
#[derive(Clone)]
struct LoadedFace {
    blob: Blob<u8>,
    index: u32,
}

/// The default device: TrueType/OpenType faces resolved through fontique
/// and read through swash. Supplies control points only.
pub struct TrueTypeFontDevice {
    collection: Collection,
    source_cache: SourceCache,
    scale_cx: ScaleContext,
    substitution: bool,
    faces: HashMap<FaceKey, Option<LoadedFace>>,
}

impl TrueTypeFontDevice {
    /// Creates a device, registering every font file found in the
    /// configured `fontFolder` and honoring the `fontSubstitution` toggle.
    pub fn new(settings: &PluginSettings) -> Self {
        let mut collection = Collection::new(CollectionOptions::default());
        if let Some(folder) = settings.font_folder() {
            register_folder(&mut collection, folder);
        }
        Self {
            collection,
            source_cache: SourceCache::default(),
            scale_cx: ScaleContext::new(),
            substitution: settings.system_substitution(),
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, style: &TextStyle) -> Result<LoadedFace, GenerateError> {
        let key: FaceKey = (style.typeface.to_lowercase(), style.bold, style.italic);
        if !self.faces.contains_key(&key) {
            let loaded = self.load_face(style);
            self.faces.insert(key.clone(), loaded);
        }
        self.faces
            .get(&key)
            .and_then(Option::as_ref)
            .cloned()
            .ok_or_else(|| GenerateError::FontLoadFailure(style.typeface.clone()))
    }

    fn load_face(&mut self, style: &TextStyle) -> Option<LoadedFace> {
        let family = match self.collection.family_by_name(&style.typeface) {
            Some(family) => Some(family),
            None if self.substitution => {
                tracing::debug!(
                    typeface = %style.typeface,
                    "typeface not found, substituting generic family"
                );
                let id = self
                    .collection
                    .generic_families(GenericFamily::SansSerif)
                    .next()?;
                self.collection.family(id)
            }
            None => None,
        }?;
        let font_style = if style.italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };
        let weight = if style.bold {
            FontWeight::BOLD
        } else {
            FontWeight::NORMAL
        };
        let info = family.match_font(FontWidth::default(), font_style, weight, true)?;
        let blob = info.load(Some(&mut self.source_cache))?;
        Some(LoadedFace {
            blob,
            index: info.index(),
        })
    }

    /// Glyph id of `ch`, or an error for characters the face cannot map.
    fn glyph(face: FontRef<'_>, style: &TextStyle, ch: char) -> Result<u16, GenerateError> {
        let glyph = face.charmap().map(ch);
        if glyph == 0 {
            return Err(GenerateError::MissingGlyph(ch, style.typeface.clone()));
        }
        Ok(glyph)
    }
}

impl FontDevice for TrueTypeFontDevice {
    fn supports(&self, input: GlyphInput) -> bool {
        input == GlyphInput::ControlPoints
    }

    fn metrics(&mut self, style: &TextStyle) -> Result<FontMetricsData, GenerateError> {
        let face = self.face(style)?;
        let font = FontRef::from_index(face.blob.as_ref(), face.index as usize)
            .ok_or_else(|| GenerateError::FontLoadFailure(style.typeface.clone()))?;
        let metrics = font.metrics(&[]);
        let scale = style.height as f32 / metrics.units_per_em as f32;
        Ok(FontMetricsData {
            ascent: metrics.ascent * scale,
            descent: metrics.descent * scale,
        })
    }

    fn advance(&mut self, style: &TextStyle, ch: char) -> Result<f32, GenerateError> {
        let face = self.face(style)?;
        let font = FontRef::from_index(face.blob.as_ref(), face.index as usize)
            .ok_or_else(|| GenerateError::FontLoadFailure(style.typeface.clone()))?;
        let metrics = font.metrics(&[]);
        let scale = style.height as f32 / metrics.units_per_em as f32;
        let glyph = match Self::glyph(font, style, ch) {
            Ok(glyph) => glyph,
            // Unmapped whitespace still advances.
            Err(_) if ch.is_whitespace() => {
                return Ok(style.height as f32 * 0.25 * style.width_factor);
            }
            Err(e) => return Err(e),
        };
        let advance = font.glyph_metrics(&[]).advance_width(glyph) * scale;
        Ok(advance * style.width_factor)
    }

    fn outline(&mut self, style: &TextStyle, ch: char) -> Result<GlyphOutline, GenerateError> {
        let face = self.face(style)?;
        let font = FontRef::from_index(face.blob.as_ref(), face.index as usize)
            .ok_or_else(|| GenerateError::FontLoadFailure(style.typeface.clone()))?;
        let glyph = Self::glyph(font, style, ch)?;
        let mut scaler = self
            .scale_cx
            .builder(font)
            .size(style.height as f32)
            .hint(false)
            .build();
        let outline = scaler
            .scale_outline(glyph)
            .ok_or_else(|| GenerateError::MissingGlyph(ch, style.typeface.clone()))?;

        let shear = style.oblique_angle.to_radians().tan();
        let points = outline
            .points()
            .iter()
            .map(|p| swash::zeno::Vector::new(p.x * style.width_factor + p.y * shear, p.y))
            .collect();
        Ok(GlyphOutline {
            verbs: outline.verbs().to_vec(),
            points,
        })
    }
}

impl core::fmt::Debug for TrueTypeFontDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrueTypeFontDevice")
            .field("substitution", &self.substitution)
            .field("faces", &self.faces.len())
            .finish()
    }
}

/// Registers every font file in `folder` with the collection.
fn register_folder(collection: &mut Collection, folder: &str) {
    let Ok(entries) = std::fs::read_dir(folder) else {
        tracing::warn!(folder, "font folder could not be read");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"));
        if !is_font {
            continue;
        }
        match std::fs::read(&path) {
            Ok(data) => {
                collection.register_fonts(Blob::from(data), None);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read font file");
            }
        }
    }
}

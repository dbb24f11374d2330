// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text styles and sparse style overrides.

use smallvec::SmallVec;

/// Tolerance for floating point comparison of style values.
pub const STYLE_EPSILON: f32 = 1e-10;

/// Kind of a decoration line attached to text.
///
/// `DoubleLines` is only meaningful for strikethrough; underline and
/// overline use `None` and `Normal`.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum DecorationType {
    #[default]
    None,
    Normal,
    DoubleLines,
}

/// The property kinds a [`StyleChange`] can override.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TextProperty {
    Typeface,
    Bold,
    Italic,
    Height,
    WidthFactor,
    ObliqueAngle,
    CharacterSpacing,
    Underline,
    Overline,
    Strikethrough,
}

/// A sparse override of a single [`TextStyle`] property.
#[derive(Clone, PartialEq, Debug)]
pub enum StyleChange {
    Typeface(String),
    Bold(bool),
    Italic(bool),
    Height(i32),
    WidthFactor(f32),
    ObliqueAngle(f32),
    CharacterSpacing(f32),
    Underline(DecorationType),
    Overline(DecorationType),
    Strikethrough(DecorationType),
}

impl StyleChange {
    /// The property kind this change overrides.
    pub fn property(&self) -> TextProperty {
        match self {
            Self::Typeface(_) => TextProperty::Typeface,
            Self::Bold(_) => TextProperty::Bold,
            Self::Italic(_) => TextProperty::Italic,
            Self::Height(_) => TextProperty::Height,
            Self::WidthFactor(_) => TextProperty::WidthFactor,
            Self::ObliqueAngle(_) => TextProperty::ObliqueAngle,
            Self::CharacterSpacing(_) => TextProperty::CharacterSpacing,
            Self::Underline(_) => TextProperty::Underline,
            Self::Overline(_) => TextProperty::Overline,
            Self::Strikethrough(_) => TextProperty::Strikethrough,
        }
    }
}

/// List of style changes carried by a run; at most one entry per property.
pub(crate) type StyleChangeList = SmallVec<[StyleChange; 4]>;

/// A fully populated text style.
#[derive(Clone, Debug)]
pub struct TextStyle {
    /// Typeface (family) name.
    pub typeface: String,
    pub bold: bool,
    pub italic: bool,
    /// Nominal text height in model units.
    pub height: i32,
    /// Horizontal scale applied to glyph advances and outlines.
    pub width_factor: f32,
    /// Slant applied to glyphs, in degrees.
    pub oblique_angle: f32,
    /// Multiplier on the natural inter-character advance.
    pub character_spacing: f32,
    pub underline: DecorationType,
    pub overline: DecorationType,
    pub strikethrough: DecorationType,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            typeface: "Arial".into(),
            bold: false,
            italic: false,
            height: 16,
            width_factor: 1.0,
            oblique_angle: 0.0,
            character_spacing: 1.0,
            underline: DecorationType::None,
            overline: DecorationType::None,
            strikethrough: DecorationType::None,
        }
    }
}

impl TextStyle {
    /// Applies a single change in place.
    ///
    /// A typeface change with an empty payload leaves the inherited
    /// typeface untouched.
    pub fn apply(&mut self, change: &StyleChange) {
        match change {
            StyleChange::Typeface(name) => {
                if !name.is_empty() {
                    self.typeface = name.clone();
                }
            }
            StyleChange::Bold(value) => self.bold = *value,
            StyleChange::Italic(value) => self.italic = *value,
            StyleChange::Height(value) => self.height = *value,
            StyleChange::WidthFactor(value) => self.width_factor = *value,
            StyleChange::ObliqueAngle(value) => self.oblique_angle = *value,
            StyleChange::CharacterSpacing(value) => self.character_spacing = *value,
            StyleChange::Underline(value) => self.underline = *value,
            StyleChange::Overline(value) => self.overline = *value,
            StyleChange::Strikethrough(value) => self.strikethrough = *value,
        }
    }

    /// Returns a copy of `self` with `changes` applied in order.
    pub fn resolve(&self, changes: &[StyleChange]) -> Self {
        let mut resolved = self.clone();
        for change in changes {
            resolved.apply(change);
        }
        resolved
    }

    /// Equality with floating fields compared to within [`STYLE_EPSILON`].
    pub fn nearly_eq(&self, other: &Self) -> bool {
        self.typeface == other.typeface
            && self.bold == other.bold
            && self.italic == other.italic
            && self.height == other.height
            && nearly_eq(self.width_factor, other.width_factor)
            && nearly_eq(self.oblique_angle, other.oblique_angle)
            && nearly_eq(self.character_spacing, other.character_spacing)
            && self.underline == other.underline
            && self.overline == other.overline
            && self.strikethrough == other.strikethrough
    }

    pub fn has_underline(&self) -> bool {
        self.underline != DecorationType::None
    }

    pub fn has_overline(&self) -> bool {
        self.overline != DecorationType::None
    }

    pub fn has_strikethrough(&self) -> bool {
        self.strikethrough != DecorationType::None
    }
}

pub(crate) fn nearly_eq(x: f32, y: f32) -> bool {
    (x - y).abs() < STYLE_EPSILON
}

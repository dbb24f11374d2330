// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hashbrown::HashMap;

/// Recognized plugin configuration keys.
pub mod keys {
    /// `;`-delimited list of markup languages the parser system must
    /// support. Initialization fails closed when one is unsupported.
    pub const SUPPORT_LANGUAGES: &str = "supportLanguages";
    /// Directory whose font files are registered with the font device.
    pub const FONT_FOLDER: &str = "fontFolder";
    /// `"default"` enables system font substitution for unknown typefaces.
    pub const FONT_SUBSTITUTION: &str = "fontSubstitution";
    /// Default tab advance as a multiple of the text height.
    pub const TAB_SIZE: &str = "tabSize";
    /// Fraction of the extent height at which the first line of a
    /// double-line strikethrough is placed.
    pub const POS_FIRST_LINE_OF_DOUBLE_STRIKETHROUGH: &str = "posFirstLineOfDoubleStrikethrough";
}

const DEFAULT_TAB_SIZE: f32 = 4.0;
const DEFAULT_DOUBLE_STRIKETHROUGH_FIRST: f32 = 1.0 / 3.0;

/// String-valued configuration map handed to parser and renderer plugins.
///
/// Unrecognized keys are preserved so that out-of-tree plugins can carry
/// their own options through the same map.
#[derive(Clone, Default, Debug)]
pub struct PluginSettings {
    values: HashMap<String, String>,
}

impl PluginSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The required languages from [`keys::SUPPORT_LANGUAGES`], split on
    /// `;` with empty entries dropped.
    pub fn support_languages(&self) -> Vec<&str> {
        self.get(keys::SUPPORT_LANGUAGES)
            .map(|list| {
                list.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn font_folder(&self) -> Option<&str> {
        self.get(keys::FONT_FOLDER)
    }

    /// Whether system font substitution is enabled.
    pub fn system_substitution(&self) -> bool {
        self.get(keys::FONT_SUBSTITUTION) == Some("default")
    }

    /// Tab advance as a multiple of the text height.
    pub fn tab_size(&self) -> f32 {
        self.get(keys::TAB_SIZE)
            .and_then(|v| v.parse().ok())
            .filter(|v: &f32| *v > 0.0)
            .unwrap_or(DEFAULT_TAB_SIZE)
    }

    /// Placement fraction of the first line of a double strikethrough.
    /// The second line mirrors it at one minus this fraction.
    pub fn double_strikethrough_first(&self) -> f32 {
        self.get(keys::POS_FIRST_LINE_OF_DOUBLE_STRIKETHROUGH)
            .and_then(|v| v.parse().ok())
            .filter(|v: &f32| (0.0..=1.0).contains(v))
            .unwrap_or(DEFAULT_DOUBLE_STRIKETHROUGH_FIRST)
    }
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use markup_text::{MarkupText, Run, RunKind};

use crate::error::GenerateError;
use crate::parser::{register_parser, MarkupParser, ParserSystem};
use crate::render::{GlyphData, GlyphGeometry, GlyphInput, RendererRegistry, TextRenderer};
use crate::settings::PluginSettings;

struct FixedInputRenderer(GlyphInput);

impl TextRenderer for FixedInputRenderer {
    fn require_input(&self) -> GlyphInput {
        self.0
    }

    fn generate_geometry_and_coords(
        &self,
        _glyph: &GlyphData,
    ) -> Result<GlyphGeometry, GenerateError> {
        Ok(GlyphGeometry::default())
    }
}

#[test]
fn named_renderers_resolve_exactly() {
    let registry = RendererRegistry::global();
    registry.register("registry-test-control", || {
        Arc::new(FixedInputRenderer(GlyphInput::ControlPoints))
    });
    registry.register("registry-test-raster", || {
        Arc::new(FixedInputRenderer(GlyphInput::Rasterization))
    });

    let control = registry.get_text_renderer("registry-test-control");
    assert_eq!(control.require_input(), GlyphInput::ControlPoints);
    let raster = registry.get_text_renderer("registry-test-raster");
    assert_eq!(raster.require_input(), GlyphInput::Rasterization);
}

#[test]
fn unknown_and_empty_names_resolve_to_the_default() {
    let registry = RendererRegistry::global();
    let unknown = registry.get_text_renderer("registry-test-no-such-renderer");
    assert_eq!(unknown.require_input(), GlyphInput::ControlPoints);
    let empty = registry.get_text_renderer("");
    assert_eq!(empty.require_input(), GlyphInput::ControlPoints);
}

#[test]
fn reregistering_replaces_in_place() {
    let registry = RendererRegistry::global();
    registry.register("registry-test-replace", || {
        Arc::new(FixedInputRenderer(GlyphInput::ControlPoints))
    });
    registry.register("registry-test-replace", || {
        Arc::new(FixedInputRenderer(GlyphInput::Rasterization))
    });
    let renderer = registry.get_text_renderer("registry-test-replace");
    assert_eq!(renderer.require_input(), GlyphInput::Rasterization);
}

/// A parser claiming a private language; emits a recognizable run count.
struct CountingParser {
    name: &'static str,
    runs: usize,
}

impl MarkupParser for CountingParser {
    fn name(&self) -> &str {
        self.name
    }

    fn is_supported(&self, language: &str) -> bool {
        language.eq_ignore_ascii_case("registry-test-lang")
    }

    fn initialize(&mut self, _settings: &PluginSettings) -> Result<(), GenerateError> {
        Ok(())
    }

    fn parse(&self, markup: &mut MarkupText) -> Result<(), GenerateError> {
        markup.reset_flow();
        let mut line = markup_text::Line::new(markup_text::LineBreak::TextStart);
        let mut ids = Vec::new();
        for _ in 0..self.runs {
            ids.push(markup.push_run(Run::new(RunKind::String, 0, 0)));
        }
        for id in ids {
            line.add_text_run(id, 0);
        }
        line.set_end_break(markup_text::LineBreak::TextEnd);
        markup.push_line(line);
        markup.ensure_block();
        Ok(())
    }
}

#[test]
fn first_registered_parser_wins_for_a_language() {
    register_parser("registry-test-first", || {
        Box::new(CountingParser {
            name: "registry-test-first",
            runs: 2,
        })
    });
    register_parser("registry-test-second", || {
        Box::new(CountingParser {
            name: "registry-test-second",
            runs: 5,
        })
    });

    let system = ParserSystem::new(&PluginSettings::new()).unwrap();
    let mut markup = MarkupText::new("anything");
    markup.set_language(Some("registry-test-lang".into()));
    assert!(system.parse_text(&mut markup));
    assert_eq!(markup.runs().len(), 2);
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use markup_text::{
    Block, BlockAlignment, Line, LineBreak, LineSpaceType, MarkupText, ParagraphAlignment,
    ParagraphStyle, Run, RunKind, TabStop, TabStopKind, TextStyle,
};

use super::{FixedMetricsDevice, ADVANCE, ASCENT, DESCENT};
use crate::layout::generate_layout;
use crate::settings::PluginSettings;

const HEIGHT: i32 = 32;

fn style() -> TextStyle {
    TextStyle {
        height: HEIGHT,
        ..Default::default()
    }
}

/// A single-line markup with one string run over the whole text.
fn simple_markup(text: &str) -> MarkupText {
    let mut markup = MarkupText::new(text);
    markup.set_global_style(style());
    markup.collapse_to_plain_text();
    markup
}

fn advance() -> f32 {
    ADVANCE * HEIGHT as f32
}

#[test]
fn run_metrics_use_device_advances() {
    let mut markup = simple_markup("abc");
    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    let run = &layout.runs[0];
    assert_eq!(run.chars.len(), 3);
    assert_eq!(run.advance(), 3.0 * advance());
    assert_eq!(run.ascent(), ASCENT * HEIGHT as f32);
    assert_eq!(run.descent(), DESCENT * HEIGHT as f32);
    assert_eq!(run.scale, 1.0);
}

#[test]
fn small_heights_lay_out_at_full_size() {
    let mut markup = simple_markup("a");
    let mut small = style();
    small.height = 10;
    markup.set_global_style(small);

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    let run = &layout.runs[0];
    assert!(run.scale < 1.0);
    // Scaled results match the nominal height exactly.
    assert!((run.advance() - ADVANCE * 10.0).abs() < 1e-4);
    assert!((run.ascent() - ASCENT * 10.0).abs() < 1e-4);
}

#[test]
fn wrap_breaks_at_word_boundary() {
    let mut markup = simple_markup("aaa bbb");
    markup.blocks_mut()[0] = {
        let mut block = Block::new(Some(100.0), None);
        block.set_lines(markup.blocks()[0].lines());
        block
    };

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    assert_eq!(markup.lines().len(), 2);
    assert_eq!(markup.lines()[0].end_break(), LineBreak::WrapBreak);
    assert_eq!(markup.lines()[1].start_break(), LineBreak::WrapBreak);

    // The run split after the space: "aaa " stays, "bbb" moves.
    assert_eq!(markup.runs().len(), 2);
    assert_eq!(markup.runs()[0].text(markup.text()), "aaa ");
    assert_eq!(markup.runs()[1].text(markup.text()), "bbb");

    let first = markup.lines()[0].runs().unwrap();
    let second = markup.lines()[1].runs().unwrap();
    assert_eq!((first.first.index(), first.last.index()), (0, 0));
    assert_eq!((second.first.index(), second.last.index()), (1, 1));

    // The continuation starts at its own origin.
    assert_eq!(layout.runs[1].chars[0].start, 0.0);
    assert_eq!(layout.runs[1].advance(), 3.0 * advance());
}

#[test]
fn wrap_breaks_mid_word_when_no_space_fits() {
    let mut markup = simple_markup("aaaaaaa");
    markup.blocks_mut()[0] = {
        let mut block = Block::new(Some(100.0), None);
        block.set_lines(markup.blocks()[0].lines());
        block
    };

    generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    // 5 chars fit into 100 units at 19.2 each.
    assert_eq!(markup.lines().len(), 2);
    assert_eq!(markup.runs()[0].text(markup.text()), "aaaaa");
    assert_eq!(markup.runs()[1].text(markup.text()), "aa");
}

#[test]
fn oversized_single_unit_stays_unbroken() {
    let mut markup = simple_markup("a");
    markup.blocks_mut()[0] = {
        let mut block = Block::new(Some(1.0), None);
        block.set_lines(markup.blocks()[0].lines());
        block
    };

    generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();
    assert_eq!(markup.lines().len(), 1);
}

#[test]
fn tab_advances_to_configured_stop() {
    let mut markup = MarkupText::new("a\tb");
    markup.set_global_style(style());
    let mut paragraph = ParagraphStyle::default();
    paragraph.tab_stops.push(TabStop {
        kind: TabStopKind::Left,
        position: 50.0,
    });
    markup.set_global_paragraph_style(paragraph);

    let a = markup.push_run(Run::new(RunKind::String, 0, 1));
    let tab = markup.push_run(Run::new(RunKind::Tab, 1, 1));
    let b = markup.push_run(Run::new(RunKind::String, 2, 1));
    let mut line = Line::new(LineBreak::TextStart);
    line.set_end_break(LineBreak::TextEnd);
    line.add_text_run(a, 1);
    line.add_text_run(tab, 1);
    line.add_text_run(b, 1);
    markup.push_line(line);
    markup.ensure_block();

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    let positions = &layout.lines[0].run_positions;
    assert_eq!(positions[0][0], 0.0);
    assert_eq!(positions[1][0], advance());
    assert_eq!(positions[2][0], 50.0);
}

#[test]
fn tab_without_stops_uses_default_interval() {
    let mut markup = MarkupText::new("\tx");
    markup.set_global_style(style());
    let tab = markup.push_run(Run::new(RunKind::Tab, 0, 1));
    let x = markup.push_run(Run::new(RunKind::String, 1, 1));
    let mut line = Line::new(LineBreak::TextStart);
    line.add_text_run(tab, 1);
    line.add_text_run(x, 1);
    markup.push_line(line);
    markup.ensure_block();

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    // Default tabSize is 4 heights.
    assert_eq!(layout.lines[0].run_positions[1][0], 4.0 * HEIGHT as f32);
}

#[test]
fn line_spacing_exactly_sets_top_space() {
    let mut markup = simple_markup("a");
    let paragraph = ParagraphStyle {
        line_space_type: LineSpaceType::Exactly,
        line_space: 40.0,
        ..Default::default()
    };
    markup.set_global_paragraph_style(paragraph);

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    let ascent = ASCENT * HEIGHT as f32;
    assert_eq!(layout.lines[0].position[1], -(40.0 - ascent));
}

#[test]
fn paragraph_alignment_right_offsets_the_line() {
    let mut markup = simple_markup("ab");
    let paragraph = ParagraphStyle {
        alignment: ParagraphAlignment::Right,
        ..Default::default()
    };
    markup.set_global_paragraph_style(paragraph);
    markup.blocks_mut()[0] = {
        let mut block = Block::new(Some(100.0), None);
        block.set_lines(markup.blocks()[0].lines());
        block
    };

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    assert_eq!(layout.lines[0].position[0], 100.0 - 2.0 * advance());
}

#[test]
fn height_overflow_flows_into_next_block() {
    let mut markup = MarkupText::new("a\nb\nc");
    markup.set_global_style(style());
    // Three one-char lines.
    let mut prev_end = 0;
    for (index, _) in markup.text().to_owned().match_indices(|c| c != '\n') {
        let run = markup.push_run(Run::new(RunKind::String, index, 1));
        let mut line = Line::new(if prev_end == 0 {
            LineBreak::TextStart
        } else {
            LineBreak::LineBreak
        });
        line.add_text_run(run, 1);
        markup.push_line(line);
        prev_end = index + 1;
    }
    // Each line occupies ascent + descent + height/4 = 40 units; a block
    // of 70 fits one line plus change.
    markup.push_block(Block::new(None, Some(70.0)));
    markup.push_block(Block::new(None, Some(70.0)));

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    // The second line no longer fits the first column and moves; the
    // third stays in the last column even though it overflows it.
    assert_eq!(layout.lines[0].block, 0);
    assert_eq!(layout.lines[1].block, 1);
    assert_eq!(layout.lines[2].block, 1);
    // Flow restarts at the top of the next block.
    assert_eq!(layout.lines[1].position[1], 0.0);

    let first = markup.blocks()[0].lines().unwrap();
    let second = markup.blocks()[1].lines().unwrap();
    assert_eq!((first.first.index(), first.last.index()), (0, 0));
    assert_eq!((second.first.index(), second.last.index()), (1, 2));
}

#[test]
fn bottom_alignment_shifts_lines_down() {
    let mut markup = simple_markup("a");
    markup.blocks_mut()[0] = {
        let mut block = Block::new(None, Some(100.0));
        block.set_alignment(BlockAlignment::Bottom);
        block.set_lines(markup.blocks()[0].lines());
        block
    };

    let layout = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    )
    .unwrap();

    // One line uses ascent + descent + (ascent+descent)/4 = 40 units.
    let used = 40.0;
    assert_eq!(layout.lines[0].position[1], -(100.0 - used));
}

#[test]
fn missing_height_aborts_layout() {
    let mut markup = simple_markup("a");
    let mut bad = style();
    bad.height = 0;
    markup.set_global_style(bad);

    let result = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    );
    assert!(result.is_err());
}

#[test]
fn missing_typeface_aborts_layout() {
    let mut markup = simple_markup("a");
    let mut bad = style();
    bad.typeface = String::new();
    markup.set_global_style(bad);

    let result = generate_layout(
        &mut markup,
        &mut FixedMetricsDevice,
        &PluginSettings::new(),
    );
    assert!(result.is_err());
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::*;

#[test]
fn add_style_change_is_last_writer_wins() {
    let mut run = Run::new(RunKind::String, 0, 4);
    run.add_style_change(StyleChange::Height(20));
    run.add_style_change(StyleChange::Bold(true));
    run.add_style_change(StyleChange::Height(32));
    run.add_style_change(StyleChange::Height(48));

    let heights: Vec<_> = run
        .style_changes()
        .iter()
        .filter(|c| c.property() == TextProperty::Height)
        .collect();
    assert_eq!(heights.len(), 1);
    assert_eq!(heights[0], &StyleChange::Height(48));
    // The unrelated change keeps its slot.
    assert_eq!(run.style_changes()[1], StyleChange::Bold(true));
}

#[test]
fn add_style_change_preserves_order_of_unrelated_properties() {
    let mut run = Run::new(RunKind::String, 0, 1);
    run.add_style_change(StyleChange::Italic(true));
    run.add_style_change(StyleChange::WidthFactor(0.8));
    run.add_style_change(StyleChange::Italic(false));

    let kinds: Vec<_> = run.style_changes().iter().map(|c| c.property()).collect();
    assert_eq!(kinds, [TextProperty::Italic, TextProperty::WidthFactor]);
}

#[test]
fn resolve_with_empty_changes_is_identity() {
    let style = TextStyle {
        width_factor: 0.75,
        oblique_angle: 15.0,
        ..Default::default()
    };
    let resolved = style.resolve(&[]);
    assert!(resolved.nearly_eq(&style));
}

#[test]
fn resolve_cascades_in_order() {
    let style = TextStyle::default();
    let resolved = style.resolve(&[
        StyleChange::Height(20),
        StyleChange::Bold(true),
        StyleChange::Height(40),
    ]);
    assert_eq!(resolved.height, 40);
    assert!(resolved.bold);
    assert_eq!(resolved.typeface, style.typeface);
}

#[test]
fn empty_typeface_change_does_not_blank_inherited_value() {
    let style = TextStyle::default();
    let resolved = style.resolve(&[StyleChange::Typeface(String::new())]);
    assert_eq!(resolved.typeface, style.typeface);

    let resolved = style.resolve(&[StyleChange::Typeface("Courier".into())]);
    assert_eq!(resolved.typeface, "Courier");
}

#[test]
fn nearly_eq_uses_tight_epsilon() {
    let a = TextStyle::default();
    let mut b = a.clone();
    b.width_factor += STYLE_EPSILON / 2.0;
    assert!(a.nearly_eq(&b));
    b.width_factor = a.width_factor + 1e-3;
    assert!(!a.nearly_eq(&b));
}

#[test]
fn line_zero_to_normal_on_first_nonzero_run() {
    let mut markup = MarkupText::new("ab");
    let empty = markup.push_run(Run::new(RunKind::String, 0, 0));
    let full = markup.push_run(Run::new(RunKind::String, 0, 2));

    let mut line = Line::new(LineBreak::TextStart);
    assert_eq!(line.kind(), LineKind::Zero);
    assert!(line.add_text_run(empty, 0));
    assert_eq!(line.kind(), LineKind::Zero);
    assert!(line.add_text_run(full, 2));
    assert_eq!(line.kind(), LineKind::Normal);
}

#[test]
fn invalid_line_refuses_runs() {
    let mut markup = MarkupText::new("x");
    let id = markup.push_run(Run::new(RunKind::String, 0, 1));

    let mut line = Line::default();
    line.invalidate();
    assert!(!line.add_text_run(id, 1));
    assert!(line.runs().is_none());
    assert_eq!(line.kind(), LineKind::Invalid);
}

#[test]
#[should_panic(expected = "shorten cannot grow")]
fn shorten_never_grows() {
    let mut run = Run::new(RunKind::String, 0, 3);
    run.shorten(5);
}

#[test]
fn shorten_truncates() {
    let mut run = Run::new(RunKind::String, 2, 5);
    run.shorten(2);
    assert_eq!(run.len(), 2);
    assert_eq!(run.start(), 2);
}

#[test]
fn copy_part_derives_sub_run_with_styles() {
    let mut run = Run::new(RunKind::String, 4, 6);
    run.add_style_change(StyleChange::Bold(true));
    run.set_color(Some(Color::from_rgba8(255, 0, 0, 255)));

    let part = run.copy_part(2, 3);
    assert_eq!(part.start(), 6);
    assert_eq!(part.len(), 3);
    assert_eq!(part.style_changes(), run.style_changes());
    assert_eq!(part.color(), run.color());
}

#[test]
fn collapse_to_plain_text_shape() {
    let mut markup = MarkupText::new("Hello");
    markup.collapse_to_plain_text();

    assert_eq!(markup.runs().len(), 1);
    let run = &markup.runs()[0];
    assert_eq!(run.kind(), RunKind::String);
    assert_eq!((run.start(), run.len()), (0, 5));

    assert_eq!(markup.lines().len(), 1);
    let line = &markup.lines()[0];
    assert_eq!(line.start_break(), LineBreak::TextStart);
    assert_eq!(line.end_break(), LineBreak::TextEnd);
    assert_eq!(line.kind(), LineKind::Normal);
    assert_eq!(line.runs().map(|r| r.count()), Some(1));

    assert_eq!(markup.paragraphs().len(), 0);
    assert_eq!(markup.blocks().len(), 1);
    let block = &markup.blocks()[0];
    assert_eq!(block.width(), None);
    assert_eq!(block.height(), None);
}

#[test]
fn collapse_is_deterministic_from_any_state() {
    let mut markup = MarkupText::new("abc");
    markup.push_run(Run::new(RunKind::String, 0, 1));
    markup.push_run(Run::new(RunKind::String, 1, 2));
    markup.push_line(Line::default());
    markup.push_block(Block::new(Some(10.0), None));

    markup.collapse_to_plain_text();
    assert_eq!(markup.runs().len(), 1);
    assert_eq!(markup.lines().len(), 1);
    assert_eq!(markup.blocks().len(), 1);
    assert_eq!(markup.runs()[0].len(), 3);
}

#[test]
fn collapse_of_empty_text_keeps_zero_line() {
    let mut markup = MarkupText::new("");
    markup.collapse_to_plain_text();
    assert_eq!(markup.runs().len(), 1);
    assert_eq!(markup.runs()[0].len(), 0);
    assert_eq!(markup.lines()[0].kind(), LineKind::Zero);
}

#[test]
#[should_panic(expected = "outside markup string")]
fn push_run_rejects_out_of_range() {
    let mut markup = MarkupText::new("ab");
    markup.push_run(Run::new(RunKind::String, 1, 4));
}

#[test]
fn insert_run_after_reindexes_line_ranges() {
    let mut markup = MarkupText::new("aabbcc");
    let a = markup.push_run(Run::new(RunKind::String, 0, 2));
    let b = markup.push_run(Run::new(RunKind::String, 2, 2));
    let c = markup.push_run(Run::new(RunKind::String, 4, 2));

    let mut first = Line::new(LineBreak::TextStart);
    first.add_text_run(a, 2);
    first.add_text_run(b, 2);
    let first = markup.push_line(first);

    let mut second = Line::new(LineBreak::LineBreak);
    second.add_text_run(c, 2);
    let second = markup.push_line(second);

    // Split the first run; the new part lands inside the first line's span.
    let part = markup.run(a).copy_part(1, 1);
    let inserted = markup.insert_run_after(a, part);
    assert_eq!(inserted.index(), 1);

    let first_range = markup.line(first).runs().unwrap();
    assert_eq!(first_range.first.index(), 0);
    assert_eq!(first_range.last.index(), 2);

    // The second line's runs shifted past the insertion point.
    let second_range = markup.line(second).runs().unwrap();
    assert_eq!(second_range.first.index(), 3);
    assert_eq!(second_range.last.index(), 3);
    assert_eq!(markup.run(second_range.first).start(), 4);
}

#[test]
fn insert_line_after_reindexes_paragraph_and_block_ranges() {
    let mut markup = MarkupText::new("x");
    let l0 = markup.push_line(Line::new(LineBreak::TextStart));
    let l1 = markup.push_line(Line::new(LineBreak::LineBreak));

    let mut paragraph = Paragraph::default();
    paragraph.set_lines(Some(LineRange::new(l0, l1)));
    markup.push_paragraph(paragraph);

    let mut block = Block::default();
    block.set_lines(Some(LineRange::new(l1, l1)));
    markup.push_block(block);

    markup.insert_line_after(l0, Line::new(LineBreak::WrapBreak));

    let paragraph_range = markup.paragraphs()[0].lines().unwrap();
    assert_eq!(paragraph_range.first.index(), 0);
    assert_eq!(paragraph_range.last.index(), 2);

    let block_range = markup.blocks()[0].lines().unwrap();
    assert_eq!(block_range.first.index(), 2);
    assert_eq!(block_range.last.index(), 2);
}

#[test]
fn ensure_block_synthesizes_default_column() {
    let mut markup = MarkupText::new("hi");
    markup.push_line(Line::new(LineBreak::TextStart));
    assert!(markup.blocks().is_empty());
    markup.ensure_block();
    assert_eq!(markup.blocks().len(), 1);
    let range = markup.blocks()[0].lines().unwrap();
    assert_eq!(range.count(), 1);

    // Idempotent.
    markup.ensure_block();
    assert_eq!(markup.blocks().len(), 1);
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout pass: positions runs and lines inside their blocks.
//!
//! Layout runs in four stages over a parsed [`MarkupText`]:
//!
//! 1. per-run metrics: character advances and extent bounds at the
//!    resolved style, generated at full size and scaled back down;
//! 2. line assembly: run positions along each line, tab advances, and
//!    wrap breaking against the block width constraint;
//! 3. vertical flow: line heights from the paragraph's line spacing,
//!    column overflow and block alignment;
//! 4. decoration collection per line.

mod decoration;

use markup_text::{
    BlockAlignment, Line, LineBreak, LineId, LineRange, LineSpaceType, MarkupText,
    ParagraphAlignment, ParagraphStyle, RunId, RunKind, RunRange, TabStopKind, TextStyle,
};

use crate::device::{full_size_style, FontDevice};
use crate::error::GenerateError;
use crate::settings::PluginSettings;

pub(crate) use decoration::{DecorationLine, DecorationSection};

/// Metrics of one renderable character, in final (scaled) units.
#[derive(Copy, Clone, Debug)]
pub(crate) struct CharMetrics {
    pub(crate) ch: char,
    /// Byte offset of the character inside its run.
    pub(crate) offset: usize,
    /// Left edge relative to the run origin.
    pub(crate) start: f32,
    /// Right edge of the glyph box.
    pub(crate) end: f32,
}

/// Layout of a single run.
#[derive(Clone, Default, Debug)]
pub(crate) struct RunLayout {
    pub(crate) chars: Vec<CharMetrics>,
    /// Advance-box bounds relative to the run origin on the baseline:
    /// x spans `[0, advance]`, y spans `[-descent, ascent]`.
    pub(crate) extent_min: [f32; 2],
    pub(crate) extent_max: [f32; 2],
    /// Factor mapping device (full-size) units to final units; glyph
    /// outlines extracted at the full-size style are multiplied by this.
    pub(crate) scale: f32,
}

impl RunLayout {
    pub(crate) fn advance(&self) -> f32 {
        self.extent_max[0]
    }

    pub(crate) fn ascent(&self) -> f32 {
        self.extent_max[1]
    }

    pub(crate) fn descent(&self) -> f32 {
        -self.extent_min[1]
    }
}

/// Layout of a single line.
#[derive(Clone, Default, Debug)]
pub(crate) struct LineLayout {
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    /// Position of the line origin relative to the block origin: x of the
    /// line start, y of the line top. y grows upward, lines flow downward.
    pub(crate) position: [f32; 2],
    /// Index of the block the line flowed into.
    pub(crate) block: usize,
    /// Per-run baseline positions relative to the line origin, in line
    /// range order.
    pub(crate) run_positions: Vec<[f32; 2]>,
    pub(crate) decorations: Vec<DecorationLine>,
}

/// The laid out document; vectors are parallel to the markup containers.
#[derive(Clone, Default, Debug)]
pub(crate) struct TextLayout {
    pub(crate) runs: Vec<RunLayout>,
    pub(crate) lines: Vec<LineLayout>,
}

impl TextLayout {
    /// Absolute baseline origin of a run: the block offset plus the line
    /// position, dropped by the line ascent to the baseline.
    pub(crate) fn run_baseline(&self, markup: &MarkupText, line_index: usize, slot: usize) -> [f32; 2] {
        let line = &self.lines[line_index];
        let block = &markup.blocks()[line.block];
        let run = line.run_positions[slot];
        [
            block.offset()[0] + line.position[0] + run[0],
            block.offset()[1] + line.position[1] - line.ascent + run[1],
        ]
    }
}

pub(crate) fn generate_layout(
    markup: &mut MarkupText,
    device: &mut dyn FontDevice,
    settings: &PluginSettings,
) -> Result<TextLayout, GenerateError> {
    if markup.lines().is_empty() {
        return Err(GenerateError::InvalidLayout("no lines to lay out"));
    }
    markup.ensure_block();

    let mut layout = TextLayout::default();

    // Stage 1: metrics for every run.
    for index in 0..markup.runs().len() {
        let run_layout = measure_run(markup, device, RunId::from_index(index))?;
        layout.runs.push(run_layout);
    }

    // Stage 2: per-line run positions and wrap breaking. The line vector
    // can grow while we walk it.
    layout.lines = vec![LineLayout::default(); markup.lines().len()];
    let mut index = 0;
    while index < markup.lines().len() {
        assemble_line(markup, device, &mut layout, index, settings)?;
        index += 1;
    }

    // Stage 3: vertical flow through the blocks.
    flow_lines(markup, &mut layout)?;

    // Stage 4: decorations.
    let double_first = settings.double_strikethrough_first();
    for index in 0..markup.lines().len() {
        let line = markup.line(LineId::from_index(index));
        layout.lines[index].decorations = decoration::collect_line_decorations(
            markup,
            line,
            &layout.runs,
            &layout.lines[index].run_positions,
            markup.default_color(),
            double_first,
        );
    }

    Ok(layout)
}

/// Validates the attributes generation cannot proceed without.
fn require_style(style: &TextStyle) -> Result<(), GenerateError> {
    if style.typeface.is_empty() {
        return Err(GenerateError::MissingRequiredStyle("typeface"));
    }
    if style.height <= 0 {
        return Err(GenerateError::MissingRequiredStyle("height"));
    }
    Ok(())
}

/// Stage 1 for one run: character metrics and extent bounds.
fn measure_run(
    markup: &MarkupText,
    device: &mut dyn FontDevice,
    id: RunId,
) -> Result<RunLayout, GenerateError> {
    let run = markup.run(id);
    let style = run.resolve_style(markup.global_style());
    require_style(&style)?;
    let (full_style, scale) = full_size_style(&style);
    let metrics = device.metrics(&full_style)?;

    let mut layout = RunLayout {
        scale,
        ..Default::default()
    };
    let ascent = metrics.ascent * scale;
    let descent = metrics.descent * scale;

    let mut pen = 0.0f32;
    match run.kind() {
        RunKind::String => {
            for (offset, ch) in run.text(markup.text()).char_indices() {
                let advance = device.advance(&full_style, ch)? * scale;
                layout.chars.push(CharMetrics {
                    ch,
                    offset,
                    start: pen,
                    end: pen + advance,
                });
                pen += advance * style.character_spacing;
            }
        }
        // A tab's advance depends on its position; line assembly fills it
        // in. A symbol is a non-breaking blank one space wide.
        RunKind::Tab => {}
        RunKind::Symbol => {
            pen = device.advance(&full_style, ' ')? * scale * style.character_spacing;
        }
    }

    layout.extent_min = [0.0, -descent];
    layout.extent_max = [pen, ascent];
    Ok(layout)
}

/// The paragraph style governing `line`, falling back to the global one.
fn paragraph_style_of(markup: &MarkupText, id: LineId) -> ParagraphStyle {
    markup
        .paragraphs()
        .iter()
        .find(|p| p.lines().is_some_and(|range| range.contains(id)))
        .map(|p| p.style().clone())
        .unwrap_or_else(|| markup.global_paragraph_style().clone())
}

/// Index of the block whose range contains `id`; lines outside any range
/// fall back to the first block.
fn block_of_line(markup: &MarkupText, id: LineId) -> usize {
    markup
        .blocks()
        .iter()
        .position(|b| b.lines().is_some_and(|range| range.contains(id)))
        .unwrap_or(0)
}

/// Advance of a tab starting at `pen` under `style`'s tab stops.
fn tab_advance(pen: f32, paragraph: &ParagraphStyle, height: i32, tab_size: f32) -> f32 {
    // Typed stops beyond the pen win; decimal/center/right stops degrade
    // to their position like left stops since the following content is
    // not measured against them here.
    let mut stops: Vec<f32> = paragraph
        .tab_stops
        .iter()
        .filter(|stop| {
            matches!(
                stop.kind,
                TabStopKind::Left | TabStopKind::Right | TabStopKind::Center | TabStopKind::Decimal
            )
        })
        .map(|stop| stop.position)
        .collect();
    stops.sort_by(f32::total_cmp);
    if let Some(stop) = stops.iter().find(|&&p| p > pen + f32::EPSILON) {
        return stop - pen;
    }
    let interval = tab_size * height as f32;
    let next = ((pen / interval).floor() + 1.0) * interval;
    next - pen
}

/// Stage 2 for one line: run positions, tab advances, wrap breaking.
fn assemble_line(
    markup: &mut MarkupText,
    device: &mut dyn FontDevice,
    layout: &mut TextLayout,
    line_index: usize,
    settings: &PluginSettings,
) -> Result<(), GenerateError> {
    let line_id = LineId::from_index(line_index);
    let paragraph = paragraph_style_of(markup, line_id);
    let block = block_of_line(markup, line_id);
    let width_constraint = markup.blocks()[block].content_width().map(|w| {
        (w - paragraph.left_indent - paragraph.right_indent).max(0.0)
    });

    let line = markup.line(line_id);
    let Some(range) = line.runs() else {
        let metrics = zero_line_metrics(markup, device)?;
        let layout_line = &mut layout.lines[line_index];
        layout_line.ascent = metrics.0;
        layout_line.descent = metrics.1;
        return Ok(());
    };

    // Position runs along the baseline, resolving tab advances.
    let mut pen = 0.0f32;
    let mut positions = Vec::with_capacity(range.count());
    for id in range.iter() {
        let run = markup.run(id);
        if run.kind() == RunKind::Tab {
            let style = run.resolve_style(markup.global_style());
            let advance = tab_advance(pen, &paragraph, style.height, settings.tab_size());
            let run_layout = &mut layout.runs[id.index()];
            run_layout.extent_max[0] = advance;
        }
        positions.push([pen, 0.0]);
        pen += layout.runs[id.index()].advance();
    }

    // Wrap against the width constraint.
    if let Some(width) = width_constraint {
        if width > 0.0 && pen > width {
            if let Some(()) = break_line(markup, layout, line_index, range, width)? {
                // Recompute this line now that its tail moved on.
                return assemble_line(markup, device, layout, line_index, settings);
            }
        }
    }

    // Line metrics: envelope of the runs.
    let mut ascent = 0.0f32;
    let mut descent = 0.0f32;
    for id in range.iter() {
        let run_layout = &layout.runs[id.index()];
        ascent = ascent.max(run_layout.ascent());
        descent = descent.max(run_layout.descent());
    }
    if ascent == 0.0 && descent == 0.0 {
        let metrics = zero_line_metrics(markup, device)?;
        ascent = metrics.0;
        descent = metrics.1;
    }

    let layout_line = &mut layout.lines[line_index];
    layout_line.ascent = ascent;
    layout_line.descent = descent;
    layout_line.run_positions = positions;
    Ok(())
}

/// Metrics for a line with no content: the global style's.
fn zero_line_metrics(
    markup: &MarkupText,
    device: &mut dyn FontDevice,
) -> Result<(f32, f32), GenerateError> {
    let style = markup.global_style();
    require_style(style)?;
    let (full_style, scale) = full_size_style(style);
    let metrics = device.metrics(&full_style)?;
    Ok((metrics.ascent * scale, metrics.descent * scale))
}

/// Finds the wrap point in an overfull line and splits it.
///
/// Returns `Some(())` when a break was made. The tail of the line moves to
/// a freshly inserted continuation line starting with a `WrapBreak`; a run
/// straddling the break point is split through
/// [`MarkupText::insert_run_after`] so every stored range stays live.
fn break_line(
    markup: &mut MarkupText,
    layout: &mut TextLayout,
    line_index: usize,
    range: RunRange,
    width: f32,
) -> Result<Option<()>, GenerateError> {
    // Find the first character crossing the constraint.
    let mut overflow: Option<(RunId, usize)> = None;
    'outer: for (slot, id) in range.iter().enumerate() {
        let origin = run_origin(layout, range, slot);
        let run_layout = &layout.runs[id.index()];
        if run_layout.chars.is_empty() {
            // Tabs and symbols break as whole units.
            if origin + run_layout.advance() > width && origin > 0.0 {
                overflow = Some((id, 0));
                break 'outer;
            }
            continue;
        }
        for (char_index, ch) in run_layout.chars.iter().enumerate() {
            if origin + ch.end > width && !(origin == 0.0 && char_index == 0) {
                overflow = Some((id, char_index));
                break 'outer;
            }
        }
    }
    let Some((overflow_run, overflow_char)) = overflow else {
        return Ok(None);
    };

    // Scan backwards from the overflow for a whitespace break chance; the
    // break lands after the whitespace.
    let mut break_at = (overflow_run, overflow_char);
    let mut found_space = false;
    'scan: for id in range.iter().rev() {
        if id > overflow_run {
            continue;
        }
        let run_layout = &layout.runs[id.index()];
        let upto = if id == overflow_run {
            overflow_char
        } else {
            run_layout.chars.len()
        };
        for char_index in (0..upto).rev() {
            if run_layout.chars[char_index].ch.is_whitespace() {
                // Break after the whitespace.
                if char_index + 1 < run_layout.chars.len() {
                    break_at = (id, char_index + 1);
                } else if id < range.last {
                    break_at = (RunId::from_index(id.index() + 1), 0);
                } else {
                    // Trailing whitespace of the line; nothing to move.
                    return Ok(None);
                }
                found_space = true;
                break 'scan;
            }
        }
    }
    if !found_space && overflow_char == 0 && overflow_run == range.first {
        // A single unbreakable unit wider than the column stays put.
        return Ok(None);
    }

    let (break_run, break_char) = break_at;
    // The first run of the continuation line.
    let continuation_first = if break_char == 0 {
        break_run
    } else {
        // Split the run at the break character.
        let byte_offset = layout.runs[break_run.index()].chars[break_char].offset;
        let run = markup.run(break_run);
        let tail = run.copy_part(byte_offset, run.len() - byte_offset);
        markup.run_mut(break_run).shorten(byte_offset);
        let tail_id = markup.insert_run_after(break_run, tail);

        // Split the parallel run layout: keep the head's characters,
        // rebase the tail's to its own origin.
        let head_layout = &mut layout.runs[break_run.index()];
        let tail_chars: Vec<CharMetrics> = head_layout.chars.split_off(break_char);
        let base = tail_chars.first().map_or(0.0, |c| c.start);
        let head_width = head_layout.chars.last().map_or(0.0, |c| c.end);
        let mut tail_layout = RunLayout {
            chars: tail_chars
                .iter()
                .map(|c| CharMetrics {
                    ch: c.ch,
                    offset: c.offset - byte_offset,
                    start: c.start - base,
                    end: c.end - base,
                })
                .collect(),
            extent_min: head_layout.extent_min,
            extent_max: head_layout.extent_max,
            scale: head_layout.scale,
        };
        tail_layout.extent_max[0] = tail_layout.chars.last().map_or(0.0, |c| c.end);
        head_layout.extent_max[0] = head_width;
        layout.runs.insert(tail_id.index(), tail_layout);
        tail_id
    };

    // Move the tail runs onto a continuation line.
    let line_id = LineId::from_index(line_index);
    let old_last = markup.line(line_id).runs().expect("line has runs").last;
    let paragraph_end = markup.line(line_id).is_paragraph_end();
    let end_break = markup.line(line_id).end_break();

    {
        let line = markup.line_mut(line_id);
        line.set_end_break(LineBreak::WrapBreak);
        line.set_paragraph_end(false);
        let keep_last = RunId::from_index(continuation_first.index() - 1);
        line.set_runs(Some(RunRange::new(range.first, keep_last)));
    }

    let mut continuation = Line::new(LineBreak::WrapBreak);
    continuation.set_end_break(end_break);
    continuation.set_paragraph_end(paragraph_end);
    continuation.set_runs(Some(RunRange::new(continuation_first, old_last)));

    let new_line = markup.insert_line_after(line_id, continuation);
    layout
        .lines
        .insert(new_line.index(), LineLayout::default());
    Ok(Some(()))
}

/// X of a run's origin inside its line before positions are finalized.
fn run_origin(layout: &TextLayout, range: RunRange, slot: usize) -> f32 {
    range
        .iter()
        .take(slot)
        .map(|id| layout.runs[id.index()].advance())
        .sum()
}

/// Stage 3: line heights, column flow and block alignment, following the
/// original accumulation order.
fn flow_lines(markup: &mut MarkupText, layout: &mut TextLayout) -> Result<(), GenerateError> {
    let block_count = markup.blocks().len();
    let mut assignments: Vec<usize> = vec![0; markup.lines().len()];
    let mut block_flow: Vec<f32> = vec![0.0; block_count];

    let mut current_block = 0usize;
    let mut flow = 0.0f32;
    let mut first_in_block = true;

    for index in 0..markup.lines().len() {
        let line_id = LineId::from_index(index);
        let paragraph = paragraph_style_of(markup, line_id);
        let line = markup.line(line_id);
        let is_paragraph_start = line.is_paragraph_start();
        let is_paragraph_end = line.is_paragraph_end();
        let end_break = line.end_break();
        let ascent = layout.lines[index].ascent;
        let descent = layout.lines[index].descent;

        let (top_space, bottom_space, line_height) = line_spacing(&paragraph, ascent, descent);
        let mut total = top_space + line_height + bottom_space;
        if is_paragraph_end {
            total += paragraph.paragraph_space;
        }

        // Column overflow moves the line into the next block, unless it is
        // the first line there or no block remains.
        let height = markup.blocks()[current_block].content_height();
        if let Some(height) = height {
            if flow + total > height && !first_in_block && current_block + 1 < block_count {
                block_flow[current_block] = flow;
                current_block += 1;
                flow = 0.0;
            }
        }

        // Horizontal placement: margins, indents, paragraph alignment.
        let block = &markup.blocks()[current_block];
        let indent = if is_paragraph_start && paragraph.first_line_indent >= 0.0 {
            paragraph.first_line_indent
        } else {
            paragraph.left_indent
        };
        let mut x = block.margins().left + indent;
        if let Some(content) = block.content_width() {
            let available = (content - paragraph.left_indent - paragraph.right_indent).max(0.0);
            let line_width = line_content_width(markup, layout, index);
            match paragraph.alignment {
                ParagraphAlignment::Right => x += (available - line_width).max(0.0),
                ParagraphAlignment::Center => x += ((available - line_width) / 2.0).max(0.0),
                // Justification needs per-cluster spacing data that only a
                // shaping pass could provide; lines stay flush left.
                ParagraphAlignment::Left
                | ParagraphAlignment::Justify
                | ParagraphAlignment::Distributed => {}
            }
        }
        let y = -flow - top_space - block.margins().top;

        let layout_line = &mut layout.lines[index];
        layout_line.position = [x, y];
        layout_line.block = current_block;
        assignments[index] = current_block;

        flow += total;
        first_in_block = false;

        // An explicit column break finishes this block.
        if end_break == LineBreak::BlockBreak && current_block + 1 < block_count {
            block_flow[current_block] = flow;
            current_block += 1;
            flow = 0.0;
            first_in_block = true;
        }
    }
    block_flow[current_block] = flow;

    // Rewrite the block ranges from the final assignment.
    for block_index in 0..block_count {
        let mut first = None;
        let mut last = None;
        for (index, &assigned) in assignments.iter().enumerate() {
            if assigned == block_index {
                let id = LineId::from_index(index);
                first.get_or_insert(id);
                last = Some(id);
            }
        }
        let range = first.zip(last).map(|(f, l)| LineRange::new(f, l));
        markup.blocks_mut()[block_index].set_lines(range);
    }

    // Vertical block alignment shifts the finished columns.
    for (index, block) in markup.blocks().iter().enumerate() {
        let Some(height) = block.content_height() else {
            continue;
        };
        let used = block_flow[index];
        if height < used {
            continue;
        }
        let remain = height - used;
        let offset = match block.alignment() {
            BlockAlignment::Top => continue,
            BlockAlignment::Center => remain / 2.0,
            BlockAlignment::Bottom => remain,
        };
        for (line_index, &assigned) in assignments.iter().enumerate() {
            if assigned == index {
                layout.lines[line_index].position[1] -= offset;
            }
        }
    }

    Ok(())
}

/// Width of the positioned content of a line.
fn line_content_width(markup: &MarkupText, layout: &TextLayout, line_index: usize) -> f32 {
    let line = markup.line(LineId::from_index(line_index));
    let Some(range) = line.runs() else {
        return 0.0;
    };
    let positions = &layout.lines[line_index].run_positions;
    positions
        .last()
        .map_or(0.0, |p| p[0] + layout.runs[range.last.index()].advance())
}

/// Line spacing per the paragraph style, returning
/// `(top_space, bottom_space, line_height)`.
fn line_spacing(paragraph: &ParagraphStyle, ascent: f32, descent: f32) -> (f32, f32, f32) {
    let line_height = ascent + descent;
    let space = paragraph.line_space;
    let mut top = 0.0;
    let mut bottom = 0.0;
    match paragraph.line_space_type {
        LineSpaceType::Exactly => {
            top = space - ascent;
            bottom = space / 3.0;
        }
        LineSpaceType::AtLeast => {
            if space > line_height {
                top += space * 4.0 / 3.0 - line_height;
                bottom += space / 3.0;
            } else {
                bottom += line_height / 4.0;
            }
        }
        LineSpaceType::Multiple => {
            bottom += (space * 5.0 / 3.0 - 1.0) * line_height;
        }
    }
    (top, bottom, line_height)
}

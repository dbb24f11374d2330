// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

use crate::arena::{LineId, LineRange, RunId, RunRange};
use crate::block::Block;
use crate::line::{Line, LineBreak};
use crate::paragraph::{Paragraph, ParagraphStyle};
use crate::run::{Run, RunKind};
use crate::style::TextStyle;

/// The aggregate a parser populates and the geometry pass consumes.
///
/// Owns the markup string, the global styles and the run/line/paragraph/
/// block containers. All structural mutation goes through this type so that
/// every stored [`RunRange`]/[`LineRange`] is re-indexed together; a range
/// can never be left referencing a removed or shifted element.
#[derive(Clone, Debug)]
pub struct MarkupText {
    text: String,
    language: Option<String>,
    global_style: TextStyle,
    global_paragraph_style: ParagraphStyle,
    default_color: Color,
    runs: Vec<Run>,
    lines: Vec<Line>,
    paragraphs: Vec<Paragraph>,
    blocks: Vec<Block>,
}

impl MarkupText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            global_style: TextStyle::default(),
            global_paragraph_style: ParagraphStyle::default(),
            default_color: Color::WHITE,
            runs: Vec::new(),
            lines: Vec::new(),
            paragraphs: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// The markup string. Immutable for the lifetime of the value.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The markup language tag, if one is set.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    pub fn global_style(&self) -> &TextStyle {
        &self.global_style
    }

    pub fn set_global_style(&mut self, style: TextStyle) {
        self.global_style = style;
    }

    pub fn global_paragraph_style(&self) -> &ParagraphStyle {
        &self.global_paragraph_style
    }

    pub fn set_global_paragraph_style(&mut self, style: ParagraphStyle) {
        self.global_paragraph_style = style;
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    pub fn set_default_color(&mut self, color: Color) {
        self.default_color = color;
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn run(&self, id: RunId) -> &Run {
        &self.runs[id.index()]
    }

    pub fn run_mut(&mut self, id: RunId) -> &mut Run {
        &mut self.runs[id.index()]
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.index()]
    }

    pub fn line_mut(&mut self, id: LineId) -> &mut Line {
        &mut self.lines[id.index()]
    }

    pub fn line_ids(&self) -> impl Iterator<Item = LineId> {
        (0..self.lines.len() as u32).map(LineId)
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) -> usize {
        self.paragraphs.push(paragraph);
        self.paragraphs.len() - 1
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn push_block(&mut self, block: Block) -> usize {
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    /// Appends a run to the arena.
    ///
    /// # Panics
    ///
    /// Panics if the run's range falls outside the markup string.
    pub fn push_run(&mut self, run: Run) -> RunId {
        assert!(
            run.start() + run.len() <= self.text.len(),
            "run [{}, {}) outside markup string of length {}",
            run.start(),
            run.start() + run.len(),
            self.text.len()
        );
        self.runs.push(run);
        RunId(self.runs.len() as u32 - 1)
    }

    /// Inserts a run directly after `after`, shifting later ids and
    /// re-indexing every line range so nothing dangles.
    ///
    /// A line whose range spans `after` grows to cover the new run, which
    /// is what a wrap split wants: both halves stay in the splitting line
    /// until the breaker moves the tail.
    pub fn insert_run_after(&mut self, after: RunId, run: Run) -> RunId {
        assert!(
            run.start() + run.len() <= self.text.len(),
            "run [{}, {}) outside markup string of length {}",
            run.start(),
            run.start() + run.len(),
            self.text.len()
        );
        let at = after.index() + 1;
        self.runs.insert(at, run);
        for line in &mut self.lines {
            if let Some(range) = line.runs_mut() {
                if range.first > after {
                    range.first.0 += 1;
                }
                if range.last > after {
                    range.last.0 += 1;
                }
            }
        }
        RunId(at as u32)
    }

    /// Appends a line.
    pub fn push_line(&mut self, line: Line) -> LineId {
        self.lines.push(line);
        LineId(self.lines.len() as u32 - 1)
    }

    /// Inserts a line directly after `after`, re-indexing the paragraph and
    /// block line ranges.
    pub fn insert_line_after(&mut self, after: LineId, line: Line) -> LineId {
        let at = after.index() + 1;
        self.lines.insert(at, line);
        let shift = |range: &mut Option<LineRange>| {
            if let Some(range) = range {
                if range.first > after {
                    range.first.0 += 1;
                }
                if range.last > after {
                    range.last.0 += 1;
                }
            }
        };
        for paragraph in &mut self.paragraphs {
            shift(paragraph.lines_mut());
        }
        for block in &mut self.blocks {
            shift(block.lines_mut());
        }
        LineId(at as u32)
    }

    /// The runs of `line` in document order, or an empty iterator for a
    /// line without content.
    pub fn line_runs<'a>(&'a self, line: &Line) -> impl Iterator<Item = (RunId, &'a Run)> {
        line.runs()
            .into_iter()
            .flat_map(|range| range.iter())
            .map(|id| (id, self.run(id)))
    }

    /// Guarantees at least one block exists, synthesizing a default
    /// unconstrained column covering all lines when the parser produced
    /// none.
    pub fn ensure_block(&mut self) -> usize {
        if self.blocks.is_empty() {
            let mut block = Block::default();
            if !self.lines.is_empty() {
                block.set_lines(Some(LineRange::new(
                    LineId(0),
                    LineId(self.lines.len() as u32 - 1),
                )));
            }
            self.blocks.push(block);
        }
        self.blocks.len() - 1
    }

    /// Clears runs, lines and paragraphs ahead of a parse, keeping the
    /// configured blocks but dropping their line ranges.
    pub fn reset_flow(&mut self) {
        self.runs.clear();
        self.lines.clear();
        self.paragraphs.clear();
        for block in &mut self.blocks {
            block.set_lines(None);
        }
    }

    /// Deterministically collapses the structure to the plain-text shape:
    /// one run spanning the whole string, one line with `TextStart` and
    /// `TextEnd` breaks, one default block. Safe to invoke in any state.
    pub fn collapse_to_plain_text(&mut self) {
        self.runs.clear();
        self.lines.clear();
        self.paragraphs.clear();
        self.blocks.clear();

        let run = Run::new(RunKind::String, 0, self.text.len());
        let run_len = run.len();
        let id = self.push_run(run);

        let mut line = Line::new(LineBreak::TextStart);
        line.set_end_break(LineBreak::TextEnd);
        line.add_text_run(id, run_len);
        self.push_line(line);

        self.ensure_block();
    }
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built-in inline markup grammar.
//!
//! Backslash codes toggle or set style properties, `{`/`}` scope them, and
//! `\P` breaks paragraphs:
//!
//! | code | effect |
//! |------|--------|
//! | `\L` `\l` | underline on / off |
//! | `\O` `\o` | overline on / off |
//! | `\K` `\k` | strikethrough on / off |
//! | `\H<n>;` `\H<n>x;` | absolute / proportional height |
//! | `\W<n>;` | width factor |
//! | `\Q<n>;` | oblique angle in degrees |
//! | `\T<n>;` | character tracking factor |
//! | `\f<name>\|b#\|i#...;` | typeface with bold/italic flags |
//! | `\C<n>;` | indexed color |
//! | `\c<n>;` | decimal RGB color |
//! | `\P` | paragraph break |
//! | `\N` | column break |
//! | `\~` | non-breaking space |
//! | `\\` `\{` `\}` | escaped literals |
//!
//! An unrecognized code is kept as literal text, matching the lenient
//! behavior of the original grammar.

use smallvec::SmallVec;

use markup_text::{
    Color, DecorationType, Line, LineBreak, LineId, LineRange, MarkupText, Paragraph, Run, RunKind,
    StyleChange,
};

use super::MarkupParser;
use crate::error::GenerateError;
use crate::settings::PluginSettings;

const LANGUAGE: &str = "mtext";

/// Indexed colors 1-9; anything else resolves to the foreground entry.
const INDEXED_COLORS: [(u8, u8, u8); 9] = [
    (255, 0, 0),
    (255, 255, 0),
    (0, 255, 0),
    (0, 255, 255),
    (0, 0, 255),
    (255, 0, 255),
    (255, 255, 255),
    (128, 128, 128),
    (192, 192, 192),
];

fn indexed_color(index: i64) -> Color {
    let (r, g, b) = match index {
        1..=9 => INDEXED_COLORS[(index - 1) as usize],
        _ => INDEXED_COLORS[6],
    };
    Color::from_rgba8(r, g, b, 255)
}

/// Parser plugin for the inline markup grammar.
#[derive(Default, Debug)]
pub struct MTextParser;

impl MTextParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for MTextParser {
    fn name(&self) -> &str {
        LANGUAGE
    }

    fn is_supported(&self, language: &str) -> bool {
        language.eq_ignore_ascii_case(LANGUAGE)
    }

    fn initialize(&mut self, settings: &PluginSettings) -> Result<(), GenerateError> {
        for required in settings.support_languages() {
            if !self.is_supported(required) {
                return Err(GenerateError::PluginInitFailure(format!(
                    "required language `{required}` is not supported"
                )));
            }
        }
        Ok(())
    }

    fn parse(&self, markup: &mut MarkupText) -> Result<(), GenerateError> {
        markup.reset_flow();
        markup.ensure_block();
        ParseInstance::new(markup).parse()
    }
}

/// One parse pass over the markup string.
///
/// Style codes accumulate into a persistent delta set; every emitted run
/// carries a copy of the current set, so each run resolves independently
/// against the global style. Groups save and restore the whole set.
/// The persistent override set; one slot per property is plenty.
type DeltaSet = SmallVec<[StyleChange; 4]>;

struct ParseInstance<'a> {
    markup: &'a mut MarkupText,
    text: String,
    /// Open literal segment as `[start, end)` byte offsets.
    segment: Option<(usize, usize)>,
    deltas: DeltaSet,
    color: Option<Color>,
    group_stack: Vec<(DeltaSet, Option<Color>)>,
    current_line: Option<LineId>,
    /// First line of the open paragraph, if one has been started.
    paragraph_first: Option<LineId>,
    current_block: usize,
    block_first: Option<LineId>,
}

impl<'a> ParseInstance<'a> {
    fn new(markup: &'a mut MarkupText) -> Self {
        let text = markup.text().to_owned();
        Self {
            text,
            segment: None,
            deltas: DeltaSet::new(),
            color: None,
            group_stack: Vec::new(),
            current_line: None,
            paragraph_first: None,
            current_block: 0,
            block_first: None,
            markup,
        }
    }

    fn parse(mut self) -> Result<(), GenerateError> {
        let text = core::mem::take(&mut self.text);
        let mut iter = text.char_indices().peekable();
        while let Some((pos, ch)) = iter.next() {
            match ch {
                '\\' => {
                    let Some(&(code_pos, code)) = iter.peek() else {
                        // Trailing backslash: literal.
                        self.push_text(pos, 1);
                        break;
                    };
                    iter.next();
                    match code {
                        'L' => self.style_code(StyleChange::Underline(DecorationType::Normal)),
                        'l' => self.style_code(StyleChange::Underline(DecorationType::None)),
                        'O' => self.style_code(StyleChange::Overline(DecorationType::Normal)),
                        'o' => self.style_code(StyleChange::Overline(DecorationType::None)),
                        'K' => self.style_code(StyleChange::Strikethrough(DecorationType::Normal)),
                        'k' => self.style_code(StyleChange::Strikethrough(DecorationType::None)),
                        'P' => self.paragraph_break(),
                        'N' => self.column_break(),
                        '~' => {
                            self.flush();
                            self.emit_run(Run::new(RunKind::Symbol, code_pos, 1));
                        }
                        '\\' | '{' | '}' => {
                            // Emit the escaped character without the escape.
                            self.push_text(code_pos, code.len_utf8());
                        }
                        'H' | 'W' | 'Q' | 'T' | 'C' | 'c' | 'f' | 'F' | 'A' | 'p' | 'S' => {
                            let param_start = code_pos + 1;
                            let param_end = parameter_end(&text, param_start);
                            self.parameter_code(code, &text[param_start..param_end], param_start);
                            // Skip past the parameter and its semicolon.
                            while iter
                                .peek()
                                .is_some_and(|&(p, _)| p < (param_end + 1).min(text.len()))
                            {
                                iter.next();
                            }
                        }
                        _ => {
                            // Unrecognized tag: keep backslash and code as
                            // literal text.
                            self.push_text(pos, 1);
                            self.push_text(code_pos, code.len_utf8());
                        }
                    }
                }
                '{' => {
                    self.flush();
                    self.group_stack.push((self.deltas.clone(), self.color));
                }
                '}' => {
                    self.flush();
                    if let Some((deltas, color)) = self.group_stack.pop() {
                        self.deltas = deltas;
                        self.color = color;
                    } else {
                        return Err(GenerateError::InvalidLayout("unmatched `}` in markup"));
                    }
                }
                '\t' => {
                    self.flush();
                    self.emit_run(Run::new(RunKind::Tab, pos, 1));
                }
                '\n' => self.line_break(LineBreak::LineBreak),
                _ => self.push_text(pos, ch.len_utf8()),
            }
        }
        self.terminate()
    }

    /// Extends the open literal segment, or flushes and starts a new one
    /// when `pos` is not contiguous with it.
    fn push_text(&mut self, pos: usize, len: usize) {
        match &mut self.segment {
            Some((_, end)) if *end == pos => *end += len,
            _ => {
                self.flush();
                self.segment = Some((pos, pos + len));
            }
        }
    }

    /// Emits the open literal segment as a string run.
    fn flush(&mut self) {
        if let Some((start, end)) = self.segment.take() {
            if end > start {
                self.emit_run(Run::new(RunKind::String, start, end - start));
            }
        }
    }

    fn emit_run(&mut self, mut run: Run) {
        for change in &self.deltas {
            run.add_style_change(change.clone());
        }
        run.set_color(self.color);
        let len = run.len();
        let id = self.markup.push_run(run);
        let line = self.ensure_line();
        self.markup.line_mut(line).add_text_run(id, len);
    }

    /// Records a style change: the delta set keeps at most one change per
    /// property, last writer wins.
    fn style_code(&mut self, change: StyleChange) {
        self.flush();
        let property = change.property();
        if let Some(existing) = self
            .deltas
            .iter_mut()
            .find(|c| c.property() == property)
        {
            *existing = change;
        } else {
            self.deltas.push(change);
        }
    }

    fn parameter_code(&mut self, code: char, param: &str, param_start: usize) {
        match code {
            'H' => {
                let (number, proportional) = match param.strip_suffix(['x', 'X']) {
                    Some(body) => (body.parse::<f32>().ok(), true),
                    None => (param.parse::<f32>().ok(), false),
                };
                if let Some(n) = number {
                    let height = if proportional {
                        let base = self.markup.global_style().resolve(&self.deltas).height;
                        ((base as f32 * n).round() as i32).max(1)
                    } else {
                        (n.round() as i32).max(1)
                    };
                    self.style_code(StyleChange::Height(height));
                }
            }
            'W' => {
                if let Ok(n) = param.parse::<f32>() {
                    self.style_code(StyleChange::WidthFactor(n));
                }
            }
            'Q' => {
                if let Ok(n) = param.parse::<f32>() {
                    self.style_code(StyleChange::ObliqueAngle(n));
                }
            }
            'T' => {
                if let Ok(n) = param.parse::<f32>() {
                    self.style_code(StyleChange::CharacterSpacing(n));
                }
            }
            'C' => {
                let index = param.parse::<i64>().unwrap_or(7);
                self.flush();
                self.color = Some(indexed_color(index));
            }
            'c' => {
                if let Ok(n) = param.parse::<i64>() {
                    self.flush();
                    self.color = Some(Color::from_rgba8(
                        (n & 0xff) as u8,
                        ((n >> 8) & 0xff) as u8,
                        ((n >> 16) & 0xff) as u8,
                        255,
                    ));
                }
            }
            'f' | 'F' => {
                let mut fields = param.split('|');
                if let Some(name) = fields.next() {
                    let name = name.trim();
                    self.style_code(StyleChange::Typeface(name.to_owned()));
                }
                for field in fields {
                    let mut chars = field.chars();
                    match (chars.next(), chars.next()) {
                        (Some('b'), flag) => {
                            self.style_code(StyleChange::Bold(flag == Some('1')));
                        }
                        (Some('i'), flag) => {
                            self.style_code(StyleChange::Italic(flag == Some('1')));
                        }
                        // Pitch and character set fields are accepted and
                        // ignored.
                        (Some('p'), _) | (Some('c'), _) => {}
                        _ => {}
                    }
                }
            }
            // Vertical alignment and paragraph properties are accepted and
            // ignored; stacked fractions degrade to their literal text.
            'A' | 'p' => {}
            'S' => {
                if !param.is_empty() {
                    self.flush();
                    self.segment = Some((param_start, param_start + param.len()));
                    self.flush();
                }
            }
            _ => {}
        }
    }

    /// The line runs are currently being added to, created on first use.
    fn ensure_line(&mut self) -> LineId {
        if let Some(id) = self.current_line {
            return id;
        }
        let id = self.markup.push_line(Line::new(LineBreak::TextStart));
        self.current_line = Some(id);
        if self.block_first.is_none() {
            self.block_first = Some(id);
        }
        id
    }

    fn line_break(&mut self, brk: LineBreak) {
        self.flush();
        let prev = self.ensure_line();
        self.markup.line_mut(prev).set_end_break(brk);
        let id = self.markup.push_line(Line::new(brk));
        self.current_line = Some(id);
    }

    fn paragraph_break(&mut self) {
        self.flush();
        let prev = self.ensure_line();

        // Text before the first break belongs to a paragraph too; create
        // it retroactively from the first line.
        if self.paragraph_first.is_none() && self.markup.paragraphs().is_empty() {
            let first = LineId::from_index(0);
            self.markup.line_mut(first).set_paragraph_start(true);
            self.paragraph_first = Some(first);
            self.markup
                .push_paragraph(Paragraph::new(self.markup.global_paragraph_style().clone()));
        }

        // Close the open paragraph at the current line.
        self.markup.line_mut(prev).set_paragraph_end(true);
        if let Some(first) = self.paragraph_first.take() {
            let index = self.markup.paragraphs().len() - 1;
            self.markup.paragraphs_mut()[index].set_lines(Some(LineRange::new(first, prev)));
        }

        self.line_break(LineBreak::LineBreak);
        let line = self.current_line.expect("line_break sets current_line");
        self.markup.line_mut(line).set_paragraph_start(true);
        self.paragraph_first = Some(line);
        self.markup
            .push_paragraph(Paragraph::new(self.markup.global_paragraph_style().clone()));
    }

    fn column_break(&mut self) {
        self.flush();
        let prev = self.ensure_line();
        let blocks = self.markup.blocks().len();

        // Finish the current column unless this is already the last one;
        // content past the last column keeps flowing into it.
        if self.current_block + 1 < blocks {
            let first = self.block_first.unwrap_or(prev);
            self.markup.blocks_mut()[self.current_block]
                .set_lines(Some(LineRange::new(first, prev)));
        }

        self.line_break(LineBreak::BlockBreak);

        if self.current_block + 1 < blocks {
            self.current_block += 1;
            self.block_first = self.current_line;
        }
    }

    fn terminate(mut self) -> Result<(), GenerateError> {
        self.flush();
        let last = self.ensure_line();
        self.markup.line_mut(last).set_end_break(LineBreak::TextEnd);

        // Close the open paragraph.
        if let Some(first) = self.paragraph_first.take() {
            let index = self.markup.paragraphs().len() - 1;
            self.markup.paragraphs_mut()[index].set_lines(Some(LineRange::new(first, last)));
        }

        // Close the current column.
        let first = self.block_first.unwrap_or(last);
        self.markup.blocks_mut()[self.current_block].set_lines(Some(LineRange::new(first, last)));

        if !self.group_stack.is_empty() {
            return Err(GenerateError::InvalidLayout("unmatched `{` in markup"));
        }
        Ok(())
    }
}

/// Finds the end of a `;`-terminated parameter starting at `from`.
fn parameter_end(text: &str, from: usize) -> usize {
    text[from..]
        .find(';')
        .map(|offset| from + offset)
        .unwrap_or(text.len())
}

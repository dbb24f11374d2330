// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::arena::{RunId, RunRange};

/// State of a line.
///
/// A line starts `Zero` and becomes `Normal` when the first run with
/// nonzero length is added. `Invalid` is terminal: an invalid line refuses
/// further runs.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum LineKind {
    #[default]
    Zero,
    Normal,
    Invalid,
}

/// Why a line starts or ends where it does.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum LineBreak {
    #[default]
    None,
    /// Start of the whole text.
    TextStart,
    /// End of the whole text.
    TextEnd,
    /// An explicit line break in the markup.
    LineBreak,
    /// A column break in the markup.
    BlockBreak,
    /// A break introduced by width-constrained wrapping.
    WrapBreak,
}

/// A rendered row spanning a contiguous range of runs.
#[derive(Clone, Default, Debug)]
pub struct Line {
    runs: Option<RunRange>,
    kind: LineKind,
    start_break: LineBreak,
    end_break: LineBreak,
    paragraph_start: bool,
    paragraph_end: bool,
}

impl Line {
    pub fn new(start_break: LineBreak) -> Self {
        Self {
            start_break,
            ..Default::default()
        }
    }

    /// The runs belonging to this line, or `None` for an empty line.
    pub fn runs(&self) -> Option<RunRange> {
        self.runs
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn start_break(&self) -> LineBreak {
        self.start_break
    }

    pub fn end_break(&self) -> LineBreak {
        self.end_break
    }

    pub fn set_start_break(&mut self, b: LineBreak) {
        self.start_break = b;
    }

    pub fn set_end_break(&mut self, b: LineBreak) {
        self.end_break = b;
    }

    pub fn is_paragraph_start(&self) -> bool {
        self.paragraph_start
    }

    pub fn is_paragraph_end(&self) -> bool {
        self.paragraph_end
    }

    pub fn set_paragraph_start(&mut self, flag: bool) {
        self.paragraph_start = flag;
    }

    pub fn set_paragraph_end(&mut self, flag: bool) {
        self.paragraph_end = flag;
    }

    /// Extends the line's run range with `id`.
    ///
    /// The first added run establishes the range; later runs must follow it
    /// in document order. Adding a run with nonzero length moves a `Zero`
    /// line to `Normal`. Returns `false` without modifying anything when
    /// the line is `Invalid`.
    pub fn add_text_run(&mut self, id: RunId, run_len: usize) -> bool {
        if self.kind == LineKind::Invalid {
            return false;
        }
        match &mut self.runs {
            None => self.runs = Some(RunRange::new(id, id)),
            Some(range) => {
                debug_assert!(range.last < id, "runs must be added in document order");
                range.last = id;
            }
        }
        if self.kind == LineKind::Zero && run_len > 0 {
            self.kind = LineKind::Normal;
        }
        true
    }

    /// Marks the line invalid. Terminal; the line refuses runs afterwards.
    pub fn invalidate(&mut self) {
        self.kind = LineKind::Invalid;
    }

    /// Replaces the run range wholesale.
    ///
    /// Used by the line breaker when it moves runs between lines; the
    /// caller keeps ranges consistent through
    /// [`MarkupText`](crate::MarkupText). A `Zero` line given a range
    /// becomes `Normal`; an `Invalid` line stays invalid and keeps its
    /// range untouched.
    pub fn set_runs(&mut self, runs: Option<RunRange>) {
        if self.kind == LineKind::Invalid {
            return;
        }
        self.runs = runs;
        if self.runs.is_some() && self.kind == LineKind::Zero {
            self.kind = LineKind::Normal;
        }
    }

    pub(crate) fn runs_mut(&mut self) -> &mut Option<RunRange> {
        &mut self.runs
    }
}

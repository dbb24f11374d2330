// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

use crate::style::{StyleChange, StyleChangeList, TextStyle};

/// Kind of content a run addresses.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum RunKind {
    /// Ordinary characters.
    #[default]
    String,
    /// A single tab character, advanced to the next tab stop during layout.
    Tab,
    /// A symbol resolved through the renderer's font backend.
    Symbol,
}

/// Smallest styled unit of text: a contiguous substring of the markup
/// string plus the sparse style overrides that apply to it.
#[derive(Clone, Default, Debug)]
pub struct Run {
    kind: RunKind,
    start: usize,
    len: usize,
    changes: StyleChangeList,
    color: Option<Color>,
}

impl Run {
    pub fn new(kind: RunKind, start: usize, len: usize) -> Self {
        Self {
            kind,
            start,
            len,
            changes: StyleChangeList::new(),
            color: None,
        }
    }

    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Byte offset of the run's first character in the markup string.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Length of the run in bytes of the markup string.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Color override for this run, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    /// The run's color, falling back to `default` when no override is set.
    pub fn color_or(&self, default: Color) -> Color {
        self.color.unwrap_or(default)
    }

    /// Records a style change, replacing any existing change of the same
    /// property kind in place. The order of unrelated changes is preserved.
    pub fn add_style_change(&mut self, change: StyleChange) {
        let property = change.property();
        if let Some(existing) = self.changes.iter_mut().find(|c| c.property() == property) {
            *existing = change;
        } else {
            self.changes.push(change);
        }
    }

    /// The recorded style changes in application order.
    pub fn style_changes(&self) -> &[StyleChange] {
        &self.changes
    }

    /// Resolves the run's effective style by cascading its changes over
    /// `parent`.
    pub fn resolve_style(&self, parent: &TextStyle) -> TextStyle {
        parent.resolve(&self.changes)
    }

    /// Truncates the run to `new_len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `new_len` exceeds the current length; a run can never be
    /// grown through this operation.
    pub fn shorten(&mut self, new_len: usize) {
        assert!(
            new_len <= self.len,
            "shorten cannot grow a run ({new_len} > {len})",
            len = self.len
        );
        self.len = new_len;
    }

    /// Derives a sub-run covering `len` bytes starting `offset` bytes into
    /// this run, deep-copying the style changes and color override.
    ///
    /// # Panics
    ///
    /// Panics if the requested part is not inside the run.
    pub fn copy_part(&self, offset: usize, len: usize) -> Self {
        assert!(
            offset + len <= self.len,
            "sub-run [{offset}, {}) outside run of length {}",
            offset + len,
            self.len
        );
        Self {
            kind: self.kind,
            start: self.start + offset,
            len,
            changes: self.changes.clone(),
            color: self.color,
        }
    }

    /// The substring of `markup` this run addresses.
    pub fn text<'a>(&self, markup: &'a str) -> &'a str {
        &markup[self.start..self.start + self.len]
    }
}

// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-line decoration collection.
//!
//! A decoration (underline, overline or strikethrough) spans contiguous
//! runs whose style carries the same decoration type. Color changes split
//! a decoration into sections without ending it; a type change or a run
//! without the decoration ends it. A double-line strikethrough is expanded
//! into two lines when the decoration closes.

use markup_text::{Color, DecorationType, Line, MarkupText, TextProperty};

use super::RunLayout;

/// A single-color piece of a decoration.
#[derive(Copy, Clone, Debug)]
pub(crate) struct DecorationSection {
    pub(crate) start_x: f32,
    pub(crate) end_x: f32,
    pub(crate) color: Color,
}

/// A finished decoration of one line, y relative to the baseline.
#[derive(Clone, Debug)]
pub(crate) struct DecorationLine {
    pub(crate) property: TextProperty,
    pub(crate) y: f32,
    pub(crate) sections: Vec<DecorationSection>,
}

/// An in-progress decoration while walking the runs of a line.
struct OpenDecoration {
    property: TextProperty,
    kind: DecorationType,
    y: f32,
    /// Envelope of the contributing runs' extent y ranges.
    y_range: [f32; 2],
    sections: Vec<DecorationSection>,
}

impl OpenDecoration {
    /// The decoration's y position per property, from the current envelope.
    fn update_y(&mut self) {
        self.y = match self.property {
            TextProperty::Underline => self.y_range[0],
            TextProperty::Overline => self.y_range[1],
            _ => (self.y_range[0] + self.y_range[1]) / 2.0,
        };
    }

    /// Closes the decoration, expanding a double-line strikethrough into
    /// its two lines at the configured fractions of the y envelope.
    fn close(self, out: &mut Vec<DecorationLine>, double_first: f32) {
        if self.property == TextProperty::Strikethrough && self.kind == DecorationType::DoubleLines
        {
            let span = self.y_range[0] + self.y_range[1];
            out.push(DecorationLine {
                property: self.property,
                y: span * double_first,
                sections: self.sections.clone(),
            });
            out.push(DecorationLine {
                property: self.property,
                y: span * (1.0 - double_first),
                sections: self.sections,
            });
        } else {
            out.push(DecorationLine {
                property: self.property,
                y: self.y,
                sections: self.sections,
            });
        }
    }
}

pub(crate) fn collect_line_decorations(
    markup: &MarkupText,
    line: &Line,
    run_layouts: &[RunLayout],
    run_positions: &[[f32; 2]],
    default_color: Color,
    double_first: f32,
) -> Vec<DecorationLine> {
    let mut out = Vec::new();
    let Some(range) = line.runs() else {
        return out;
    };

    let mut open: [Option<OpenDecoration>; 3] = [None, None, None];
    const PROPERTIES: [TextProperty; 3] = [
        TextProperty::Underline,
        TextProperty::Overline,
        TextProperty::Strikethrough,
    ];

    for (slot, id) in range.iter().enumerate() {
        let run = markup.run(id);
        let style = run.resolve_style(markup.global_style());
        let layout = &run_layouts[id.index()];
        let position = run_positions[slot];
        let color = run.color_or(default_color);
        let min = [layout.extent_min[0] + position[0], layout.extent_min[1]];
        let max = [layout.extent_max[0] + position[0], layout.extent_max[1]];

        for (index, property) in PROPERTIES.iter().enumerate() {
            let kind = match property {
                TextProperty::Underline => style.underline,
                TextProperty::Overline => style.overline,
                _ => style.strikethrough,
            };
            let current = &mut open[index];

            if kind == DecorationType::None {
                if let Some(decoration) = current.take() {
                    decoration.close(&mut out, double_first);
                }
                continue;
            }

            match current {
                Some(decoration) if decoration.kind == kind => {
                    // Same decoration continues; split the section when
                    // the run color differs.
                    let last = decoration
                        .sections
                        .last_mut()
                        .expect("open decoration has a section");
                    if last.color == color {
                        last.end_x = max[0];
                    } else {
                        let start = last.end_x;
                        decoration.sections.push(DecorationSection {
                            start_x: start,
                            end_x: max[0],
                            color,
                        });
                    }
                    decoration.y_range[0] = decoration.y_range[0].min(min[1]);
                    decoration.y_range[1] = decoration.y_range[1].max(max[1]);
                    decoration.update_y();
                }
                _ => {
                    // Type change or fresh decoration.
                    if let Some(decoration) = current.take() {
                        decoration.close(&mut out, double_first);
                    }
                    let mut decoration = OpenDecoration {
                        property: *property,
                        kind,
                        y: 0.0,
                        y_range: [min[1], max[1]],
                        sections: vec![DecorationSection {
                            start_x: min[0],
                            end_x: max[0],
                            color,
                        }],
                    };
                    decoration.update_y();
                    *current = Some(decoration);
                }
            }
        }
    }

    for decoration in open.into_iter().flatten() {
        decoration.close(&mut out, double_first);
    }
    out
}

//! Text unit enumeration.
//!
//! Characters are extended grapheme clusters. Words are maximal runs of
//! non-whitespace graphemes. Lines are the segments between line breaks
//! (`\n`, `\r\n`, `\r`); a break at the very end does not open a new line.

use std::ops::Range;
use text_animator_data::UnitKind;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextUnit {
    pub index: usize,
    pub kind: UnitKind,
}

impl TextUnit {
    pub fn new(index: usize, kind: UnitKind) -> Self {
        Self { index, kind }
    }
}

/// Ordered units of one kind together with their byte spans in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnits {
    pub kind: UnitKind,
    pub units: Vec<TextUnit>,
    pub spans: Vec<Range<usize>>,
}

impl TextUnits {
    pub fn total_units(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Splits `text` into units of the requested kind.
pub fn enumerate(text: &str, based_on: UnitKind) -> TextUnits {
    TextLayout::new(text).units(based_on)
}

fn is_line_break(grapheme: &str) -> bool {
    matches!(grapheme, "\n" | "\r\n" | "\r")
}

fn is_whitespace(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

/// Grapheme-level view of a text layer that knows which word and line each
/// grapheme belongs to, so selectors with different `basedOn` settings can
/// all be evaluated per rendered character.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    graphemes: Vec<Range<usize>>,
    word_of: Vec<Option<usize>>,
    line_of: Vec<Option<usize>>,
    word_spans: Vec<Range<usize>>,
    line_spans: Vec<Range<usize>>,
}

impl TextLayout {
    pub fn new(text: &str) -> Self {
        let mut layout = TextLayout::default();
        let mut in_word = false;
        let mut line_start = 0;
        let mut ends_with_break = false;

        for (start, g) in text.grapheme_indices(true) {
            let end = start + g.len();
            layout.graphemes.push(start..end);

            if is_whitespace(g) {
                layout.word_of.push(None);
                in_word = false;
            } else {
                if in_word {
                    if let Some(span) = layout.word_spans.last_mut() {
                        span.end = end;
                    }
                } else {
                    layout.word_spans.push(start..end);
                    in_word = true;
                }
                layout.word_of.push(Some(layout.word_spans.len() - 1));
            }

            if is_line_break(g) {
                layout.line_of.push(None);
                layout.line_spans.push(line_start..start);
                line_start = end;
                ends_with_break = true;
            } else {
                layout.line_of.push(Some(layout.line_spans.len()));
                ends_with_break = false;
            }
        }

        if !layout.graphemes.is_empty() && !ends_with_break {
            layout.line_spans.push(line_start..text.len());
        }

        layout
    }

    /// Number of grapheme clusters, i.e. rendered characters.
    pub fn grapheme_count(&self) -> usize {
        self.graphemes.len()
    }

    pub fn grapheme_span(&self, grapheme: usize) -> Option<Range<usize>> {
        self.graphemes.get(grapheme).cloned()
    }

    pub fn total_units(&self, kind: UnitKind) -> usize {
        match kind {
            UnitKind::Character => self.graphemes.len(),
            UnitKind::Word => self.word_spans.len(),
            UnitKind::Line => self.line_spans.len(),
        }
    }

    /// The unit of `kind` that contains grapheme `grapheme`. Whitespace has no
    /// word and line breaks have no line.
    pub fn locate(&self, grapheme: usize, kind: UnitKind) -> Option<TextUnit> {
        let index = match kind {
            UnitKind::Character => (grapheme < self.graphemes.len()).then_some(grapheme),
            UnitKind::Word => self.word_of.get(grapheme).copied().flatten(),
            UnitKind::Line => self.line_of.get(grapheme).copied().flatten(),
        }?;
        Some(TextUnit::new(index, kind))
    }

    pub fn units(&self, kind: UnitKind) -> TextUnits {
        let spans = match kind {
            UnitKind::Character => self.graphemes.clone(),
            UnitKind::Word => self.word_spans.clone(),
            UnitKind::Line => self.line_spans.clone(),
        };
        let units = (0..spans.len()).map(|i| TextUnit::new(i, kind)).collect();
        TextUnits { kind, units, spans }
    }
}

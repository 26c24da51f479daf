/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Deserialize, Serialize)]
/// Corresponds to a slice of the text. This only contains minimal
/// information; i.e. the begin offset and end offset.
///
/// Offsets are in unicode codepoints (not bytes!), 0-indexed, and the end is non-inclusive.
pub struct TextSelection {
    pub(crate) begin: usize,
    pub(crate) end: usize,
}

impl Ord for TextSelection {
    // this determines the canonical ordering for text selections
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = self.begin.cmp(&other.begin);
        if ord != Ordering::Equal {
            ord
        } else {
            self.end.cmp(&other.end)
        }
    }
}

impl PartialOrd for TextSelection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TextSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}-{}]", self.begin, self.end)
    }
}

impl From<(usize, usize)> for TextSelection {
    fn from((begin, end): (usize, usize)) -> Self {
        Self { begin, end }
    }
}

impl TextSelection {
    /// Creates a new text selection. This does no validation whatsoever, the caller is responsible for `begin <= end`.
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Return the begin position (unicode points)
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Return the end position (non-inclusive) in unicode points
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length of the selection in unicode points
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Zero-width selections select no text but still mark a position
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Does this selection contain the given position (begin inclusive, end exclusive)?
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.begin && offset < self.end
    }

    /// Does this selection fully embed the other?
    pub fn embeds(&self, other: &TextSelection) -> bool {
        other.begin >= self.begin && other.end <= self.end
    }

    /// Do the two selections share at least one position?
    pub fn overlaps(&self, other: &TextSelection) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// Is this selection within a text of the given length?
    pub fn within_bounds(&self, length: usize) -> bool {
        self.begin <= self.end && self.end <= length
    }
}

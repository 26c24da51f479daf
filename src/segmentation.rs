/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the token and sentence lookups the span behaviors consult, and the
//! [`Segmentation`] that implements them over sorted, non-overlapping units.

use regex::Regex;
use sealed::sealed;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::text::PositionIndex;
use crate::textselection::TextSelection;
use crate::types::*;

/// Gives access to the sentence segmentation of a document
pub trait SentenceLookup {
    /// All sentences, sorted and non-overlapping
    fn sentences(&self) -> &[TextSelection];

    /// Returns the index of the sentence containing the offset. An offset in a gap between two
    /// sentences belongs to the preceding sentence, an offset before the first sentence to the
    /// first one. Returns `None` only if there are no sentences at all.
    fn sentence_containing(&self, offset: usize) -> Option<usize> {
        let sentences = self.sentences();
        if sentences.is_empty() {
            return None;
        }
        let index = sentences.partition_point(|s| s.begin() <= offset);
        Some(index.saturating_sub(1))
    }
}

/// Gives access to the tokenisation of a document
pub trait TokenLookup {
    /// All tokens, sorted and non-overlapping
    fn tokens(&self) -> &[TextSelection];

    /// Returns the begin of the token containing the offset, or of the closest token before it
    fn token_boundary_at_or_before(&self, offset: usize) -> Option<usize> {
        unit_begin_at_or_before(self.tokens(), offset)
    }

    /// Returns the end of the token containing the offset (or ending on it), or of the closest token after it
    fn token_boundary_at_or_after(&self, offset: usize) -> Option<usize> {
        unit_end_at_or_after(self.tokens(), offset)
    }

    /// Returns the token containing the offset; failing that the closest preceding token; failing
    /// that the first following token.
    fn token_at(&self, offset: usize) -> Option<TextSelection> {
        let tokens = self.tokens();
        if tokens.is_empty() {
            return None;
        }
        let index = tokens.partition_point(|t| t.begin() <= offset);
        Some(tokens[index.saturating_sub(1)])
    }

    /// Is the offset the begin of some token?
    fn is_token_begin(&self, offset: usize) -> bool {
        self.tokens()
            .binary_search_by(|t| t.begin().cmp(&offset))
            .is_ok()
    }

    /// Is the offset the end of some token?
    fn is_token_end(&self, offset: usize) -> bool {
        self.tokens().binary_search_by(|t| t.end().cmp(&offset)).is_ok()
    }
}

pub(crate) fn unit_begin_at_or_before(units: &[TextSelection], offset: usize) -> Option<usize> {
    let index = units.partition_point(|u| u.begin() <= offset);
    if index == 0 {
        None
    } else {
        Some(units[index - 1].begin())
    }
}

pub(crate) fn unit_end_at_or_after(units: &[TextSelection], offset: usize) -> Option<usize> {
    let index = units.partition_point(|u| u.end() < offset);
    units.get(index).map(|u| u.end())
}

/// Expands a selection so it covers whole units. The begin moves down to the begin of the unit
/// at or before it (or the first unit). The end moves to the end of the last unit that starts
/// before it, so units of which no character is selected are not added; a selection that covers
/// no unit character at all gets the unit found for its begin. Returns `None` if there are no units.
pub(crate) fn snap_to_units(units: &[TextSelection], selection: TextSelection) -> Option<TextSelection> {
    let first = units.first()?;
    let last = units.last()?;
    let begin = unit_begin_at_or_before(units, selection.begin()).unwrap_or(first.begin());
    let limit = selection.end().max(begin + 1);
    let end = units
        .partition_point(|u| u.begin() < limit)
        .checked_sub(1)
        .and_then(|index| units.get(index))
        .map(|u| u.end())
        .unwrap_or(last.end());
    Some(TextSelection::new(begin, end.max(begin)))
}

/// Tests whether a selection starts at the begin of a unit and ends at the end of a unit
pub(crate) fn is_aligned_to_units(units: &[TextSelection], selection: &TextSelection) -> bool {
    units
        .binary_search_by(|u| u.begin().cmp(&selection.begin()))
        .is_ok()
        && units
            .binary_search_by(|u| u.end().cmp(&selection.end()))
            .is_ok()
}

/// Token and sentence units of one document. Offsets are unicode character positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    tokens: Vec<TextSelection>,
    sentences: Vec<TextSelection>,
}

impl Segmentation {
    /// An empty segmentation, with neither tokens nor sentences
    pub fn new() -> Self {
        Self::default()
    }
}

impl SentenceLookup for Segmentation {
    fn sentences(&self) -> &[TextSelection] {
        &self.sentences
    }
}

impl TokenLookup for Segmentation {
    fn tokens(&self) -> &[TextSelection] {
        &self.tokens
    }
}

#[sealed]
impl TypeInfo for Segmentation {
    fn typeinfo() -> Type {
        Type::Segmentation
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SegmentationMode {
    /// Units are given explicitly
    Explicit,
    /// Tokens are runs of non-whitespace, sentences are non-blank lines
    Whitespace,
}

/// Builds a [`Segmentation`] for a given text, either from explicit units or by splitting on
/// whitespace (tokens) and newlines (sentences).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationBuilder {
    mode: SegmentationMode,
    tokens: Vec<TextSelection>,
    sentences: Vec<TextSelection>,
}

impl Default for SegmentationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationBuilder {
    /// A builder for explicitly given units
    pub fn new() -> Self {
        Self {
            mode: SegmentationMode::Explicit,
            tokens: Vec::new(),
            sentences: Vec::new(),
        }
    }

    /// A builder that derives units from the text: every run of non-whitespace is a token, every
    /// non-blank line (trimmed) is a sentence.
    pub fn whitespace() -> Self {
        Self {
            mode: SegmentationMode::Whitespace,
            ..Self::new()
        }
    }

    pub fn with_token(mut self, begin: usize, end: usize) -> Self {
        self.tokens.push(TextSelection::new(begin, end));
        self
    }

    pub fn with_sentence(mut self, begin: usize, end: usize) -> Self {
        self.sentences.push(TextSelection::new(begin, end));
        self
    }

    pub fn with_tokens(mut self, tokens: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.tokens.extend(tokens.into_iter().map(TextSelection::from));
        self
    }

    pub fn with_sentences(mut self, sentences: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.sentences
            .extend(sentences.into_iter().map(TextSelection::from));
        self
    }

    /// Builds the segmentation for the given text, validating all units against it
    pub fn build(self, text: &str) -> Result<Segmentation, AnnotationError> {
        let positions = PositionIndex::new(text);
        let (mut tokens, mut sentences) = match self.mode {
            SegmentationMode::Explicit => (self.tokens, self.sentences),
            SegmentationMode::Whitespace => {
                let tokens = find_units(text, r"\S+", &positions)?;
                let sentences = find_units(text, r"\S(?:[^\n]*\S)?", &positions)?;
                (tokens, sentences)
            }
        };
        check_units(&mut tokens, positions.charlen(), "token")?;
        check_units(&mut sentences, positions.charlen(), "sentence")?;
        Ok(Segmentation { tokens, sentences })
    }
}

fn find_units(
    text: &str,
    expression: &str,
    positions: &PositionIndex,
) -> Result<Vec<TextSelection>, AnnotationError> {
    let regex = Regex::new(expression)
        .map_err(|e| AnnotationError::InvalidSegmentation(format!("{}", e)))?;
    let mut units = Vec::new();
    for m in regex.find_iter(text) {
        units.push(TextSelection::new(
            positions.utf8byte_to_charpos(m.start())?,
            positions.utf8byte_to_charpos(m.end())?,
        ));
    }
    Ok(units)
}

/// Sorts units and checks they are within bounds, non-empty and non-overlapping
fn check_units(
    units: &mut Vec<TextSelection>,
    textlen: usize,
    kind: &str,
) -> Result<(), AnnotationError> {
    units.sort_unstable();
    let mut previous: Option<TextSelection> = None;
    for unit in units.iter() {
        if unit.is_empty() || !unit.within_bounds(textlen) {
            return Err(AnnotationError::InvalidSegmentation(format!(
                "{} {} is empty or exceeds the text length {}",
                kind, unit, textlen
            )));
        }
        if let Some(previous) = previous {
            if previous.overlaps(unit) {
                return Err(AnnotationError::InvalidSegmentation(format!(
                    "{} {} overlaps with {} {}",
                    kind, unit, kind, previous
                )));
            }
        }
        previous = Some(*unit);
    }
    Ok(())
}

/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module defines and partially implements the [`Text`] trait, and the [`PositionIndex`]
//! that maps unicode character positions to UTF-8 byte positions.

use crate::error::AnnotationError;
use crate::textselection::TextSelection;

/// This trait provides methods that operate on structures that hold text content.
/// Offsets are always unicode character positions, never bytes.
pub trait Text {
    /// Returns a reference to the text
    fn text(&self) -> &str;

    /// Returns the length of the text in unicode points
    /// For bytes, use `Self::text().len()` instead.
    fn textlen(&self) -> usize;

    /// Converts a unicode character position to a UTF-8 byte position
    fn utf8byte(&self, charpos: usize) -> Result<usize, AnnotationError>;

    /// Converts a UTF-8 byte position into a unicode position
    fn utf8byte_to_charpos(&self, bytepos: usize) -> Result<usize, AnnotationError>;

    fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    /// Returns a string reference to a slice of text as specified by the selection
    fn text_by_selection(&self, selection: &TextSelection) -> Result<&str, AnnotationError> {
        if !selection.within_bounds(self.textlen()) {
            return Err(AnnotationError::BoundsViolation {
                begin: selection.begin(),
                end: selection.end(),
                length: self.textlen(),
            });
        }
        let beginbyte = self.utf8byte(selection.begin())?;
        let endbyte = self.utf8byte(selection.end())?;
        Ok(&self.text()[beginbyte..endbyte])
    }
}

/// Maps character positions to byte positions for one text. Position `n` (the length of the text
/// in characters) maps to the byte length of the text.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    /// Byte position of each character
    bytepos: Vec<usize>,
    bytelen: usize,
}

impl PositionIndex {
    pub fn new(text: &str) -> Self {
        Self {
            bytepos: text.char_indices().map(|(bytepos, _)| bytepos).collect(),
            bytelen: text.len(),
        }
    }

    /// Number of characters in the indexed text
    pub fn charlen(&self) -> usize {
        self.bytepos.len()
    }

    pub fn utf8byte(&self, charpos: usize) -> Result<usize, AnnotationError> {
        if charpos == self.bytepos.len() {
            Ok(self.bytelen)
        } else {
            self.bytepos
                .get(charpos)
                .copied()
                .ok_or(AnnotationError::BoundsViolation {
                    begin: charpos,
                    end: charpos,
                    length: self.bytepos.len(),
                })
        }
    }

    pub fn utf8byte_to_charpos(&self, bytepos: usize) -> Result<usize, AnnotationError> {
        if bytepos == self.bytelen {
            return Ok(self.bytepos.len());
        }
        self.bytepos
            .binary_search(&bytepos)
            .map_err(|_| AnnotationError::BoundsViolation {
                begin: bytepos,
                end: bytepos,
                length: self.bytelen,
            })
    }
}

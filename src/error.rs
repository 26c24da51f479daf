/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`AnnotationError`] type, used by all fallible operations in this
//! crate, and the [`ErrorKind`] discriminant callers can branch on.

use std::error::Error;
use std::fmt;

// ------------------------------ ERROR DEFINITIONS & IMPLEMENTATIONS -------------------------------------------------------------

#[derive(Debug)]
/// This is the error type used throughout the library. Each variant carries enough context to
/// identify the rule that was violated and, where applicable, the conflicting annotation.
pub enum AnnotationError {
    /// The requested offsets lie outside of the document or begin > end
    BoundsViolation {
        begin: usize,
        end: usize,
        length: usize,
    },

    /// A span would cover more than one sentence on a layer that does not allow it
    CrossSentenceViolation(String),

    /// A span would be stacked on an existing one on a layer that does not allow it
    StackingViolation(String),

    /// A feature value was supplied for a feature the layer does not define
    UnknownFeature(String, &'static str),

    /// A feature value does not have the type the layer prescribes
    FeatureTypeMismatch {
        feature: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A handle does not (or no longer) refer to an item
    HandleError(&'static str),

    /// No item with this public identifier exists
    IdNotFoundError(String, &'static str),

    /// An item with this public identifier already exists
    DuplicateIdError(String, &'static str),

    /// Token or sentence units are not sorted, overlap, or fall outside of the text
    InvalidSegmentation(String),

    /// The graph metadata is malformed
    MetadataError(String),

    /// The persisted graph was changed by someone else since it was loaded
    ConcurrentModification { expected: i64, actual: i64 },

    JsonError(
        serde_path_to_error::Error<serde_json::Error>,
        String,
        &'static str,
    ),
    SerializationError(String),
    IOError(std::io::Error, String, &'static str),
}

/// The named kind of an [`AnnotationError`], without any of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BoundsViolation,
    CrossSentenceViolation,
    StackingViolation,
    UnknownFeature,
    FeatureTypeMismatch,
    HandleError,
    IdNotFoundError,
    DuplicateIdError,
    InvalidSegmentation,
    MetadataError,
    ConcurrentModification,
    JsonError,
    SerializationError,
    IOError,
}

impl AnnotationError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BoundsViolation { .. } => ErrorKind::BoundsViolation,
            Self::CrossSentenceViolation(..) => ErrorKind::CrossSentenceViolation,
            Self::StackingViolation(..) => ErrorKind::StackingViolation,
            Self::UnknownFeature(..) => ErrorKind::UnknownFeature,
            Self::FeatureTypeMismatch { .. } => ErrorKind::FeatureTypeMismatch,
            Self::HandleError(..) => ErrorKind::HandleError,
            Self::IdNotFoundError(..) => ErrorKind::IdNotFoundError,
            Self::DuplicateIdError(..) => ErrorKind::DuplicateIdError,
            Self::InvalidSegmentation(..) => ErrorKind::InvalidSegmentation,
            Self::MetadataError(..) => ErrorKind::MetadataError,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::JsonError(..) => ErrorKind::JsonError,
            Self::SerializationError(..) => ErrorKind::SerializationError,
            Self::IOError(..) => ErrorKind::IOError,
        }
    }

    /// Is this a rejection of a span under layer policy (as opposed to a malformed request or an I/O problem)?
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CrossSentenceViolation | ErrorKind::StackingViolation
        )
    }
}

impl From<&AnnotationError> for String {
    /// Returns the error message as a String
    fn from(error: &AnnotationError) -> String {
        match error {
            AnnotationError::BoundsViolation { begin, end, length } => format!(
                "BoundsViolation: Offsets [{}-{}] are not within the document bounds [0-{}] or begin exceeds end",
                begin, end, length
            ),
            AnnotationError::CrossSentenceViolation(msg) => {
                format!("CrossSentenceViolation: {}", msg)
            }
            AnnotationError::StackingViolation(msg) => format!("StackingViolation: {}", msg),
            AnnotationError::UnknownFeature(name, contextmsg) => format!(
                "UnknownFeature: Layer has no feature named '{}' ({})",
                name, contextmsg
            ),
            AnnotationError::FeatureTypeMismatch {
                feature,
                expected,
                found,
            } => format!(
                "FeatureTypeMismatch: Feature '{}' expects a value of type {}, got {}",
                feature, expected, found
            ),
            AnnotationError::HandleError(contextmsg) => {
                format!("HandleError: Invalid handle ({})", contextmsg)
            }
            AnnotationError::IdNotFoundError(id, contextmsg) => {
                format!("IdNotFoundError: No such ID: {} ({})", id, contextmsg)
            }
            AnnotationError::DuplicateIdError(id, contextmsg) => {
                format!("DuplicateIdError: ID already exists: {} ({})", id, contextmsg)
            }
            AnnotationError::InvalidSegmentation(msg) => {
                format!("InvalidSegmentation: {}", msg)
            }
            AnnotationError::MetadataError(msg) => format!("MetadataError: {}", msg),
            AnnotationError::ConcurrentModification { expected, actual } => format!(
                "ConcurrentModification: Detected concurrent modification (expected timestamp: {}; actual timestamp {}) - please try reloading before saving again.",
                expected, actual
            ),
            AnnotationError::JsonError(err, path, contextmsg) => format!(
                "JsonError: Parsing JSON failed: {} ({}) [{}]",
                err, path, contextmsg
            ),
            AnnotationError::SerializationError(msg) => {
                format!("SerializationError: {}", msg)
            }
            AnnotationError::IOError(err, filename, contextmsg) => format!(
                "IOError: {}: {} ({})",
                filename, err, contextmsg
            ),
        }
    }
}

impl fmt::Display for AnnotationError {
    /// Formats the error message for printing
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let errmsg: String = String::from(self);
        write!(f, "[AnnotationError] {}", errmsg)
    }
}

impl Error for AnnotationError {}

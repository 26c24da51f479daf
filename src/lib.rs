/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! ## Introduction
//!
//! This library decides whether a span annotation may enter an in-memory annotation graph, and
//! audits a stored graph against the policy of its annotation layers after the fact.
//!
//! An [`AnnotationGraph`] holds the text of one document, its token and sentence segmentation,
//! and typed span annotations over it. Every annotation type is configured by a [`LayerConfig`]
//! that states whether annotations may be *stacked* (several at identical offsets), whether they
//! may *cross sentence boundaries*, and at which granularity they are *anchored* (characters,
//! tokens or sentences).
//!
//! A [`SpanAdapter`] enforces that policy for one layer through an ordered list of
//! [`SpanBehavior`]s:
//!
//! * [`SpanAdapter::add()`] runs every behavior's `on_create` hook over the candidate span. A
//!   behavior may snap its offsets ([`AnchoringModeBehavior`]) or reject it
//!   ([`CrossSentenceBehavior`], [`StackingBehavior`]). Rejections are errors
//!   ([`AnnotationError::CrossSentenceViolation`], [`AnnotationError::StackingViolation`]) and leave
//!   the graph untouched.
//! * [`SpanAdapter::validate()`] runs every behavior's `on_validate` hook and collects
//!   [`Diagnostic`]s for annotations that violate the *current* policy, for instance after it was
//!   changed. Validation never fails and never modifies the graph.
//!
//! Items:
//! * [`AnnotationGraph`], [`Checkpoint`]
//! * [`SpanAnnotation`], [`SpanAnnotationHandle`]
//! * [`LayerConfig`], [`AnchoringMode`], [`FeatureDefinition`], [`FeatureType`], [`FeatureValue`]
//! * [`Segmentation`], [`SegmentationBuilder`], [`SentenceLookup`], [`TokenLookup`]
//! * [`SpanAdapter`], [`SpanBehavior`], [`CandidateSpan`], [`BehaviorStage`]
//! * [`Diagnostic`], [`Severity`]
//! * [`SourceDocument`], [`Project`], [`GraphMetadata`]
//! * [`Config`], [`AnnotationError`]

mod adapter;
mod annotation;
mod behavior;
mod config;
mod datavalue;
mod diagnostic;
mod error;
mod graph;
mod json;
mod layer;
mod metadata;
mod segmentation;
mod text;
mod textselection;
mod types;

// Our internal crate structure is not very relevant to the outside world,
// expose all structs and traits in the root namespace, and be explicit about it:

pub use adapter::SpanAdapter;
pub use annotation::{FeatureValues, SpanAnnotation, SpanAnnotationHandle};
pub use behavior::{
    default_behaviors, AnchoringModeBehavior, BehaviorStage, CandidateSpan, CrossSentenceBehavior,
    SpanBehavior, StackingBehavior,
};
pub use config::{Config, Configurable};
pub use datavalue::FeatureValue;
pub use diagnostic::{Diagnostic, Severity};
pub use error::{AnnotationError, ErrorKind};
pub use graph::{AnnotationGraph, Checkpoint};
pub use json::{FromJson, ToJson};
pub use layer::{AnchoringMode, FeatureDefinition, FeatureType, LayerConfig};
pub use metadata::{GraphMetadata, Project, SourceDocument};
pub use segmentation::{Segmentation, SegmentationBuilder, SentenceLookup, TokenLookup};
pub use text::{PositionIndex, Text};
pub use textselection::TextSelection;
pub use types::*;

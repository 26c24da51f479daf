/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module defines the [`SpanBehavior`] trait, the pluggable rule units the
//! [`crate::SpanAdapter`] runs when admitting a span (`on_create`) and when auditing a graph
//! (`on_validate`), along with the three behaviors shipped with the library:
//!
//! * [`AnchoringModeBehavior`] - snaps offsets to tokens or sentences
//! * [`CrossSentenceBehavior`] - rejects spans that cover multiple sentences
//! * [`StackingBehavior`] - rejects spans with the exact offsets of an existing one

mod anchoring;
mod crosssentence;
mod stacking;

pub use anchoring::AnchoringModeBehavior;
pub use crosssentence::CrossSentenceBehavior;
pub use stacking::StackingBehavior;

use std::fmt;

use crate::annotation::FeatureValues;
use crate::datavalue::FeatureValue;
use crate::diagnostic::Diagnostic;
use crate::error::AnnotationError;
use crate::graph::AnnotationGraph;
use crate::layer::LayerConfig;
use crate::textselection::TextSelection;

/// Determines where a behavior runs in the creation pipeline. All `Transform` behaviors run
/// before all `Check` behaviors, so checks always see the final offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BehaviorStage {
    /// May adjust the candidate span, never rejects it
    Transform,
    /// May reject the candidate span, never adjusts it
    Check,
}

/// The span that is about to be created, as it passes through the behaviors
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSpan {
    selection: TextSelection,
    features: FeatureValues,
}

impl CandidateSpan {
    pub fn new(begin: usize, end: usize) -> Self {
        Self {
            selection: TextSelection::new(begin, end),
            features: FeatureValues::new(),
        }
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = (String, FeatureValue)>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn begin(&self) -> usize {
        self.selection.begin()
    }

    pub fn end(&self) -> usize {
        self.selection.end()
    }

    pub fn selection(&self) -> TextSelection {
        self.selection
    }

    /// Returns the candidate moved to other offsets
    pub fn with_selection(mut self, selection: TextSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn features(&self) -> &FeatureValues {
        &self.features
    }

    pub(crate) fn into_features(self) -> FeatureValues {
        self.features
    }
}

/// A rule unit that takes part in the creation and validation of span annotations of one layer.
///
/// `on_create` receives the graph mutably and must observe anything earlier behaviors in the same
/// call wrote to it. If a later behavior rejects the span, the adapter undoes everything written
/// during the call (insertions, removals and modified annotations).
///
/// `on_validate` reads the graph and reports violations of the layer's *current* policy. It must
/// not fail and must be deterministic.
pub trait SpanBehavior: fmt::Debug {
    /// A short name, used as the source of diagnostics
    fn name(&self) -> &'static str;

    fn stage(&self) -> BehaviorStage {
        BehaviorStage::Check
    }

    /// Inspects (and possibly transforms) a candidate span. Returns the candidate to pass on, or
    /// an error to reject the creation.
    fn on_create(
        &self,
        layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError>;

    /// Scans all annotations of the layer's type and reports those that violate the policy
    fn on_validate(&self, layer: &LayerConfig, graph: &AnnotationGraph) -> Vec<Diagnostic>;
}

/// Returns the standard behaviors: anchoring, cross-sentence, stacking
pub fn default_behaviors() -> Vec<Box<dyn SpanBehavior>> {
    vec![
        Box::new(AnchoringModeBehavior::new()),
        Box::new(CrossSentenceBehavior::new()),
        Box::new(StackingBehavior::new()),
    ]
}

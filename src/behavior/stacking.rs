/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

use crate::annotation::SpanAnnotation;
use crate::behavior::{CandidateSpan, SpanBehavior};
use crate::diagnostic::Diagnostic;
use crate::error::AnnotationError;
use crate::graph::AnnotationGraph;
use crate::layer::LayerConfig;

/// Enforces the layer's stacking policy: if stacking is not allowed, no two annotations of the
/// layer may have identical offsets.
///
/// Validation reports one error per stacked annotation beyond the first one at a location
/// (in creation order), so two annotations at the same offsets produce exactly one diagnostic,
/// attached to the later one.
#[derive(Debug, Clone, Default)]
pub struct StackingBehavior {}

impl StackingBehavior {
    pub fn new() -> Self {
        Self {}
    }
}

impl SpanBehavior for StackingBehavior {
    fn name(&self) -> &'static str {
        "stacking"
    }

    fn on_create(
        &self,
        layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError> {
        if layer.allow_stacking() {
            return Ok(candidate);
        }
        let existing: Option<&SpanAnnotation> = graph
            .select_at(layer.type_name(), candidate.selection())
            .next();
        if let Some(existing) = existing {
            return Err(AnnotationError::StackingViolation(format!(
                "Cannot create another annotation of layer [{}] at this location - stacking is not enabled for this layer (existing annotation {})",
                layer.ui_name(),
                existing.reference()
            )));
        }
        Ok(candidate)
    }

    fn on_validate(&self, layer: &LayerConfig, graph: &AnnotationGraph) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if layer.allow_stacking() {
            return diagnostics;
        }
        // select() orders by offsets and then creation order, so the first of a run is the original
        let mut first: Option<&SpanAnnotation> = None;
        for annotation in graph.select(layer.type_name()) {
            match first {
                Some(original) if original.textselection() == annotation.textselection() => {
                    diagnostics.push(Diagnostic::error(
                        self.name(),
                        annotation.handle(),
                        format!(
                            "Stacked annotation at [{}-{}] duplicates {}: stacking is not enabled for layer [{}]",
                            annotation.begin(),
                            annotation.end(),
                            original.reference(),
                            layer.ui_name()
                        ),
                    ));
                }
                _ => first = Some(annotation),
            }
        }
        diagnostics
    }
}

/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

use crate::behavior::{BehaviorStage, CandidateSpan, SpanBehavior};
use crate::config::{debug, Configurable};
use crate::diagnostic::Diagnostic;
use crate::error::AnnotationError;
use crate::graph::AnnotationGraph;
use crate::layer::{AnchoringMode, LayerConfig};
use crate::segmentation::{is_aligned_to_units, snap_to_units, SentenceLookup, TokenLookup};
use crate::textselection::TextSelection;

/// Aligns spans to the granularity of the layer's [`AnchoringMode`].
///
/// On creation the candidate is expanded to whole units (tokens or sentences); this never rejects a
/// span. When the document has no units of the required kind, the candidate passes unchanged.
/// On validation, annotations whose offsets are not aligned under the current mode are reported.
#[derive(Debug, Clone, Default)]
pub struct AnchoringModeBehavior {}

impl AnchoringModeBehavior {
    pub fn new() -> Self {
        Self {}
    }

    /// Returns the selection aligned to the units of the mode, or `None` if it stays as it is
    pub fn anchor(
        mode: AnchoringMode,
        graph: &AnnotationGraph,
        selection: TextSelection,
    ) -> Option<TextSelection> {
        match mode {
            AnchoringMode::Characters => None,
            AnchoringMode::SingleToken => graph.token_at(selection.begin()),
            AnchoringMode::Tokens => snap_to_units(graph.tokens(), selection),
            AnchoringMode::Sentences => snap_to_units(graph.sentences(), selection),
        }
    }

    /// Tests whether a selection is aligned under the mode. Selections are considered aligned
    /// when there are no units to align to.
    pub fn is_anchored(mode: AnchoringMode, graph: &AnnotationGraph, selection: &TextSelection) -> bool {
        match mode {
            AnchoringMode::Characters => true,
            AnchoringMode::SingleToken => {
                graph.tokens().is_empty() || graph.tokens().binary_search(selection).is_ok()
            }
            AnchoringMode::Tokens => {
                graph.tokens().is_empty() || is_aligned_to_units(graph.tokens(), selection)
            }
            AnchoringMode::Sentences => {
                graph.sentences().is_empty() || is_aligned_to_units(graph.sentences(), selection)
            }
        }
    }
}

impl SpanBehavior for AnchoringModeBehavior {
    fn name(&self) -> &'static str {
        "anchoring"
    }

    fn stage(&self) -> BehaviorStage {
        BehaviorStage::Transform
    }

    fn on_create(
        &self,
        layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError> {
        match Self::anchor(layer.anchoring_mode(), graph, candidate.selection()) {
            Some(anchored) if anchored != candidate.selection() => {
                debug(graph.config(), || {
                    format!(
                        "AnchoringModeBehavior: anchored {} to {} ({})",
                        candidate.selection(),
                        anchored,
                        layer.anchoring_mode()
                    )
                });
                Ok(candidate.with_selection(anchored))
            }
            _ => Ok(candidate),
        }
    }

    fn on_validate(&self, layer: &LayerConfig, graph: &AnnotationGraph) -> Vec<Diagnostic> {
        let mode = layer.anchoring_mode();
        graph
            .select(layer.type_name())
            .filter(|annotation| !Self::is_anchored(mode, graph, &annotation.textselection()))
            .map(|annotation| {
                Diagnostic::error(
                    self.name(),
                    annotation.handle(),
                    format!(
                        "Annotation {} is not aligned to {} as required by layer [{}]",
                        annotation.reference(),
                        mode,
                        layer.ui_name()
                    ),
                )
            })
            .collect()
    }
}

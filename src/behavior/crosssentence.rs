/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

use crate::behavior::{CandidateSpan, SpanBehavior};
use crate::diagnostic::Diagnostic;
use crate::error::AnnotationError;
use crate::layer::LayerConfig;
use crate::graph::AnnotationGraph;
use crate::segmentation::SentenceLookup;
use crate::textselection::TextSelection;

/// Enforces the layer's cross-sentence policy: if cross-sentence spans are not allowed, the first
/// and the last character of a span must lie in the same sentence.
#[derive(Debug, Clone, Default)]
pub struct CrossSentenceBehavior {}

impl CrossSentenceBehavior {
    pub fn new() -> Self {
        Self {}
    }

    /// Returns the indices of the sentences holding the first and the last character of the
    /// selection if they differ. Zero-width selections never cross.
    fn crossed_sentences(
        sentences: &impl SentenceLookup,
        selection: &TextSelection,
    ) -> Option<(usize, usize)> {
        if selection.is_empty() {
            return None;
        }
        let first = sentences.sentence_containing(selection.begin())?;
        let last = sentences.sentence_containing(selection.end() - 1)?;
        if first != last {
            Some((first, last))
        } else {
            None
        }
    }
}

impl SpanBehavior for CrossSentenceBehavior {
    fn name(&self) -> &'static str {
        "cross-sentence"
    }

    fn on_create(
        &self,
        layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError> {
        if layer.cross_sentence() {
            return Ok(candidate);
        }
        if Self::crossed_sentences(&*graph, &candidate.selection()).is_some() {
            return Err(AnnotationError::CrossSentenceViolation(
                "Annotation covers multiple sentences, limit your annotation to single sentence!"
                    .to_string(),
            ));
        }
        Ok(candidate)
    }

    fn on_validate(&self, layer: &LayerConfig, graph: &AnnotationGraph) -> Vec<Diagnostic> {
        if layer.cross_sentence() {
            return Vec::new();
        }
        graph
            .select(layer.type_name())
            .filter_map(|annotation| {
                Self::crossed_sentences(graph, &annotation.textselection()).map(|(first, last)| {
                    Diagnostic::error(
                        self.name(),
                        annotation.handle(),
                        format!(
                            "Annotation {} covers multiple sentences ({} to {}) but layer [{}] does not allow cross-sentence annotations",
                            annotation.reference(),
                            first + 1,
                            last + 1,
                            layer.ui_name()
                        ),
                    )
                })
            })
            .collect()
    }
}

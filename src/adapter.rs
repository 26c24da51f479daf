/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`SpanAdapter`], the single entry point for admitting span
//! annotations of one layer into a graph and for auditing a graph against the layer's policy.

use chrono::Utc;

use crate::annotation::SpanAnnotation;
use crate::behavior::{CandidateSpan, SpanBehavior};
use crate::config::{debug, Config, Configurable};
use crate::datavalue::FeatureValue;
use crate::diagnostic::Diagnostic;
use crate::error::AnnotationError;
use crate::graph::AnnotationGraph;
use crate::layer::LayerConfig;
use crate::metadata::SourceDocument;
use crate::textselection::TextSelection;

/// Creates and validates span annotations of one layer by running an ordered list of
/// [`SpanBehavior`]s.
///
/// The adapter holds the layer configuration and the behaviors; the graph is passed to each call
/// and borrowed exclusively for its duration.
///
/// ```
/// use annolayer::*;
///
/// let mut graph = AnnotationGraph::new("This is a test .")
///     .with_segmentation(SegmentationBuilder::whitespace())?;
/// let adapter = SpanAdapter::new(
///     LayerConfig::new("NamedEntity").with_allow_stacking(false),
///     default_behaviors(),
/// );
/// let document = SourceDocument::new(1, "test.txt", Project::new(1, "test"));
/// let annotation = adapter.add(&document, "user", &mut graph, 0, 1, vec![])?;
/// assert_eq!((annotation.begin(), annotation.end()), (0, 4));
/// # Ok::<(), AnnotationError>(())
/// ```
#[derive(Debug)]
pub struct SpanAdapter {
    layer: LayerConfig,
    behaviors: Vec<Box<dyn SpanBehavior>>,
    config: Config,
}

impl SpanAdapter {
    /// Creates an adapter for a layer. Behaviors run in the given order, except that all behaviors
    /// in the [`crate::BehaviorStage::Transform`] stage are moved (stably) ahead of the checks.
    pub fn new(layer: LayerConfig, mut behaviors: Vec<Box<dyn SpanBehavior>>) -> Self {
        behaviors.sort_by_key(|behavior| behavior.stage());
        Self {
            layer,
            behaviors,
            config: Config::default(),
        }
    }

    pub fn layer(&self) -> &LayerConfig {
        &self.layer
    }

    /// Gives mutable access to the layer policy, for when project administration changes it
    pub fn layer_mut(&mut self) -> &mut LayerConfig {
        &mut self.layer
    }

    /// The behaviors in the order they run
    pub fn behaviors(&self) -> impl Iterator<Item = &dyn SpanBehavior> {
        self.behaviors.iter().map(|b| b.as_ref() as &dyn SpanBehavior)
    }

    /// Creates a span annotation of this layer at the given offsets.
    ///
    /// The request is checked against the document bounds and the feature values against the
    /// layer's feature schema, then every behavior gets to transform or reject the candidate span
    /// in turn. On success exactly one annotation is added to the graph and returned. On failure
    /// the graph is left as it was.
    ///
    /// The `actor` is recorded on the annotation for auditing, it is not used for enforcement.
    pub fn add<'g>(
        &self,
        document: &SourceDocument,
        actor: &str,
        graph: &'g mut AnnotationGraph,
        begin: usize,
        end: usize,
        features: Vec<(String, FeatureValue)>,
    ) -> Result<&'g SpanAnnotation, AnnotationError> {
        let length = graph.document_length();
        if !TextSelection::new(begin, end).within_bounds(length) {
            return Err(AnnotationError::BoundsViolation { begin, end, length });
        }
        let features = self.layer.resolve_features(features, &self.config)?;
        debug(&self.config, || {
            format!(
                "SpanAdapter.add: layer={} document={}({}) actor={} [{}-{}]",
                self.layer.type_name(),
                document.name,
                document.id,
                actor,
                begin,
                end
            )
        });

        let checkpoint = graph.checkpoint();
        let mut candidate = CandidateSpan::new(begin, end).with_features(features);
        for behavior in self.behaviors.iter() {
            candidate = match behavior.on_create(&self.layer, graph, candidate) {
                Ok(candidate) => candidate,
                Err(err) => {
                    graph.rollback(checkpoint);
                    tracing::info!(
                        layer = self.layer.type_name(),
                        behavior = behavior.name(),
                        actor,
                        document_id = document.id,
                        begin,
                        end,
                        "rejected span creation: {}",
                        err
                    );
                    return Err(err);
                }
            };
        }

        let selection = candidate.selection();
        let mut annotation = graph
            .create_annotation(self.layer.type_name(), selection.begin(), selection.end())
            .with_creator(actor, Utc::now());
        for (name, value) in candidate.into_features() {
            annotation.set_feature(name, value);
        }
        let handle = match graph.add_to_index(annotation) {
            Ok(handle) => handle,
            Err(err) => {
                graph.rollback(checkpoint);
                return Err(err);
            }
        };
        graph.commit(checkpoint);
        graph.get(handle)
    }

    /// Validates all annotations of this layer in the graph against the layer's current policy.
    ///
    /// Each behavior reports its findings in turn; violations are returned as diagnostics, this
    /// never fails and never modifies the graph. Calling it twice on an unchanged graph yields the
    /// same result.
    pub fn validate(&self, graph: &AnnotationGraph) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for behavior in self.behaviors.iter() {
            let found = behavior.on_validate(&self.layer, graph);
            debug(&self.config, || {
                format!(
                    "SpanAdapter.validate: layer={} behavior={} found {} problem(s)",
                    self.layer.type_name(),
                    behavior.name(),
                    found.len()
                )
            });
            diagnostics.extend(found);
        }
        diagnostics
    }
}

impl Configurable for SpanAdapter {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }
}

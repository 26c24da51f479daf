use annolayer::*;

mod common;
use common::*;

#[test]
fn stacking_not_allowed() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_allow_stacking(false));

    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    let result = adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![]);

    match result {
        Err(err) => {
            assert_eq!(err.kind(), ErrorKind::StackingViolation);
            assert!(err.is_policy_violation());
            assert!(format!("{}", err).contains("stacking is not enabled"));
        }
        Ok(_) => panic!("second annotation at the same offsets should have been rejected"),
    }
    assert_eq!(graph.count(NE_TYPE), 1);
    Ok(())
}

#[test]
fn stacking_allowed() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_allow_stacking(true));

    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;

    assert_eq!(graph.count(NE_TYPE), 2);
    assert_eq!(offsets(&graph, NE_TYPE), vec![(0, 4), (0, 4)]);
    Ok(())
}

#[test]
fn stacking_other_layers_do_not_count() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let ne = setup_adapter(setup_ne_layer().with_allow_stacking(false));
    let pos = setup_adapter(LayerConfig::new("POS").with_allow_stacking(false));

    ne.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    pos.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;

    assert_eq!(graph.count(NE_TYPE), 1);
    assert_eq!(graph.count("POS"), 1);
    assert_eq!(graph.len(), 2);
    Ok(())
}

#[test]
fn stacking_checked_after_anchoring() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_allow_stacking(false));

    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    // [1-3] lies within the token "This" and is anchored to [0-4] before the stacking check
    let result = adapter.add(&document, USERNAME, &mut graph, 1, 3, vec![]);
    assert!(matches!(result, Err(AnnotationError::StackingViolation(_))));
    assert_eq!(graph.count(NE_TYPE), 1);
    Ok(())
}

#[test]
fn stacking_after_snapping_single_character() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(
        setup_ne_layer()
            .with_allow_stacking(false)
            .with_anchoring_mode(AnchoringMode::Tokens),
    );

    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    // "T" snaps to "This", which is already annotated
    let result = adapter.add(&document, USERNAME, &mut graph, 0, 1, vec![]);
    match result {
        Err(err) => assert_eq!(err.kind(), ErrorKind::StackingViolation),
        Ok(_) => panic!("[0-1] snaps onto the existing annotation and should have been rejected"),
    }
    assert_eq!(offsets(&graph, NE_TYPE), vec![(0, 4)]);
    Ok(())
}

#[test]
fn behaviors_run_transforms_first() {
    let adapter = setup_adapter(setup_ne_layer());
    let names: Vec<&str> = adapter.behaviors().map(|b| b.name()).collect();
    assert_eq!(names, vec!["anchoring", "stacking", "cross-sentence"]);
}

#[test]
fn cross_sentence_not_allowed() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(TWO_SENTENCES)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_cross_sentence(false));

    let length = graph.document_length();
    let result = adapter.add(&document, USERNAME, &mut graph, 0, length, vec![]);
    match result {
        Err(err) => {
            assert_eq!(err.kind(), ErrorKind::CrossSentenceViolation);
            assert!(format!("{}", err).contains("covers multiple sentences"));
        }
        Ok(_) => panic!("annotation over two sentences should have been rejected"),
    }
    assert!(graph.is_empty());
    Ok(())
}

#[test]
fn cross_sentence_within_one_sentence() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(TWO_SENTENCES)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_cross_sentence(false));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 17, 33, vec![])?;
    assert_eq!(annotation.textselection(), TextSelection::new(17, 33));
    let handle = annotation.handle().expect("annotation must be bound");
    assert_eq!(graph.text_of(handle)?, "This is sentence");
    Ok(())
}

#[test]
fn cross_sentence_allowed() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(TWO_SENTENCES)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_cross_sentence(true));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 0, 39, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (0, 39));
    Ok(())
}

#[test]
fn anchoring_tokens() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_anchoring_mode(AnchoringMode::Tokens));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 0, 1, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (0, 4));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 2, 6, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (0, 7));
    let handle = annotation.handle().expect("annotation must be bound");
    assert_eq!(graph.text_of(handle)?, "This is");
    Ok(())
}

#[test]
fn anchoring_tokens_trailing_whitespace() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(TWO_SENTENCES)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_cross_sentence(false));

    // the space after "This" does not pull in the next token
    let annotation = adapter.add(&document, USERNAME, &mut graph, 0, 5, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (0, 4));

    // "test .\n" ends right where the second sentence begins, but selects nothing of it
    let annotation = adapter.add(&document, USERNAME, &mut graph, 10, 17, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (10, 16));
    Ok(())
}

#[test]
fn anchoring_single_token() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter =
        setup_adapter(setup_ne_layer().with_anchoring_mode(AnchoringMode::SingleToken));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 5, 14, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (5, 7));
    Ok(())
}

#[test]
fn anchoring_sentences() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(TWO_SENTENCES)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_anchoring_mode(AnchoringMode::Sentences));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 5, 7, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (0, 16));
    let annotation = adapter.add(&document, USERNAME, &mut graph, 20, 21, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (17, 39));
    Ok(())
}

#[test]
fn anchoring_characters() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_anchoring_mode(AnchoringMode::Characters));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 1, 3, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (1, 3));
    Ok(())
}

#[test]
fn anchoring_without_segmentation() -> Result<(), AnnotationError> {
    let mut graph = AnnotationGraph::new(ONE_SENTENCE);
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer().with_cross_sentence(false));

    let annotation = adapter.add(&document, USERNAME, &mut graph, 1, 3, vec![])?;
    assert_eq!((annotation.begin(), annotation.end()), (1, 3));
    Ok(())
}

#[test]
fn out_of_bounds() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer());

    let result = adapter.add(&document, USERNAME, &mut graph, 0, 17, vec![]);
    assert!(matches!(
        result,
        Err(AnnotationError::BoundsViolation {
            begin: 0,
            end: 17,
            length: 16
        })
    ));
    let result = adapter.add(&document, USERNAME, &mut graph, 5, 3, vec![]);
    assert!(matches!(result, Err(AnnotationError::BoundsViolation { .. })));
    assert!(graph.is_empty());
    Ok(())
}

#[test]
fn features_and_defaults() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let layer = LayerConfig::new(NE_TYPE)
        .with_ui_name("NE")
        .with_feature(FeatureDefinition::new("value", FeatureType::String))
        .with_feature(
            FeatureDefinition::new("identifier", FeatureType::String).with_default("none"),
        );
    let adapter = setup_adapter(layer);

    let annotation = adapter.add(
        &document,
        USERNAME,
        &mut graph,
        0,
        4,
        vec![("value".to_string(), "PER".into())],
    )?;
    assert_eq!(annotation.feature("value"), Some(&FeatureValue::from("PER")));
    assert_eq!(annotation.feature("identifier"), Some(&FeatureValue::from("none")));
    assert_eq!(annotation.features().count(), 2);
    Ok(())
}

#[test]
fn features_rejected() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer());

    let result = adapter.add(
        &document,
        USERNAME,
        &mut graph,
        0,
        4,
        vec![("value".to_string(), FeatureValue::Int(1))],
    );
    assert!(matches!(
        result,
        Err(AnnotationError::FeatureTypeMismatch { .. })
    ));

    let result = adapter.add(
        &document,
        USERNAME,
        &mut graph,
        0,
        4,
        vec![("nonexistent".to_string(), "x".into())],
    );
    assert!(matches!(result, Err(AnnotationError::UnknownFeature(..))));
    assert!(graph.is_empty());
    Ok(())
}

#[test]
fn features_lenient() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let mut adapter = setup_adapter(setup_ne_layer());
    adapter.set_config(Config::default().with_strict_features(false));

    let annotation = adapter.add(
        &document,
        USERNAME,
        &mut graph,
        0,
        4,
        vec![("nonexistent".to_string(), "x".into())],
    )?;
    assert_eq!(annotation.feature("nonexistent"), None);
    Ok(())
}

#[test]
fn audit_fields() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer());

    let annotation = adapter.add(&document, "alice", &mut graph, 0, 4, vec![])?;
    assert_eq!(annotation.created_by(), Some("alice"));
    assert!(annotation.created().is_some());
    assert_eq!(annotation.type_name(), NE_TYPE);
    Ok(())
}

#[test]
fn generated_ids() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    graph.set_config(Config::default().with_generate_ids(true));
    let document = setup_document();
    let adapter = setup_adapter(setup_ne_layer());

    let id = adapter
        .add(&document, USERNAME, &mut graph, 0, 4, vec![])?
        .id()
        .map(|id| id.to_string())
        .expect("id must be generated");
    assert!(id.starts_with('S'));
    assert_eq!(graph.annotation(&id)?.textselection(), TextSelection::new(0, 4));
    Ok(())
}

/// Writes a marker annotation at the candidate's offsets
#[derive(Debug)]
struct MarkerBehavior;

impl SpanBehavior for MarkerBehavior {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn stage(&self) -> BehaviorStage {
        BehaviorStage::Transform
    }

    fn on_create(
        &self,
        _layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError> {
        let marker = graph.create_annotation("Marker", candidate.begin(), candidate.end());
        graph.add_to_index(marker)?;
        Ok(candidate)
    }

    fn on_validate(&self, _layer: &LayerConfig, _graph: &AnnotationGraph) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Rejects the candidate unless a marker was written at its offsets earlier in the same call
#[derive(Debug)]
struct RequireMarkerBehavior;

impl SpanBehavior for RequireMarkerBehavior {
    fn name(&self) -> &'static str {
        "require-marker"
    }

    fn on_create(
        &self,
        _layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError> {
        if graph
            .select_at("Marker", candidate.selection())
            .next()
            .is_none()
        {
            return Err(AnnotationError::HandleError("no marker found"));
        }
        Ok(candidate)
    }

    fn on_validate(&self, _layer: &LayerConfig, _graph: &AnnotationGraph) -> Vec<Diagnostic> {
        Vec::new()
    }
}

#[test]
fn behaviors_observe_earlier_writes() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = SpanAdapter::new(
        setup_ne_layer(),
        vec![Box::new(RequireMarkerBehavior), Box::new(MarkerBehavior)],
    );

    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    assert_eq!(graph.count("Marker"), 1);
    assert_eq!(graph.count(NE_TYPE), 1);
    Ok(())
}

#[test]
fn rejection_rolls_back_earlier_writes() -> Result<(), AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    let document = setup_document();
    let adapter = SpanAdapter::new(
        setup_ne_layer().with_allow_stacking(false),
        vec![
            Box::new(StackingBehavior::new()),
            Box::new(AnchoringModeBehavior::new()),
            Box::new(MarkerBehavior),
        ],
    );

    adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![])?;
    assert_eq!(graph.count("Marker"), 1);

    let result = adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![]);
    assert!(result.is_err());
    assert_eq!(graph.count("Marker"), 1);
    assert_eq!(graph.count(NE_TYPE), 1);
    assert_eq!(graph.len(), 2);
    Ok(())
}

/// Removes the first "Other" annotation and marks all remaining ones
#[derive(Debug)]
struct PruneBehavior;

impl SpanBehavior for PruneBehavior {
    fn name(&self) -> &'static str {
        "prune"
    }

    fn stage(&self) -> BehaviorStage {
        BehaviorStage::Transform
    }

    fn on_create(
        &self,
        _layer: &LayerConfig,
        graph: &mut AnnotationGraph,
        candidate: CandidateSpan,
    ) -> Result<CandidateSpan, AnnotationError> {
        let handles: Vec<SpanAnnotationHandle> =
            graph.select("Other").filter_map(|a| a.handle()).collect();
        if let Some((first, rest)) = handles.split_first() {
            graph.remove(*first)?;
            for handle in rest {
                graph.get_mut(*handle)?.set_feature("checked", true);
            }
        }
        Ok(candidate)
    }

    fn on_validate(&self, _layer: &LayerConfig, _graph: &AnnotationGraph) -> Vec<Diagnostic> {
        Vec::new()
    }
}

fn setup_prune_graph() -> Result<AnnotationGraph, AnnotationError> {
    let mut graph = setup_graph(ONE_SENTENCE)?;
    graph.add_to_index(SpanAnnotation::new("Other", 0, 4).with_id("O1"))?;
    graph.add_to_index(SpanAnnotation::new("Other", 5, 7).with_id("O2"))?;
    graph.add_to_index(SpanAnnotation::new(NE_TYPE, 0, 4))?;
    Ok(graph)
}

#[test]
fn rejection_restores_removed_and_modified() -> Result<(), AnnotationError> {
    let mut graph = setup_prune_graph()?;
    let document = setup_document();
    let adapter = SpanAdapter::new(
        setup_ne_layer().with_allow_stacking(false),
        vec![Box::new(StackingBehavior::new()), Box::new(PruneBehavior)],
    );
    let before: Vec<Option<SpanAnnotationHandle>> =
        graph.select("Other").map(|a| a.handle()).collect();

    let result = adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![]);
    assert!(matches!(result, Err(AnnotationError::StackingViolation(_))));

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.count("Other"), 2);
    assert_eq!(offsets(&graph, "Other"), vec![(0, 4), (5, 7)]);
    let after: Vec<Option<SpanAnnotationHandle>> =
        graph.select("Other").map(|a| a.handle()).collect();
    assert_eq!(before, after);
    assert_eq!(graph.annotation("O1")?.textselection(), TextSelection::new(0, 4));
    assert_eq!(graph.annotation("O2")?.feature("checked"), None);
    Ok(())
}

#[test]
fn success_keeps_removed_and_modified() -> Result<(), AnnotationError> {
    let mut graph = setup_prune_graph()?;
    let document = setup_document();
    let adapter = SpanAdapter::new(
        setup_ne_layer().with_allow_stacking(false),
        vec![Box::new(StackingBehavior::new()), Box::new(PruneBehavior)],
    );

    adapter.add(&document, USERNAME, &mut graph, 5, 7, vec![])?;

    assert_eq!(graph.count("Other"), 1);
    assert!(graph.annotation("O1").is_err());
    assert_eq!(
        graph.annotation("O2")?.feature("checked"),
        Some(&FeatureValue::Bool(true))
    );
    assert_eq!(graph.count(NE_TYPE), 2);
    Ok(())
}

#[test]
fn debug_logging() -> Result<(), AnnotationError> {
    init_logging();
    let mut graph = setup_graph(ONE_SENTENCE)?;
    graph.set_config(Config::default().with_debug(true));
    let document = setup_document();
    let mut adapter = setup_adapter(setup_ne_layer().with_allow_stacking(false));
    adapter.set_config(Config::default().with_debug(true));

    adapter.add(&document, USERNAME, &mut graph, 1, 2, vec![])?;
    assert!(adapter.add(&document, USERNAME, &mut graph, 0, 4, vec![]).is_err());
    assert!(adapter.validate(&graph).is_empty());
    Ok(())
}

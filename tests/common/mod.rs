#![allow(dead_code)]
use annolayer::*;

pub const USERNAME: &str = "user";

pub const ONE_SENTENCE: &str = "This is a test .";
pub const TWO_SENTENCES: &str = "This is a test .\nThis is sentence two .";

pub const NE_TYPE: &str = "de.tudarmstadt.ukp.dkpro.core.api.ner.type.NamedEntity";

pub fn setup_graph(text: &str) -> Result<AnnotationGraph, AnnotationError> {
    AnnotationGraph::new(text).with_segmentation(SegmentationBuilder::whitespace())
}

pub fn setup_document() -> SourceDocument {
    SourceDocument::new(1, "test.txt", Project::new(1, "project"))
}

/// The named entity layer: stacking and cross-sentence spans allowed, anchored to tokens
pub fn setup_ne_layer() -> LayerConfig {
    LayerConfig::new(NE_TYPE)
        .with_ui_name("NE")
        .with_allow_stacking(true)
        .with_cross_sentence(true)
        .with_anchoring_mode(AnchoringMode::Tokens)
        .with_feature(FeatureDefinition::new("value", FeatureType::String))
        .with_feature(FeatureDefinition::new("identifier", FeatureType::String))
}

/// All three behaviors, with anchoring deliberately listed last
pub fn setup_behaviors() -> Vec<Box<dyn SpanBehavior>> {
    vec![
        Box::new(StackingBehavior::new()),
        Box::new(CrossSentenceBehavior::new()),
        Box::new(AnchoringModeBehavior::new()),
    ]
}

pub fn setup_adapter(layer: LayerConfig) -> SpanAdapter {
    SpanAdapter::new(layer, setup_behaviors())
}

/// Returns (begin, end) of all annotations of a type, in offset order
pub fn offsets(graph: &AnnotationGraph, type_name: &str) -> Vec<(usize, usize)> {
    graph
        .select(type_name)
        .map(|annotation| (annotation.begin(), annotation.end()))
        .collect()
}

/// Routes tracing output to the test harness, filtered by `RUST_LOG`
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

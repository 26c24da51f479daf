/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`LayerConfig`], the policy record of a single span layer, along with
//! its [`AnchoringMode`] and feature schema ([`FeatureDefinition`]).

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::datavalue::FeatureValue;
use crate::error::AnnotationError;
use crate::json::*;
use crate::types::*;

/// The granularity at which the offsets of a span must align.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchoringMode {
    /// Offsets are taken as given, any character range is allowed
    Characters,
    /// The span covers exactly one token
    SingleToken,
    /// The span covers one or more whole tokens
    Tokens,
    /// The span covers one or more whole sentences
    Sentences,
}

impl Default for AnchoringMode {
    fn default() -> Self {
        Self::Tokens
    }
}

impl fmt::Display for AnchoringMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Characters => "characters",
            Self::SingleToken => "single token",
            Self::Tokens => "tokens",
            Self::Sentences => "sentences",
        };
        write!(f, "{}", s)
    }
}

/// The value type a feature accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum FeatureType {
    String,
    Bool,
    Int,
    Float,
    StringList,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::StringList => "StringList",
        }
    }
}

/// Defines one feature of a layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDefinition {
    name: String,
    #[serde(default)]
    ui_name: Option<String>,
    #[serde(rename = "type")]
    feature_type: FeatureType,
    /// Value assigned at creation time when the caller supplies none
    #[serde(default)]
    default_value: Option<FeatureValue>,
}

impl FeatureDefinition {
    pub fn new(name: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            name: name.into(),
            ui_name: None,
            feature_type,
            default_value: None,
        }
    }

    pub fn with_ui_name(mut self, ui_name: impl Into<String>) -> Self {
        self.ui_name = Some(ui_name.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<FeatureValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Human readable name, falls back to the name
    pub fn ui_name(&self) -> &str {
        self.ui_name.as_deref().unwrap_or(self.name.as_str())
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn default_value(&self) -> Option<&FeatureValue> {
        self.default_value.as_ref()
    }
}

/// Describes the policy of one span layer (annotation type). Annotations in the graph refer to a
/// layer by its [`LayerConfig::type_name()`].
///
/// A layer is read-only during annotation, but project administration may change its policy
/// between sessions; use [`crate::SpanAdapter::validate()`] to find annotations that no longer comply.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// The annotation type this layer configures
    #[serde(rename = "type")]
    type_name: String,

    #[serde(default)]
    ui_name: Option<String>,

    #[serde(default = "default_true")]
    allow_stacking: bool,

    #[serde(default = "default_true")]
    cross_sentence: bool,

    #[serde(default)]
    anchoring_mode: AnchoringMode,

    #[serde(default)]
    features: Vec<FeatureDefinition>,
}

fn default_true() -> bool {
    true
}

impl LayerConfig {
    /// Creates a new layer configuration for the given type. Stacking and cross-sentence spans are
    /// allowed and spans are anchored to tokens unless configured otherwise.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ui_name: None,
            allow_stacking: true,
            cross_sentence: true,
            anchoring_mode: AnchoringMode::default(),
            features: Vec::new(),
        }
    }

    pub fn with_ui_name(mut self, ui_name: impl Into<String>) -> Self {
        self.ui_name = Some(ui_name.into());
        self
    }

    pub fn with_allow_stacking(mut self, value: bool) -> Self {
        self.allow_stacking = value;
        self
    }

    pub fn with_cross_sentence(mut self, value: bool) -> Self {
        self.cross_sentence = value;
        self
    }

    pub fn with_anchoring_mode(mut self, mode: AnchoringMode) -> Self {
        self.anchoring_mode = mode;
        self
    }

    pub fn with_feature(mut self, feature: FeatureDefinition) -> Self {
        self.features.push(feature);
        self
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    /// Human readable name, falls back to the type name
    pub fn ui_name(&self) -> &str {
        self.ui_name.as_deref().unwrap_or(self.type_name.as_str())
    }

    pub fn allow_stacking(&self) -> bool {
        self.allow_stacking
    }

    pub fn set_allow_stacking(&mut self, value: bool) -> &mut Self {
        self.allow_stacking = value;
        self
    }

    pub fn cross_sentence(&self) -> bool {
        self.cross_sentence
    }

    pub fn set_cross_sentence(&mut self, value: bool) -> &mut Self {
        self.cross_sentence = value;
        self
    }

    pub fn anchoring_mode(&self) -> AnchoringMode {
        self.anchoring_mode
    }

    pub fn set_anchoring_mode(&mut self, mode: AnchoringMode) -> &mut Self {
        self.anchoring_mode = mode;
        self
    }

    /// The feature schema, in definition order
    pub fn features(&self) -> &[FeatureDefinition] {
        &self.features
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureDefinition> {
        self.features.iter().find(|f| f.name() == name)
    }

    /// Checks a set of feature values against the schema and fills in defaults for features that
    /// were not supplied. Values for unknown features are an error if `config.strict_features()`,
    /// otherwise they are dropped.
    pub fn resolve_features(
        &self,
        values: Vec<(String, FeatureValue)>,
        config: &Config,
    ) -> Result<Vec<(String, FeatureValue)>, AnnotationError> {
        let mut resolved: Vec<(String, FeatureValue)> = Vec::with_capacity(self.features.len());
        for (name, value) in values {
            match self.feature(&name) {
                Some(definition) => {
                    if !value.conforms_to(definition.feature_type()) {
                        return Err(AnnotationError::FeatureTypeMismatch {
                            feature: name,
                            expected: definition.feature_type().as_str(),
                            found: value.type_name(),
                        });
                    }
                    if let Some(existing) = resolved.iter_mut().find(|(n, _)| *n == name) {
                        existing.1 = value;
                    } else {
                        resolved.push((name, value));
                    }
                }
                None if config.strict_features() => {
                    return Err(AnnotationError::UnknownFeature(
                        name,
                        "resolving feature values for a new annotation",
                    ));
                }
                None => {
                    tracing::warn!(
                        layer = self.type_name.as_str(),
                        feature = name.as_str(),
                        "dropping value for undefined feature"
                    );
                }
            }
        }
        for definition in self.features.iter() {
            if let Some(default) = definition.default_value() {
                if !resolved.iter().any(|(n, _)| n == definition.name()) {
                    resolved.push((definition.name().to_string(), default.clone()));
                }
            }
        }
        Ok(resolved)
    }
}

#[sealed]
impl TypeInfo for LayerConfig {
    fn typeinfo() -> Type {
        Type::LayerConfig
    }
}

impl ToJson for LayerConfig {}

impl FromJson for LayerConfig {
    fn from_json_file(filename: &str, config: &Config) -> Result<Self, AnnotationError> {
        let reader = open_file_reader(filename, config)?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            AnnotationError::JsonError(e, filename.to_string(), "Reading layer from file")
        })
    }

    fn from_json_str(string: &str) -> Result<Self, AnnotationError> {
        let deserializer = &mut serde_json::Deserializer::from_str(string);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            AnnotationError::JsonError(e, string.to_string(), "Reading layer from string")
        })
    }
}

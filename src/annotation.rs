/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`SpanAnnotation`], an annotation anchored to a contiguous character
//! range of the document, and its handle.

use chrono::{DateTime, Utc};
use sealed::sealed;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::datavalue::FeatureValue;
use crate::error::AnnotationError;
use crate::json::ToJson;
use crate::textselection::TextSelection;
use crate::types::*;

/// Feature values of one annotation, in the order they were assigned
pub type FeatureValues = SmallVec<[(String, FeatureValue); 4]>;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanAnnotationHandle(u32);

#[sealed]
impl Handle for SpanAnnotationHandle {
    fn new(intid: usize) -> Self {
        Self(intid as u32)
    }
    fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl SpanAnnotationHandle {
    /// Creates a handle for an index in the store, fails if the index does not fit in a handle
    pub(crate) fn try_new(intid: usize) -> Result<Self, AnnotationError> {
        u32::try_from(intid)
            .map(Self)
            .map_err(|_| AnnotationError::HandleError("Annotation store is full, no handles left"))
    }
}

/// `SpanAnnotation` is an entry in the [`crate::AnnotationGraph`]. It has a type (referring to a
/// [`crate::LayerConfig`]), a half-open range of character offsets, and feature values.
///
/// Annotations are created unbound via [`crate::AnnotationGraph::create_annotation()`] and only
/// obtain a handle once added to the graph's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanAnnotation {
    /// Internal numeric ID, corresponds with the index in the graph's store. `None` while unbound.
    #[serde(skip)]
    pub(crate) intid: Option<SpanAnnotationHandle>,

    /// Public identifier (optional)
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,

    #[serde(rename = "type")]
    pub(crate) type_name: String,

    pub(crate) begin: usize,
    pub(crate) end: usize,

    pub(crate) features: FeatureValues,

    /// The user on whose behalf the annotation was created (audit only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) created_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) created: Option<DateTime<Utc>>,
}

impl SpanAnnotation {
    /// Creates a new unbound annotation. No validation is done here, the graph checks offsets
    /// when the annotation is added to its index.
    pub fn new(type_name: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            intid: None,
            id: None,
            type_name: type_name.into(),
            begin,
            end,
            features: FeatureValues::new(),
            created_by: None,
            created: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.set_feature(name, value);
        self
    }

    pub fn with_creator(mut self, actor: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        self.created_by = Some(actor.into());
        self.created = Some(timestamp);
        self
    }

    /// Returns the handle, or `None` if the annotation is not bound to a graph yet
    pub fn handle(&self) -> Option<SpanAnnotationHandle> {
        self.intid
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    /// Begin offset (unicode points)
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// End offset (non-inclusive, unicode points)
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn textselection(&self) -> TextSelection {
        TextSelection::new(self.begin, self.end)
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Sets a feature value, replacing any previous value for the same feature
    pub fn set_feature(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.features.iter_mut().find(|(k, _)| *k == name) {
            existing.1 = value;
        } else {
            self.features.push((name, value));
        }
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// A short human readable reference to this annotation, used in messages
    pub fn reference(&self) -> String {
        match (&self.id, self.intid) {
            (Some(id), _) => format!("{} [{}-{}]", id, self.begin, self.end),
            (None, Some(handle)) => format!("#{} [{}-{}]", handle.as_usize(), self.begin, self.end),
            (None, None) => format!("[{}-{}]", self.begin, self.end),
        }
    }
}

#[sealed]
impl TypeInfo for SpanAnnotation {
    fn typeinfo() -> Type {
        Type::SpanAnnotation
    }
}

impl ToJson for SpanAnnotation {}

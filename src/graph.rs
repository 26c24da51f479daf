/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`AnnotationGraph`], the in-memory structure that holds a document's
//! text, its segmentation, and all span annotations over it.

use nanoid::nanoid;
use sealed::sealed;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::collections::HashMap;

use crate::annotation::{SpanAnnotation, SpanAnnotationHandle};
use crate::config::{debug, Config, Configurable};
use crate::error::AnnotationError;
use crate::json::ToJson;
use crate::metadata::GraphMetadata;
use crate::segmentation::{Segmentation, SegmentationBuilder, SentenceLookup, TokenLookup};
use crate::text::{PositionIndex, Text};
use crate::textselection::TextSelection;
use crate::types::*;

/// An `AnnotationGraph` holds the text of one document, the token/sentence segmentation of that
/// text, and the span annotations of all layers. Annotations are indexed by type.
///
/// A graph is scoped to a single editing session (one document, one user) and is not meant to be
/// mutated from multiple threads; callers that need that must serialise access themselves.
#[derive(Debug)]
pub struct AnnotationGraph {
    text: String,
    positions: PositionIndex,
    segmentation: Segmentation,

    annotations: Store<SpanAnnotation>,

    /// Maps type names to the annotations of that type (in insertion order)
    type_index: HashMap<String, Vec<SpanAnnotationHandle>>,

    /// Maps public identifiers to annotations
    idmap: HashMap<String, SpanAnnotationHandle>,

    pub(crate) metadata: Option<GraphMetadata>,

    /// Undo records for removals and modifications while a checkpoint is open
    journal: Vec<JournalEntry>,
    open_checkpoints: usize,

    config: Config,
}

/// Marks a point in the history of a graph that it can be rolled back to with
/// [`AnnotationGraph::rollback()`], or released with [`AnnotationGraph::commit()`].
/// Insertions, removals and mutable access to annotations after the checkpoint are all undone by a rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    annotations_len: usize,
    journal_len: usize,
}

#[derive(Debug, Clone)]
enum JournalEntry {
    /// An annotation was removed, `position` is its index in the type index at that time
    Removed {
        handle: SpanAnnotationHandle,
        position: usize,
        annotation: SpanAnnotation,
    },
    /// An annotation was handed out mutably, this is its state before
    Modified {
        handle: SpanAnnotationHandle,
        annotation: SpanAnnotation,
    },
}

impl AnnotationGraph {
    /// Creates a new graph for a text, without segmentation
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            positions: PositionIndex::new(&text),
            text,
            segmentation: Segmentation::new(),
            annotations: Store::new(),
            type_index: HashMap::new(),
            idmap: HashMap::new(),
            metadata: None,
            journal: Vec::new(),
            open_checkpoints: 0,
            config: Config::default(),
        }
    }

    /// Builds the segmentation for this graph's text and associates it. Builder pattern.
    pub fn with_segmentation(mut self, builder: SegmentationBuilder) -> Result<Self, AnnotationError> {
        self.set_segmentation(builder)?;
        Ok(self)
    }

    /// Builds the segmentation for this graph's text and associates it, replacing any existing one.
    pub fn set_segmentation(&mut self, builder: SegmentationBuilder) -> Result<&mut Self, AnnotationError> {
        self.segmentation = builder.build(&self.text)?;
        debug(&self.config, || {
            format!(
                "AnnotationGraph.set_segmentation: {} tokens, {} sentences",
                self.segmentation.tokens().len(),
                self.segmentation.sentences().len()
            )
        });
        Ok(self)
    }

    pub fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    /// Length of the document in unicode points
    pub fn document_length(&self) -> usize {
        self.positions.charlen()
    }

    /// Returns the SHA-1 checksum of the document text (lowercase hex).
    /// Note that this is cryptographically insecure! (but fast)
    pub fn text_checksum(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.text.as_bytes());
        base16ct::lower::encode_string(&hasher.finalize())
    }

    /// Creates a new, unbound, annotation of the given type. It is not part of the graph until
    /// passed to [`Self::add_to_index()`].
    pub fn create_annotation(&self, type_name: &str, begin: usize, end: usize) -> SpanAnnotation {
        SpanAnnotation::new(type_name, begin, end)
    }

    /// Adds an annotation to the graph and its indices, binding it. Fails if the offsets are out
    /// of bounds, if the annotation is already bound, or if its public identifier is taken.
    pub fn add_to_index(
        &mut self,
        mut annotation: SpanAnnotation,
    ) -> Result<SpanAnnotationHandle, AnnotationError> {
        if annotation.handle().is_some() {
            return Err(AnnotationError::HandleError(
                "Annotation is already bound to a graph",
            ));
        }
        if !annotation.textselection().within_bounds(self.document_length()) {
            return Err(AnnotationError::BoundsViolation {
                begin: annotation.begin(),
                end: annotation.end(),
                length: self.document_length(),
            });
        }
        let handle = SpanAnnotationHandle::try_new(self.annotations.len())?;
        if annotation.id.is_none() && self.config.generate_ids() {
            annotation.id = Some(format!("S{}", nanoid!()));
        }
        if let Some(id) = annotation.id.as_ref() {
            if self.idmap.contains_key(id) {
                return Err(AnnotationError::DuplicateIdError(
                    id.clone(),
                    "adding annotation to graph",
                ));
            }
            self.idmap.insert(id.clone(), handle);
        }
        annotation.intid = Some(handle);
        debug(&self.config, || {
            format!(
                "AnnotationGraph.add_to_index: {} {} of type {}",
                handle.as_usize(),
                annotation.textselection(),
                annotation.type_name()
            )
        });
        self.type_index
            .entry(annotation.type_name.clone())
            .or_default()
            .push(handle);
        self.annotations.push(Some(annotation));
        Ok(handle)
    }

    /// Removes an annotation from the graph and its indices. The handle is not reused.
    pub fn remove(&mut self, handle: SpanAnnotationHandle) -> Result<SpanAnnotation, AnnotationError> {
        let (annotation, position) = self.detach(handle)?;
        if self.open_checkpoints > 0 {
            self.journal.push(JournalEntry::Removed {
                handle,
                position,
                annotation: annotation.clone(),
            });
        }
        debug(&self.config, || {
            format!("AnnotationGraph.remove: {}", annotation.reference())
        });
        Ok(annotation)
    }

    /// Takes an annotation out of the store and its indices, returns it with its former position in the type index
    fn detach(&mut self, handle: SpanAnnotationHandle) -> Result<(SpanAnnotation, usize), AnnotationError> {
        let annotation = self
            .annotations
            .get_mut(handle.as_usize())
            .and_then(|slot| slot.take())
            .ok_or(AnnotationError::HandleError(
                "Unable to remove annotation, no such handle",
            ))?;
        let mut position = 0;
        if let Some(handles) = self.type_index.get_mut(annotation.type_name()) {
            if let Some(pos) = handles.iter().position(|h| *h == handle) {
                handles.remove(pos); //note: this shifts the array and may take O(n)
                position = pos;
            }
        }
        if let Some(id) = annotation.id() {
            self.idmap.remove(id);
        }
        Ok((annotation, position))
    }

    /// Puts a previously detached annotation back into its slot and indices
    fn reattach(&mut self, handle: SpanAnnotationHandle, position: usize, annotation: SpanAnnotation) {
        let handles = self
            .type_index
            .entry(annotation.type_name.clone())
            .or_default();
        handles.insert(position.min(handles.len()), handle);
        if let Some(id) = annotation.id.as_ref() {
            self.idmap.insert(id.clone(), handle);
        }
        if let Some(slot) = self.annotations.get_mut(handle.as_usize()) {
            *slot = Some(annotation);
        }
    }

    /// Returns the annotation for a handle
    pub fn get(&self, handle: SpanAnnotationHandle) -> Result<&SpanAnnotation, AnnotationError> {
        self.annotations
            .get(handle.as_usize())
            .and_then(|slot| slot.as_ref())
            .ok_or(AnnotationError::HandleError(
                "No annotation with this handle (it may have been removed)",
            ))
    }

    /// Returns the annotation for a handle, mutably. Only feature values can be changed this way,
    /// offsets are fixed once the annotation is indexed.
    pub fn get_mut(&mut self, handle: SpanAnnotationHandle) -> Result<&mut SpanAnnotation, AnnotationError> {
        if self.open_checkpoints > 0 {
            let annotation = self.get(handle)?.clone();
            self.journal
                .push(JournalEntry::Modified { handle, annotation });
        }
        self.annotations
            .get_mut(handle.as_usize())
            .and_then(|slot| slot.as_mut())
            .ok_or(AnnotationError::HandleError(
                "No annotation with this handle (it may have been removed)",
            ))
    }

    /// Looks up an annotation by its public identifier
    pub fn annotation(&self, id: &str) -> Result<&SpanAnnotation, AnnotationError> {
        let handle = self
            .idmap
            .get(id)
            .ok_or_else(|| AnnotationError::IdNotFoundError(id.to_string(), "looking up annotation"))?;
        self.get(*handle)
    }

    /// Returns all annotations of a type, ordered by begin, then end, then creation order
    pub fn select<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a SpanAnnotation> + 'a {
        let mut selected: Vec<&'a SpanAnnotation> = self
            .type_index
            .get(type_name)
            .map(|handles| {
                handles
                    .iter()
                    .filter_map(|handle| self.get(*handle).ok())
                    .collect()
            })
            .unwrap_or_default();
        selected.sort_by(|a, b| {
            a.textselection()
                .cmp(&b.textselection())
                .then(a.handle().cmp(&b.handle()))
        });
        selected.into_iter()
    }

    /// Returns all annotations of a type with exactly these offsets, in creation order
    pub fn select_at<'a>(
        &'a self,
        type_name: &str,
        selection: TextSelection,
    ) -> impl Iterator<Item = &'a SpanAnnotation> + 'a {
        self.type_index
            .get(type_name)
            .into_iter()
            .flat_map(|handles| handles.iter())
            .filter_map(move |handle| self.get(*handle).ok())
            .filter(move |annotation| annotation.textselection() == selection)
    }

    /// Counts annotations of a type
    pub fn count(&self, type_name: &str) -> usize {
        self.type_index.get(type_name).map(|v| v.len()).unwrap_or(0)
    }

    /// Total number of annotations in the graph
    pub fn len(&self) -> usize {
        self.type_index.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the text covered by an annotation
    pub fn text_of(&self, handle: SpanAnnotationHandle) -> Result<&str, AnnotationError> {
        let selection = self.get(handle)?.textselection();
        self.text_by_selection(&selection)
    }

    /// Marks the current state so later changes can be undone with [`Self::rollback()`].
    ///
    /// While a checkpoint is open, removals and mutable access are journaled. Every checkpoint
    /// must be closed again by either [`Self::rollback()`] or [`Self::commit()`].
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.open_checkpoints += 1;
        Checkpoint {
            annotations_len: self.annotations.len(),
            journal_len: self.journal.len(),
        }
    }

    /// Closes a checkpoint, keeping all changes made since. The journal is released once no
    /// checkpoints are open any more, an enclosing checkpoint can still undo the changes.
    pub fn commit(&mut self, _checkpoint: Checkpoint) {
        self.open_checkpoints = self.open_checkpoints.saturating_sub(1);
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }

    /// Undoes all changes made after the checkpoint and closes it: annotations inserted since are
    /// removed, removed ones are put back and modified ones restored. Returns how many annotations
    /// were removed or restored.
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> usize {
        let mut undone = 0;
        while self.annotations.len() > checkpoint.annotations_len {
            let handle = SpanAnnotationHandle::new(self.annotations.len() - 1);
            if self.detach(handle).is_ok() {
                undone += 1;
            }
            self.annotations.pop();
        }
        while self.journal.len() > checkpoint.journal_len {
            let entry = match self.journal.pop() {
                Some(entry) => entry,
                None => break,
            };
            match entry {
                JournalEntry::Removed {
                    handle,
                    position,
                    annotation,
                } => {
                    if handle.as_usize() < checkpoint.annotations_len {
                        self.reattach(handle, position, annotation);
                        undone += 1;
                    }
                }
                JournalEntry::Modified { handle, annotation } => {
                    if let Some(Some(slot)) = self.annotations.get_mut(handle.as_usize()) {
                        *slot = annotation;
                        undone += 1;
                    }
                }
            }
        }
        self.open_checkpoints = self.open_checkpoints.saturating_sub(1);
        if undone > 0 {
            tracing::debug!(undone, "rolled back annotation graph to checkpoint");
        }
        undone
    }
}

impl Text for AnnotationGraph {
    fn text(&self) -> &str {
        self.text.as_str()
    }

    fn textlen(&self) -> usize {
        self.positions.charlen()
    }

    fn utf8byte(&self, charpos: usize) -> Result<usize, AnnotationError> {
        self.positions.utf8byte(charpos)
    }

    fn utf8byte_to_charpos(&self, bytepos: usize) -> Result<usize, AnnotationError> {
        self.positions.utf8byte_to_charpos(bytepos)
    }
}

impl SentenceLookup for AnnotationGraph {
    fn sentences(&self) -> &[TextSelection] {
        self.segmentation.sentences()
    }
}

impl TokenLookup for AnnotationGraph {
    fn tokens(&self) -> &[TextSelection] {
        self.segmentation.tokens()
    }
}

impl Configurable for AnnotationGraph {
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

impl Serialize for AnnotationGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let annotations: Vec<&SpanAnnotation> =
            self.annotations.iter().filter_map(|a| a.as_ref()).collect();
        let mut state = serializer.serialize_struct("AnnotationGraph", 5)?;
        state.serialize_field("@type", "AnnotationGraph")?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("segmentation", &self.segmentation)?;
        state.serialize_field("annotations", &annotations)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.end()
    }
}

#[sealed]
impl TypeInfo for AnnotationGraph {
    fn typeinfo() -> Type {
        Type::AnnotationGraph
    }
}

impl ToJson for AnnotationGraph {}

/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the document context passed to the adapter ([`SourceDocument`],
//! [`Project`]) and the per-graph [`GraphMetadata`] record used to detect that a persisted graph
//! was modified by someone else in the meantime.

use sealed::sealed;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::graph::AnnotationGraph;
use crate::json::ToJson;
use crate::types::*;

/// The project a document belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

impl Project {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The document an annotation graph was built for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: u64,
    pub name: String,
    pub project: Project,
}

impl SourceDocument {
    pub fn new(id: u64, name: impl Into<String>, project: Project) -> Self {
        Self {
            id,
            name: name.into(),
            project,
        }
    }
}

/// Records who last saved the graph, for which document, and the modification timestamp of the
/// persisted copy at that time. A graph holds at most one such record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub username: String,
    pub source_document_id: u64,
    pub project_id: u64,
    /// Modification time (milliseconds since the epoch) of the persisted copy
    pub last_changed_on_disk: i64,
    /// SHA-1 of the document text, lowercase hex
    pub text_checksum: String,
}

#[sealed]
impl TypeInfo for GraphMetadata {
    fn typeinfo() -> Type {
        Type::GraphMetadata
    }
}

impl ToJson for GraphMetadata {}

impl AnnotationGraph {
    /// Returns the metadata record, if any
    pub fn metadata(&self) -> Option<&GraphMetadata> {
        self.metadata.as_ref()
    }

    /// Creates or updates the metadata record after the graph was persisted with the given
    /// modification timestamp.
    pub fn add_or_update_metadata(
        &mut self,
        document: &SourceDocument,
        username: &str,
        last_changed_on_disk: i64,
    ) -> &GraphMetadata {
        let text_checksum = self.text_checksum();
        tracing::debug!(
            username,
            document = document.name.as_str(),
            document_id = document.id,
            project_id = document.project.id,
            last_changed_on_disk,
            "updating graph metadata"
        );
        self.metadata.insert(GraphMetadata {
            username: username.to_string(),
            source_document_id: document.id,
            project_id: document.project.id,
            last_changed_on_disk,
            text_checksum,
        })
    }

    /// Compares the recorded modification timestamp against the actual one of the persisted copy
    /// and fails if they differ. A graph without metadata cannot be checked, this is logged but
    /// is not an error.
    pub fn fail_on_concurrent_modification(
        &self,
        document: &SourceDocument,
        username: &str,
        actual_last_changed: i64,
    ) -> Result<(), AnnotationError> {
        match &self.metadata {
            Some(metadata) => {
                if metadata.source_document_id != document.id {
                    return Err(AnnotationError::MetadataError(format!(
                        "Graph metadata refers to document {}, expected document [{}]({})",
                        metadata.source_document_id, document.name, document.id
                    )));
                }
                if metadata.last_changed_on_disk != actual_last_changed {
                    return Err(AnnotationError::ConcurrentModification {
                        expected: metadata.last_changed_on_disk,
                        actual: actual_last_changed,
                    });
                }
                Ok(())
            }
            None => {
                tracing::info!(
                    "Annotation graph of user [{}] for document [{}]({}) in project [{}]({}) has no metadata yet - unable to check for concurrent modifications",
                    username,
                    document.name,
                    document.id,
                    document.project.name,
                    document.project.id
                );
                Ok(())
            }
        }
    }

    /// Checks that the document text still matches the checksum recorded in the metadata.
    /// Returns `None` if there is no metadata to check against.
    pub fn validate_text(&self) -> Option<bool> {
        self.metadata
            .as_ref()
            .map(|metadata| metadata.text_checksum == self.text_checksum())
    }
}

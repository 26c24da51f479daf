/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::annotation::SpanAnnotationHandle;
use crate::json::ToJson;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// A single validation finding. Diagnostics are produced fresh by every validation pass and are
/// never stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    severity: Severity,
    /// Name of the behavior that produced this diagnostic
    source: String,
    /// The offending annotation, if the finding pertains to one
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<SpanAnnotationHandle>,
    message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        source: impl Into<String>,
        annotation: Option<SpanAnnotationHandle>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            source: source.into(),
            annotation,
            message: message.into(),
        }
    }

    pub fn info(
        source: impl Into<String>,
        annotation: Option<SpanAnnotationHandle>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Info, source, annotation, message)
    }

    pub fn warn(
        source: impl Into<String>,
        annotation: Option<SpanAnnotationHandle>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warn, source, annotation, message)
    }

    pub fn error(
        source: impl Into<String>,
        annotation: Option<SpanAnnotationHandle>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Error, source, annotation, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    pub fn annotation(&self) -> Option<SpanAnnotationHandle> {
        self.annotation
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.message)
    }
}

#[sealed]
impl TypeInfo for Diagnostic {
    fn typeinfo() -> Type {
        Type::Diagnostic
    }
}

impl ToJson for Diagnostic {}

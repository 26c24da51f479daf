/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains some common types and traits used throughout the library.

use sealed::sealed;
use std::fmt;
use std::hash::Hash;

/// Type for Store elements. The struct that owns a field of this type hands out handles to its items.
pub type Store<T> = Vec<Option<T>>;
//                       ^------- may be None when an element gets deleted

/// The handle trait is implemented on various handle types. They have in common that they refer to
/// an item in a [`Store`] by index. Types implementing this are lightweight and do not borrow
/// anything, they can be passed and copied freely.
/// This is a sealed trait, not implementable outside this crate.
#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait Handle:
    Clone + Copy + core::fmt::Debug + PartialEq + Eq + PartialOrd + Ord + Hash
{
    /// Create a new handle for an internal ID. You shouldn't need to use this as handles will always be generated for you by higher-level functions.
    fn new(intid: usize) -> Self;
    /// Returns the internal index for this handle
    fn as_usize(&self) -> usize;
}

/// Enumerates the kinds of items in this library, used in messages and serialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    AnnotationGraph,
    SpanAnnotation,
    LayerConfig,
    Segmentation,
    GraphMetadata,
    Diagnostic,
    Config,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::AnnotationGraph => "AnnotationGraph",
            Self::SpanAnnotation => "SpanAnnotation",
            Self::LayerConfig => "LayerConfig",
            Self::Segmentation => "Segmentation",
            Self::GraphMetadata => "GraphMetadata",
            Self::Diagnostic => "Diagnostic",
            Self::Config => "Config",
        };
        write!(f, "{}", s)
    }
}

/// Provides type introspection
#[sealed(pub(crate))]
pub trait TypeInfo {
    /// Return the type (introspection).
    fn typeinfo() -> Type;
}

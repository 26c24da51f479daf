/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::layer::FeatureType;

/// The value of a single feature on an annotation. The layer's feature schema determines
/// which variant a given feature accepts (see [`crate::FeatureDefinition`]).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "@type", content = "value")]
pub enum FeatureValue {
    ///No value
    Null,
    String(String),
    Bool(bool),
    Int(isize),
    Float(f64),

    //Value is an ordered list
    List(Vec<FeatureValue>),
}

impl Default for FeatureValue {
    fn default() -> Self {
        Self::Null
    }
}

impl FeatureValue {
    /// Returns a name for the variant, used in messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::String(_) => "String",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::List(_) => "List",
        }
    }

    /// Tests whether this value may be assigned to a feature of the given type.
    /// Null is always accepted, ints are accepted where floats are expected, lists are checked element-wise.
    pub fn conforms_to(&self, feature_type: FeatureType) -> bool {
        match (self, feature_type) {
            (Self::Null, _) => true,
            (Self::String(_), FeatureType::String) => true,
            (Self::Bool(_), FeatureType::Bool) => true,
            (Self::Int(_), FeatureType::Int) | (Self::Int(_), FeatureType::Float) => true,
            (Self::Float(_), FeatureType::Float) => true,
            (Self::List(items), FeatureType::StringList) => items
                .iter()
                .all(|item| matches!(item, Self::String(_) | Self::Null)),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::String(s) => write!(f, "{}", s),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(item: &str) -> Self {
        Self::String(item.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(item: String) -> Self {
        Self::String(item)
    }
}

impl From<f64> for FeatureValue {
    fn from(item: f64) -> Self {
        Self::Float(item)
    }
}

impl From<isize> for FeatureValue {
    fn from(item: isize) -> Self {
        Self::Int(item)
    }
}

impl From<i64> for FeatureValue {
    fn from(item: i64) -> Self {
        Self::Int(item as isize)
    }
}

impl From<i32> for FeatureValue {
    fn from(item: i32) -> Self {
        Self::Int(item as isize)
    }
}

impl From<bool> for FeatureValue {
    fn from(item: bool) -> Self {
        Self::Bool(item)
    }
}

impl From<Vec<FeatureValue>> for FeatureValue {
    fn from(item: Vec<FeatureValue>) -> Self {
        Self::List(item)
    }
}

// These PartialEq implementation allow for more direct comparisons

impl PartialEq<str> for FeatureValue {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::String(v) => v == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for FeatureValue {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Self::String(v) => v == *other,
            _ => false,
        }
    }
}

impl PartialEq<isize> for FeatureValue {
    fn eq(&self, other: &isize) -> bool {
        match self {
            Self::Int(v) => v == other,
            _ => false,
        }
    }
}

impl PartialEq<bool> for FeatureValue {
    fn eq(&self, other: &bool) -> bool {
        match self {
            Self::Bool(v) => v == other,
            _ => false,
        }
    }
}

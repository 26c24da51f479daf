/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`Config`], which unifies the configuration of all parts of the
//! library, and the [`Configurable`] trait implemented by everything that carries one.

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AnnotationError;
use crate::json::*;
use crate::types::*;

pub trait Configurable: Sized {
    //// Obtain the configuration
    fn config(&self) -> &Config;

    //// Obtain the configuration mutably
    fn config_mut(&mut self) -> &mut Config;

    ///Builder pattern to associate a configuration
    fn with_config(mut self, config: Config) -> Self {
        self.set_config(config);
        self
    }

    ///Setter to associate a configuration
    fn set_config(&mut self, config: Config) -> &mut Self;
}

/// This holds the configuration. It is not limited to configuring a single part of the model, but unifies all in a single configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Debug mode
    pub(crate) debug: bool,

    /// The working directory
    pub(crate) workdir: Option<PathBuf>,

    /// Generate a public identifier for committed annotations that lack one. It consists of 21 URL-friendly ASCII symbols after a prefix of S
    pub(crate) generate_ids: bool,

    /// Reject feature values for features the layer does not define. If unset, such values are dropped with a warning.
    pub(crate) strict_features: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            workdir: None,
            generate_ids: false,
            strict_features: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug mode. In debug mode, verbose output will be logged (via `tracing` at debug level)
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Is debug mode enabled or not?
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Generate public IDs when missing.
    pub fn with_generate_ids(mut self, value: bool) -> Self {
        self.generate_ids = value;
        self
    }

    /// Is generation of public IDs when missing enabled or not?
    pub fn generate_ids(&self) -> bool {
        self.generate_ids
    }

    pub fn with_strict_features(mut self, value: bool) -> Self {
        self.strict_features = value;
        self
    }

    /// Are feature values for undefined features rejected (true) or dropped (false)?
    pub fn strict_features(&self) -> bool {
        self.strict_features
    }

    /// Set the working directory, relative filenames are resolved against it
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    ///  Return the working directory, if set
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(|x| x.as_path())
    }

    /// Loads configuration from a JSON file
    pub fn from_file(filename: &str) -> Result<Self, AnnotationError> {
        let reader = open_file_reader(filename, &Config::default())?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            AnnotationError::JsonError(e, filename.to_string(), "Reading config from file")
        })
    }

    /// Loads configuration from a JSON string
    pub fn from_json_str(string: &str) -> Result<Self, AnnotationError> {
        let deserializer = &mut serde_json::Deserializer::from_str(string);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            AnnotationError::JsonError(e, string.to_string(), "Reading config from string")
        })
    }
}

#[sealed]
impl TypeInfo for Config {
    fn typeinfo() -> Type {
        Type::Config
    }
}

impl ToJson for Config {}

/// Logs a debug message (via `tracing`) if debug mode is enabled in the configuration.
/// The message is only constructed when needed.
pub(crate) fn debug<F>(config: &Config, message_func: F)
where
    F: FnOnce() -> String,
{
    if config.debug() {
        let message = message_func();
        tracing::debug!(target: "annolayer", "{}", message);
    }
}

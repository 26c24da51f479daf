/*
    Annolayer (Span Annotation Layer Policies)
        by the Annolayer Contributors

        Licensed under the Apache License, Version 2.0
*/

//! This module contains the [`ToJson`] and [`FromJson`] traits that are used
//! in serialisation to/from JSON, and some helpers for file I/O.
//! Most of the actual (de)serialisation is derived on the data structures themselves, not here.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::config::{debug, Config};
use crate::error::AnnotationError;
use crate::types::*;

pub trait ToJson
where
    Self: TypeInfo + serde::Serialize,
{
    /// Writes a serialisation to any writer
    /// Lower-level function
    fn to_json_writer<W>(&self, writer: W, compact: bool) -> Result<(), AnnotationError>
    where
        W: std::io::Write,
    {
        match compact {
            false => serde_json::to_writer_pretty(writer, &self),
            true => serde_json::to_writer(writer, &self),
        }
        .map_err(|e| {
            AnnotationError::SerializationError(format!(
                "Writing {} to file: {}",
                Self::typeinfo(),
                e
            ))
        })
    }

    /// Writes this structure to a file
    fn to_json_file(&self, filename: &str, config: &Config) -> Result<(), AnnotationError> {
        debug(config, || {
            format!("{}.to_json_file: filename={:?}", Self::typeinfo(), filename)
        });
        let writer = open_file_writer(filename, config)?;
        self.to_json_writer(writer, false)
    }

    /// Serializes this structure to one string.
    fn to_json_string(&self, compact: bool) -> Result<String, AnnotationError> {
        match compact {
            false => serde_json::to_string_pretty(&self),
            true => serde_json::to_string(&self),
        }
        .map_err(|e| {
            AnnotationError::SerializationError(format!(
                "Writing {} to string: {}",
                Self::typeinfo(),
                e
            ))
        })
    }
}

pub trait FromJson
where
    Self: TypeInfo + Sized,
{
    fn from_json_file(filename: &str, config: &Config) -> Result<Self, AnnotationError>;

    fn from_json_str(string: &str) -> Result<Self, AnnotationError>;
}

/// Get a file for reading or writing, this resolves relative files against the working directory
pub(crate) fn get_filepath(filename: &str, config: &Config) -> PathBuf {
    let path = if let Some(stripped) = filename.strip_prefix("file://") {
        PathBuf::from(stripped)
    } else {
        PathBuf::from(filename)
    };
    if path.is_absolute() {
        return path;
    }
    //check whether we can find one in our workdir first
    if let Some(workdir) = config.workdir() {
        let candidate = workdir.join(&path);
        if candidate.is_file() {
            return candidate;
        }
    }
    //final fallback is simply relative to the current working directory
    path
}

/// Auxiliary function to help open files
pub(crate) fn open_file_reader(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn BufRead>, AnnotationError> {
    if filename == "-" {
        //read from stdin
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let found_filename = get_filepath(filename, config);
    debug(config, || format!("open_file_reader: {:?}", found_filename));
    let file = File::open(found_filename.as_path()).map_err(|e| {
        AnnotationError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for reading failed",
        )
    })?;
    Ok(Box::new(BufReader::new(file)))
}

/// Auxiliary function to help open files
pub(crate) fn open_file_writer(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn Write>, AnnotationError> {
    if filename == "-" {
        return Ok(Box::new(std::io::stdout()));
    }
    let found_filename = get_filepath(filename, config);
    debug(config, || format!("open_file_writer: {:?}", found_filename));
    let file = File::create(found_filename.as_path()).map_err(|e| {
        AnnotationError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for writing failed",
        )
    })?;
    Ok(Box::new(BufWriter::new(file)))
}

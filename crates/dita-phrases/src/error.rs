/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for phrase generation.

use adoc_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for phrase generation.
pub type Result<T> = std::result::Result<T, PhraseError>;

/// Everything that stops a run. All of these are terminal.
#[derive(Debug, Error)]
pub enum PhraseError {
    /// The topic id is not a valid XML name token.
    #[error("Invalid XML ID: {0}")]
    InvalidId(String),

    /// No input file was given.
    #[error("No input file specified")]
    MissingInput,

    /// More than one input file was given.
    #[error("Invalid number of arguments")]
    ArgumentCount,

    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("File not readable: {}", .0.display())]
    FileNotReadable(PathBuf),

    #[error("File is not valid UTF-8: {}", .0.display())]
    InvalidEncoding(PathBuf),

    /// The markup engine failed to parse or convert.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A converted value is not well-formed XML.
    #[error("Conversion of attribute '{name}' produced malformed XML: {source}")]
    MalformedPhrase {
        name: String,
        #[source]
        source: dita_xml::Error,
    },

    /// The assembled topic is not well-formed XML.
    #[error("Generated topic is malformed: {0}")]
    MalformedTopic(#[source] dita_xml::Error),
}

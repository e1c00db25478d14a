/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for parsing and converting AsciiDoc.

use thiserror::Error;

/// Errors that can occur while parsing or converting a document.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Include directives nested deeper than the `max-include-depth` limit.
    #[error("Maximum include depth of {max_depth} exceeded: {target}")]
    IncludeDepthExceeded { target: String, max_depth: usize },

    /// Output was requested in a mode this engine does not produce.
    #[error("Unsupported conversion: {message}")]
    Unsupported { message: String },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Generate a DITA concept topic of reusable phrases from the attributes of
//! an AsciiDoc document.
//!
//! Every attribute the document defines on top of the engine's own defaults,
//! and that has a value, becomes a `<ph id="NAME">` element whose content is
//! the value converted to DITA inline markup.
//!
//! # Example
//!
//! ```no_run
//! use adoc_engine::Asciidoc;
//! use dita_phrases::{Config, generate};
//!
//! let config = Config::new("attributes.adoc").with_title("Widget attributes");
//! let engine = Asciidoc::with_includes_from(".");
//! let topic = generate(&config, &engine).unwrap();
//! print!("{topic}");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod topic;
pub mod validate;

pub use config::{Config, DEFAULT_ID, DEFAULT_TITLE, Layout};
pub use error::{PhraseError, Result};
pub use generator::{Phrase, PhraseGenerator};

use adoc_engine::MarkupEngine;
use std::io::ErrorKind;

/// Read `config.input` and return the complete topic.
///
/// Nothing is returned unless every attribute converted cleanly and the
/// assembled topic is well-formed.
pub fn generate<E: MarkupEngine + ?Sized>(config: &Config, engine: &E) -> Result<String> {
    let text = std::fs::read_to_string(&config.input).map_err(|err| {
        tracing::debug!(path = %config.input.display(), error = %err, "cannot read input");
        match err.kind() {
            ErrorKind::InvalidData => PhraseError::InvalidEncoding(config.input.clone()),
            _ => PhraseError::FileNotReadable(config.input.clone()),
        }
    })?;

    let phrases = PhraseGenerator::new(engine).phrases(&text)?;
    topic::render_checked(config, &phrases)
}

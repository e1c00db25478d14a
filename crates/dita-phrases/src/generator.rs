/*
 * generator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Attribute extraction, filtering and value conversion.
//!
//! The generator asks the engine twice for attributes: once for an empty
//! document, which yields the names the engine defines itself, and once for
//! the real document. Whatever the real document adds with a non-empty value
//! becomes a phrase.

use crate::error::{PhraseError, Result};
use adoc_engine::{ConvertOptions, MarkupEngine};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Paragraph tags the engine wraps converted fragments in.
static PARAGRAPH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?p>").unwrap());

/// An attribute after conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    /// Attribute name, used as the phrase id.
    pub name: String,

    /// Converted inline markup.
    pub value: String,
}

impl Phrase {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

pub struct PhraseGenerator<'e, E: MarkupEngine + ?Sized> {
    engine: &'e E,
    options: ConvertOptions,
}

impl<'e, E: MarkupEngine + ?Sized> PhraseGenerator<'e, E> {
    /// A generator converting values with the `experimental` attribute set,
    /// so UI macros such as `kbd:[...]` are recognized.
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            options: ConvertOptions::new().with_attribute("experimental", ""),
        }
    }

    /// Names the engine defines for an empty document.
    pub fn built_in_names(&self) -> Result<HashSet<String>> {
        let defaults = self.engine.parse("")?;
        Ok(defaults.names().map(str::to_string).collect())
    }

    /// Extract, filter and convert the attributes of `text`, in declaration
    /// order.
    pub fn phrases(&self, text: &str) -> Result<Vec<Phrase>> {
        let built_in = self.built_in_names()?;
        let attributes = self.engine.parse(text)?;

        let mut phrases = Vec::new();
        for (name, value) in attributes.iter() {
            if built_in.contains(&name.to_lowercase()) {
                continue;
            }
            if value.is_empty() {
                tracing::debug!(attribute = %name, "skipping attribute without a value");
                continue;
            }
            phrases.push(Phrase::new(name, self.convert(name, value)?));
        }

        tracing::info!(count = phrases.len(), "converted attributes");
        Ok(phrases)
    }

    /// Convert one value to an inline fragment.
    fn convert(&self, name: &str, value: &str) -> Result<String> {
        let converted = self.engine.convert(value, &self.options)?;
        let inline = PARAGRAPH_TAG.replace_all(&converted, "").into_owned();

        dita_xml::check_fragment(&inline).map_err(|source| PhraseError::MalformedPhrase {
            name: name.to_string(),
            source,
        })?;
        Ok(inline)
    }
}

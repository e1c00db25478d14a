/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The engine interface and its AsciiDoc implementation.

use crate::attributes::AttributeMap;
use crate::backend::{DitaBackend, InlineBackend};
use crate::defaults::document_defaults;
use crate::error::{EngineError, EngineResult};
use crate::parser::Parser;
use crate::resolver::{FileSystemResolver, IncludeResolver, NullResolver};
use crate::subs::{NORMAL_SUBS, SubContext, apply_subs};
use std::path::PathBuf;

/// A markup engine: reads document attributes and converts inline markup.
///
/// Both operations are deterministic: the same input always produces the
/// same output.
pub trait MarkupEngine {
    /// Parse a document and return its attributes in declaration order,
    /// including the engine's own defaults.
    fn parse(&self, text: &str) -> EngineResult<AttributeMap>;

    /// Convert a markup fragment to an output fragment.
    fn convert(&self, fragment: &str, options: &ConvertOptions) -> EngineResult<String>;
}

/// Options for [`MarkupEngine::convert`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertOptions {
    /// Produce a complete document instead of an embeddable fragment.
    pub standalone: bool,

    /// Attributes set (`Some`) or unset (`None`) for the conversion. The
    /// converted fragment cannot override them.
    pub attributes: Vec<(String, Option<String>)>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute for the conversion.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), Some(value.into())));
        self
    }

    /// Unset an attribute for the conversion.
    pub fn without_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push((name.into(), None));
        self
    }
}

/// The AsciiDoc engine.
///
/// Include directives are not resolved unless a resolver is configured with
/// [`Asciidoc::with_includes_from`] or [`Asciidoc::with_resolver`]; an
/// unresolved include leaves a marker line in the document.
pub struct Asciidoc {
    resolver: Box<dyn IncludeResolver>,
    base_dir: PathBuf,
}

impl Asciidoc {
    pub fn new() -> Self {
        Self {
            resolver: Box::new(NullResolver),
            base_dir: PathBuf::from("."),
        }
    }

    /// Resolve includes from the filesystem, relative to (and confined to) `base_dir`.
    pub fn with_includes_from(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            resolver: Box::new(FileSystemResolver::new(base_dir.clone())),
            base_dir,
        }
    }

    /// Use a custom include resolver.
    pub fn with_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }
}

impl Default for Asciidoc {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupEngine for Asciidoc {
    fn parse(&self, text: &str) -> EngineResult<AttributeMap> {
        let parser = Parser::new(
            text,
            &self.base_dir,
            self.resolver.as_ref(),
            document_defaults(),
        );
        let document = parser.parse()?;
        tracing::debug!(attributes = document.attributes.len(), "parsed document");
        Ok(document.attributes)
    }

    fn convert(&self, fragment: &str, options: &ConvertOptions) -> EngineResult<String> {
        if options.standalone {
            return Err(EngineError::Unsupported {
                message: "standalone documents".to_string(),
            });
        }

        let mut attributes = document_defaults();
        for (name, value) in &options.attributes {
            match value {
                Some(value) => attributes.set_locked(name.clone(), value.clone()),
                None => attributes.unset_locked(name),
            }
        }

        let document =
            Parser::new(fragment, &self.base_dir, self.resolver.as_ref(), attributes).parse()?;

        let backend = DitaBackend;
        let ctx = SubContext {
            attributes: &document.attributes,
            backend: &backend,
        };
        let paragraphs: Vec<String> = document
            .paragraphs
            .iter()
            .map(|text| backend.paragraph(&apply_subs(text, NORMAL_SUBS, &ctx)))
            .collect();
        Ok(paragraphs.join("\n"))
    }
}

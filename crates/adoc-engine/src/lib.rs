/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! AsciiDoc attribute extraction and inline conversion to DITA.
//!
//! This crate reads AsciiDoc documents far enough to report their document
//! attributes, and converts inline AsciiDoc markup to DITA phrase-level
//! elements. It supports:
//!
//! - Attribute entries: `:name: value`, `:name!:`, continuation lines
//! - Document header: title, author line, revision line
//! - Preprocessor directives: `ifdef`, `ifndef`, `ifeval`, `include`
//! - Inline substitutions: special characters, quotes, attribute references,
//!   replacements, macros, passthroughs, and hard line breaks
//!
//! Block structure beyond paragraphs is not converted.
//!
//! # Example
//!
//! ```
//! use adoc_engine::{Asciidoc, ConvertOptions, MarkupEngine};
//!
//! let engine = Asciidoc::new();
//! let attrs = engine.parse(":product: *Widget*\n").unwrap();
//! assert_eq!(attrs.get("product"), Some("*Widget*"));
//!
//! let dita = engine.convert("*Widget*", &ConvertOptions::new()).unwrap();
//! assert_eq!(dita, "<p><b>Widget</b></p>");
//! ```

pub mod attributes;
pub mod backend;
pub mod defaults;
pub mod engine;
pub mod error;
mod parser;
mod reader;
pub mod resolver;
pub mod subs;

// Re-export main types at crate root
pub use attributes::{AttributeMap, sanitize_name};
pub use backend::{DitaBackend, InlineBackend, LinkKind};
pub use engine::{Asciidoc, ConvertOptions, MarkupEngine};
pub use error::{EngineError, EngineResult};
pub use resolver::{FileSystemResolver, IncludeResolver, IncludedFile, MemoryResolver, NullResolver};

/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Run configuration.

use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_ID: &str = "product-attributes";
pub const DEFAULT_TITLE: &str = "Product attributes";

/// How phrases are laid out inside `<conbody>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// One `<li>` per phrase inside a `<ul>`.
    #[default]
    List,

    /// One `<p>` per phrase directly inside `<conbody>`.
    Paragraph,
}

/// Validated options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Topic id, already checked to be a valid XML name token.
    pub id: String,

    /// Topic title as given; escaped when the topic is written.
    pub title: String,

    pub layout: Layout,

    /// The AsciiDoc file to read.
    pub input: PathBuf,
}

impl Config {
    /// A configuration with the default id, title and layout.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            id: DEFAULT_ID.to_string(),
            title: DEFAULT_TITLE.to_string(),
            layout: Layout::default(),
            input: input.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("attrs.adoc");
        assert_eq!(config.id, "product-attributes");
        assert_eq!(config.title, "Product attributes");
        assert_eq!(config.layout, Layout::List);
    }
}

/*
 * defaults.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Attributes every document starts with.
//!
//! [`document_defaults`] is what an empty document reports as its attribute
//! map, so callers can tell author-supplied attributes from engine defaults.
//! [`intrinsic`] holds the character-replacement attributes; those resolve in
//! attribute references but are not part of the document's attribute map.

use crate::attributes::AttributeMap;

/// Version reported through the `asciidoctor-version` attribute.
pub const ENGINE_VERSION: &str = "2.0.23";

/// Default include nesting limit (`max-include-depth`).
pub const MAX_INCLUDE_DEPTH: usize = 64;

const BACKEND: &str = "dita-topic";
const BASEBACKEND: &str = "dita";
const DOCTYPE: &str = "article";

/// Captions, labels and reference signifiers.
const LABELS: &[(&str, &str)] = &[
    ("appendix-caption", "Appendix"),
    ("appendix-refsig", "Appendix"),
    ("caution-caption", "Caution"),
    ("chapter-refsig", "Chapter"),
    ("example-caption", "Example"),
    ("figure-caption", "Figure"),
    ("important-caption", "Important"),
    ("last-update-label", "Last updated"),
    ("note-caption", "Note"),
    ("part-refsig", "Part"),
    ("prewrap", ""),
    ("sectids", ""),
    ("section-refsig", "Section"),
    ("table-caption", "Table"),
    ("tip-caption", "Tip"),
    ("toc-placement", "auto"),
    ("toc-title", "Table of Contents"),
    ("untitled-label", "Untitled"),
    ("version-label", "Version"),
    ("warning-caption", "Warning"),
];

/// Date and time attributes. Their names are reserved, but their values are
/// left empty so conversions are reproducible.
const DATE_ATTRIBUTES: &[&str] = &[
    "localdate",
    "localtime",
    "localdatetime",
    "localyear",
    "docdate",
    "doctime",
    "docdatetime",
    "docyear",
];

/// Build the attribute map of an empty document.
pub fn document_defaults() -> AttributeMap {
    let mut attrs = AttributeMap::new();

    attrs.set("asciidoctor", "");
    attrs.set("asciidoctor-version", ENGINE_VERSION);
    attrs.set("safe-mode-name", "safe");
    attrs.set("safe-mode-safe", "");
    attrs.set("safe-mode-level", "1");
    attrs.set("max-include-depth", MAX_INCLUDE_DEPTH.to_string());
    attrs.set("user-home", ".");

    for (name, value) in LABELS {
        attrs.set(*name, *value);
    }

    attrs.set("iconsdir", "./images/icons");
    attrs.set("stylesdir", ".");
    attrs.set("attribute-missing", "skip");
    attrs.set("attribute-undefined", "drop-line");
    attrs.set("docdir", "");

    for name in DATE_ATTRIBUTES {
        attrs.set(*name, "");
    }

    attrs.set("doctype", DOCTYPE);
    attrs.set(format!("doctype-{DOCTYPE}"), "");
    attrs.set("backend", BACKEND);
    attrs.set(format!("backend-{BACKEND}"), "");
    attrs.set(format!("backend-{BACKEND}-doctype-{DOCTYPE}"), "");
    attrs.set("basebackend", BASEBACKEND);
    attrs.set(format!("basebackend-{BASEBACKEND}"), "");
    attrs.set(format!("basebackend-{BASEBACKEND}-doctype-{DOCTYPE}"), "");
    attrs.set("outfilesuffix", ".dita");
    attrs.set("filetype", BASEBACKEND);
    attrs.set(format!("filetype-{BASEBACKEND}"), "");
    attrs.set("htmlsyntax", "xml");
    attrs.set("embedded", "");
    attrs.set("notitle", "");
    attrs.set("authorcount", "0");

    attrs
}

/// Look up a character-replacement attribute such as `{nbsp}` or `{plus}`.
pub fn intrinsic(name: &str) -> Option<&'static str> {
    let value = match name {
        "startsb" => "[",
        "endsb" => "]",
        "vbar" => "|",
        "caret" => "^",
        "asterisk" => "*",
        "tilde" => "~",
        "plus" => "&#43;",
        "backslash" => "\\",
        "backtick" => "`",
        "blank" | "empty" => "",
        "sp" => " ",
        "two-colons" => "::",
        "two-semicolons" => ";;",
        "nbsp" => "&#160;",
        "deg" => "&#176;",
        "zwsp" => "&#8203;",
        "quot" => "&#34;",
        "apos" => "&#39;",
        "lsquo" => "&#8216;",
        "rsquo" => "&#8217;",
        "ldquo" => "&#8220;",
        "rdquo" => "&#8221;",
        "wj" => "&#8288;",
        "brvbar" => "&#166;",
        "pp" => "&#43;&#43;",
        "cpp" | "cxx" => "C&#43;&#43;",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        _ => return None,
    };
    Some(value)
}

/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document structure scanning.
//!
//! The parser reads the document header (title, author line, revision line,
//! and attribute entries) and then walks the body block by block. It keeps
//! track of attribute entries and of paragraph text; everything else about
//! the block structure is recognized only far enough to know where attribute
//! entries may appear.

use crate::attributes::{AttributeMap, sanitize_name};
use crate::backend::DitaBackend;
use crate::error::EngineResult;
use crate::reader::Reader;
use crate::resolver::IncludeResolver;
use crate::subs::attributes::substitute_attributes;
use crate::subs::{HEADER_SUBS, SubContext, apply_subs, escape_special_chars, parse_subs};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// `:name: value`, `:name!:` and `:!name:`.
static ATTRIBUTE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:(!?\w[^:]*):(?:[ \t]+(.*))?$").unwrap());

/// An entry value wrapped in `pass:[...]`, optionally with substitutions.
static PASS_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^pass:([a-z]+(?:,[a-z-]+)*)?\[(.*)\]$").unwrap());

/// `= Document Title`, optionally with trailing `=`.
static DOCUMENT_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(=|#)[ \t]+(.+?)(?:[ \t]+(?:=|#))?$").unwrap());

static SECTION_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:={1,6}|#{1,6})[ \t]+\S").unwrap());

static BLOCK_ATTRIBUTE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\[(|[\w.#%{,"'\[].*)\]$"#).unwrap());

static BLOCK_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.(\.?[^ \t.].*)$").unwrap());

/// `First [Middle] [Last] [<email>]`.
static AUTHOR_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w[\w\-'.]*)(?: +(\w[\w\-'.]*))?(?: +(\w[\w\-'.]*))?(?: +<([^>]+)>)?$").unwrap()
});

/// The result of scanning a document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedDocument {
    pub attributes: AttributeMap,
    /// Paragraph text, one entry per paragraph, lines joined with `\n`.
    pub paragraphs: Vec<String>,
}

pub(crate) struct Parser<'r> {
    reader: Reader<'r>,
    attributes: AttributeMap,
    in_header: bool,
    author_line_seen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HeaderLine {
    Author,
    Revision,
    Done,
}

impl<'r> Parser<'r> {
    pub(crate) fn new(
        text: &str,
        base_dir: &Path,
        resolver: &'r dyn IncludeResolver,
        attributes: AttributeMap,
    ) -> Self {
        Self {
            reader: Reader::new(text, base_dir, resolver),
            attributes,
            in_header: true,
            author_line_seen: false,
        }
    }

    pub(crate) fn parse(mut self) -> EngineResult<ParsedDocument> {
        self.parse_header()?;
        self.in_header = false;
        let paragraphs = self.parse_body()?;
        Ok(ParsedDocument {
            attributes: self.attributes,
            paragraphs,
        })
    }

    fn next_line(&mut self) -> EngineResult<Option<String>> {
        self.reader.next_line(&self.attributes)
    }

    fn parse_header(&mut self) -> EngineResult<()> {
        let first = loop {
            let Some(line) = self.next_line()? else {
                return self.finish_header();
            };
            if line.is_empty() || is_line_comment(&line) {
                continue;
            }
            if let Some(close) = verbatim_delimiter(&line).filter(|d| d == "////") {
                self.skip_until(&close)?;
                continue;
            }
            if self.process_attribute_entry(&line)? || BLOCK_ATTRIBUTE_LINE.is_match(&line) {
                continue;
            }
            break line;
        };

        let Some(caps) = DOCUMENT_TITLE.captures(&first) else {
            self.reader.push_back(first);
            return self.finish_header();
        };
        let title = self.header_subs(&caps[2]);
        tracing::debug!(title = %title, "document title");
        self.attributes.set("doctitle", title);

        let mut expecting = HeaderLine::Author;
        while let Some(line) = self.next_line()? {
            if line.is_empty() {
                break;
            }
            if is_line_comment(&line) || self.process_attribute_entry(&line)? {
                continue;
            }
            match expecting {
                HeaderLine::Author => {
                    self.author_line_seen = true;
                    let line = substitute_attributes(&line, &self.attributes);
                    let authors = author_attributes(&line, false, true);
                    self.store_author_attributes(authors, false);
                    expecting = HeaderLine::Revision;
                }
                HeaderLine::Revision => {
                    match parse_revision_line(&line) {
                        Some(revision) => self.store_revision(revision),
                        None => {
                            self.reader.push_back(line);
                            break;
                        }
                    }
                    expecting = HeaderLine::Done;
                }
                HeaderLine::Done => {
                    self.reader.push_back(line);
                    break;
                }
            }
        }

        self.finish_header()
    }

    /// Derive the name attributes from `author` or `authors` entries when the
    /// header has no author line.
    fn finish_header(&mut self) -> EngineResult<()> {
        if self.author_line_seen {
            return Ok(());
        }
        if let Some(author) = self.attributes.get("author").map(str::to_string) {
            let authors = author_attributes(&author, true, false);
            self.store_author_attributes(authors, true);
        } else if let Some(authors) = self.attributes.get("authors").map(str::to_string) {
            let authors = author_attributes(&authors, true, true);
            self.store_author_attributes(authors, true);
        }
        Ok(())
    }

    fn store_author_attributes(&mut self, authors: IndexMap<String, String>, implicit: bool) {
        if authors.is_empty() {
            return;
        }
        let names: Vec<String> = authors
            .iter()
            .filter(|(key, _)| is_author_key(key))
            .map(|(_, name)| name.clone())
            .collect();
        self.attributes.set("authorcount", names.len().to_string());

        let joined = names.join(", ");
        for (key, value) in authors.into_iter().chain([("authors".to_string(), joined)]) {
            if self.attributes.contains(&key) {
                continue;
            }
            // The author line had its attribute references resolved already.
            let value = if implicit {
                value
            } else {
                escape_special_chars(&value)
            };
            self.attributes.set(key, value);
        }
    }

    fn store_revision(&mut self, revision: Revision) {
        let fields = [
            ("revnumber", revision.number),
            ("revdate", revision.date),
            ("revremark", revision.remark),
        ];
        for (key, value) in fields {
            let Some(value) = value else {
                continue;
            };
            if !self.attributes.contains(key) {
                let value = self.header_subs(&value);
                self.attributes.set(key, value);
            }
        }
    }

    fn parse_body(&mut self) -> EngineResult<Vec<String>> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<String> = Vec::new();

        while let Some(line) = self.next_line()? {
            if line.is_empty() {
                flush(&mut current, &mut paragraphs);
                continue;
            }

            if let Some(close) = verbatim_delimiter(&line) {
                flush(&mut current, &mut paragraphs);
                self.skip_until(&close)?;
                continue;
            }

            if is_compound_delimiter(&line) || is_break(&line) {
                flush(&mut current, &mut paragraphs);
                continue;
            }

            if is_line_comment(&line) {
                continue;
            }

            if current.is_empty() {
                if self.process_attribute_entry(&line)?
                    || SECTION_TITLE.is_match(&line)
                    || BLOCK_ATTRIBUTE_LINE.is_match(&line)
                    || BLOCK_TITLE.is_match(&line)
                {
                    continue;
                }
            }

            current.push(line);
        }

        flush(&mut current, &mut paragraphs);
        Ok(paragraphs)
    }

    /// Skip lines up to and including the closing delimiter of a verbatim block.
    fn skip_until(&mut self, close: &str) -> EngineResult<()> {
        while let Some(line) = self.next_line()? {
            if line == close {
                return Ok(());
            }
        }
        tracing::warn!(delimiter = %close, "unterminated delimited block");
        Ok(())
    }

    /// Handle `line` if it is an attribute entry, reading continuation lines
    /// as needed. Returns `false` if it is not an entry.
    fn process_attribute_entry(&mut self, line: &str) -> EngineResult<bool> {
        let Some(caps) = ATTRIBUTE_ENTRY.captures(line) else {
            return Ok(false);
        };
        let name = caps[1].to_string();
        let mut value = caps.get(2).map_or("", |m| m.as_str()).to_string();

        if let Some(continuation) = [" \\", " +"].into_iter().find(|c| value.ends_with(c)) {
            value.truncate(value.len() - continuation.len());
            value.truncate(value.trim_end().len());

            while let Some(next) = self.next_line()? {
                if next.is_empty() {
                    self.reader.push_back(next);
                    break;
                }
                let next = next.trim_start();
                let keep_open = next.ends_with(continuation);
                let next = if keep_open {
                    next[..next.len() - continuation.len()].trim_end()
                } else {
                    next
                };
                let separator = if value.ends_with(" +") { "\n" } else { " " };
                value = format!("{value}{separator}{next}");
                if !keep_open {
                    break;
                }
            }
        }

        self.store_attribute(&name, &value);
        Ok(true)
    }

    fn store_attribute(&mut self, raw_name: &str, value: &str) {
        let (name, unset) = match raw_name
            .strip_suffix('!')
            .or_else(|| raw_name.strip_prefix('!'))
        {
            Some(name) => (name, true),
            None => (raw_name, false),
        };

        let name = match sanitize_name(name).as_str() {
            "numbered" => "sectnums".to_string(),
            "hardbreaks" => "hardbreaks-option".to_string(),
            other => other.to_string(),
        };
        if name == "showtitle" {
            if unset {
                self.attributes.set("notitle", "");
            } else {
                self.attributes.unset("notitle");
            }
        }

        if unset {
            if !self.attributes.unset(&name) && self.attributes.is_locked(&name) {
                tracing::debug!(attribute = %name, "attribute is locked; entry ignored");
            }
            return;
        }

        let value = self.attribute_value(value);
        if self.in_header && name == "doctype" {
            self.update_doctype(&value);
        } else if !self.attributes.set(name.clone(), value) {
            tracing::debug!(attribute = %name, "attribute is locked; entry ignored");
        }
    }

    /// Apply the substitutions an entry value receives before it is stored.
    fn attribute_value(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        match PASS_VALUE.captures(value) {
            Some(caps) => match caps.get(1) {
                Some(subs) => {
                    let ctx = SubContext {
                        attributes: &self.attributes,
                        backend: &DitaBackend,
                    };
                    apply_subs(&caps[2], &parse_subs(subs.as_str()), &ctx)
                }
                None => caps[2].to_string(),
            },
            None => self.header_subs(value),
        }
    }

    fn header_subs(&self, text: &str) -> String {
        let ctx = SubContext {
            attributes: &self.attributes,
            backend: &DitaBackend,
        };
        apply_subs(text, HEADER_SUBS, &ctx)
    }

    /// Switch the doctype, keeping the doctype-derived attributes in step.
    fn update_doctype(&mut self, doctype: &str) {
        if self.attributes.is_locked("doctype") {
            return;
        }
        let backend = self.attributes.get("backend").unwrap_or_default().to_string();
        let basebackend = self.attributes.get("basebackend").unwrap_or_default().to_string();

        if let Some(previous) = self.attributes.get("doctype").map(str::to_string) {
            self.attributes.unset(&format!("doctype-{previous}"));
            self.attributes.unset(&format!("backend-{backend}-doctype-{previous}"));
            self.attributes.unset(&format!("basebackend-{basebackend}-doctype-{previous}"));
        }

        self.attributes.set("doctype", doctype);
        self.attributes.set(format!("doctype-{doctype}"), "");
        self.attributes.set(format!("backend-{backend}-doctype-{doctype}"), "");
        self.attributes.set(format!("basebackend-{basebackend}-doctype-{doctype}"), "");
    }
}

fn flush(current: &mut Vec<String>, paragraphs: &mut Vec<String>) {
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
        current.clear();
    }
}

fn is_line_comment(line: &str) -> bool {
    line.starts_with("//") && !line.starts_with("///")
}

/// The closing delimiter for a line that opens a verbatim block.
fn verbatim_delimiter(line: &str) -> Option<String> {
    if line.starts_with("```") {
        return Some("```".to_string());
    }
    if matches!(line, "|===" | ",===" | ":===" | "!===") {
        return Some(line.to_string());
    }
    let first = line.chars().next()?;
    if matches!(first, '-' | '.' | '+' | '/') && line.len() >= 4 && line.chars().all(|c| c == first) {
        return Some(line.to_string());
    }
    None
}

fn is_compound_delimiter(line: &str) -> bool {
    if line == "--" {
        return true;
    }
    let Some(first) = line.chars().next() else {
        return false;
    };
    matches!(first, '=' | '*' | '_') && line.len() >= 4 && line.chars().all(|c| c == first)
}

/// Thematic breaks, page breaks, and list continuation markers.
fn is_break(line: &str) -> bool {
    matches!(line, "'''" | "---" | "***" | "<<<" | "+")
}

fn is_author_key(key: &str) -> bool {
    key == "author" || key.strip_prefix("author_").is_some_and(|n| n.parse::<usize>().is_ok())
}

/// Build the author attributes for an author line.
///
/// With `names_only`, each author is split on whitespace into at most three
/// name parts and no email is recognized. With `multiple`, authors are
/// separated by `;`.
fn author_attributes(line: &str, names_only: bool, multiple: bool) -> IndexMap<String, String> {
    let entries: Vec<&str> = if multiple {
        line.split(';').map(str::trim).filter(|s| !s.is_empty()).collect()
    } else {
        vec![line.trim()]
    };

    let mut metadata = IndexMap::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        let key = |name: &str| {
            if index == 0 {
                name.to_string()
            } else {
                format!("{name}_{}", index + 1)
            }
        };

        let segments: Option<Vec<Option<String>>> = if names_only {
            let parts: Vec<Option<String>> = entry
                .splitn(3, char::is_whitespace)
                .filter(|s| !s.is_empty())
                .map(|s| Some(s.trim().to_string()))
                .collect();
            Some(parts)
        } else {
            AUTHOR_INFO.captures(entry).map(|caps| {
                (1..=4)
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
                    .collect()
            })
        };

        let Some(segments) = segments else {
            let name = entry.split_whitespace().collect::<Vec<_>>().join(" ");
            let initial = name.chars().next().map(String::from).unwrap_or_default();
            metadata.insert(key("firstname"), name.clone());
            metadata.insert(key("author"), name);
            metadata.insert(key("authorinitials"), initial);
            continue;
        };

        let part = |i: usize| {
            segments
                .get(i)
                .cloned()
                .flatten()
                .map(|s| s.replace('_', " "))
        };
        let initial = |s: &str| s.chars().next().map(String::from).unwrap_or_default();

        let Some(first) = part(0) else {
            continue;
        };
        metadata.insert(key("firstname"), first.clone());
        metadata.insert(key("author"), first.clone());
        metadata.insert(key("authorinitials"), initial(&first));

        match (part(1), part(2)) {
            (Some(middle), Some(last)) => {
                metadata.insert(key("middlename"), middle.clone());
                metadata.insert(key("lastname"), last.clone());
                metadata.insert(key("author"), format!("{first} {middle} {last}"));
                metadata.insert(
                    key("authorinitials"),
                    format!("{}{}{}", initial(&first), initial(&middle), initial(&last)),
                );
            }
            (Some(last), None) => {
                metadata.insert(key("lastname"), last.clone());
                metadata.insert(key("author"), format!("{first} {last}"));
                metadata.insert(key("authorinitials"), format!("{}{}", initial(&first), initial(&last)));
            }
            _ => {}
        }

        if !names_only {
            if let Some(email) = segments.get(3).cloned().flatten() {
                metadata.insert(key("email"), email);
            }
        }
    }

    metadata
}

/// Fields of a revision line.
#[derive(Debug, Clone, Default, PartialEq)]
struct Revision {
    number: Option<String>,
    date: Option<String>,
    remark: Option<String>,
}

/// Parse `[v]NUMBER, DATE: REMARK` and its shorter forms.
fn parse_revision_line(line: &str) -> Option<Revision> {
    if line.starts_with(':') {
        return None;
    }

    let (number, rest) = match line.split_once(',') {
        Some((number, rest)) => {
            let number = number.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '{');
            (Some(number.trim_end().to_string()), rest.trim_start())
        }
        None => (None, line),
    };

    let (date, remark) = match rest.find(':') {
        Some(colon) => {
            let date = rest[..colon].trim_end().trim_end_matches(',');
            (date, Some(rest[colon + 1..].trim().to_string()))
        }
        None => (rest, None),
    };

    let mut revision = Revision {
        number,
        date: None,
        remark,
    };
    let date = date.trim();
    if !date.is_empty() {
        match date.strip_prefix('v') {
            Some(number) if revision.number.is_none() => revision.number = Some(number.to_string()),
            _ => revision.date = Some(date.to_string()),
        }
    }
    Some(revision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::document_defaults;
    use crate::resolver::NullResolver;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ParsedDocument {
        Parser::new(text, Path::new("."), &NullResolver, AttributeMap::new())
            .parse()
            .unwrap()
    }

    fn user_attributes(text: &str) -> Vec<(String, String)> {
        parse(text)
            .attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_header_entries() {
        assert_eq!(
            user_attributes(":product: Widget\n:version: 1.0\n:experimental:\n"),
            pairs(&[("product", "Widget"), ("version", "1.0"), ("experimental", "")])
        );
    }

    #[test]
    fn test_unset_forms() {
        assert_eq!(
            user_attributes(":a: 1\n:b: 2\n:a!:\n:!b:\n:c: 3"),
            pairs(&[("c", "3")])
        );
    }

    #[test]
    fn test_name_is_sanitized() {
        assert_eq!(
            user_attributes(":Product Name: Widget"),
            pairs(&[("productname", "Widget")])
        );
    }

    #[test]
    fn test_values_get_header_subs() {
        assert_eq!(
            user_attributes(":product: Widget\n:full: {product} <Pro> & more\n:raw: pass:[<b>]"),
            pairs(&[
                ("product", "Widget"),
                ("full", "Widget &lt;Pro&gt; &amp; more"),
                ("raw", "<b>"),
            ])
        );
    }

    #[test]
    fn test_continuation_lines() {
        assert_eq!(
            user_attributes(":long: first part \\\n  second part \\\n  third\n:next: x"),
            pairs(&[("long", "first part second part third"), ("next", "x")])
        );
        assert_eq!(
            user_attributes(":lines: one + \\\ntwo"),
            pairs(&[("lines", "one +\ntwo")])
        );
    }

    #[test]
    fn test_title_author_and_revision() {
        let text = "= User Guide\nJane Q. Doe <jane@example.com>\nv2.1, 2025-01-15: Initial release\n\n:later: yes\n";
        assert_eq!(
            user_attributes(text),
            pairs(&[
                ("doctitle", "User Guide"),
                ("authorcount", "1"),
                ("firstname", "Jane"),
                ("author", "Jane Q. Doe"),
                ("authorinitials", "JQD"),
                ("middlename", "Q."),
                ("lastname", "Doe"),
                ("email", "jane@example.com"),
                ("authors", "Jane Q. Doe"),
                ("revnumber", "2.1"),
                ("revdate", "2025-01-15"),
                ("revremark", "Initial release"),
                ("later", "yes"),
            ])
        );
    }

    #[test]
    fn test_multiple_authors() {
        let attrs = parse("= T\nAda Lovelace; Charles_Babbage\n").attributes;
        assert_eq!(attrs.get("authorcount"), Some("2"));
        assert_eq!(attrs.get("author_2"), Some("Charles Babbage"));
        assert_eq!(attrs.get("firstname_2"), Some("Charles Babbage"));
        assert_eq!(attrs.get("authors"), Some("Ada Lovelace, Charles Babbage"));
    }

    #[test]
    fn test_author_entry_without_author_line() {
        let attrs = parse("= T\n:author: Grace Hopper\n").attributes;
        assert_eq!(attrs.get("firstname"), Some("Grace"));
        assert_eq!(attrs.get("lastname"), Some("Hopper"));
        assert_eq!(attrs.get("authorinitials"), Some("GH"));
    }

    #[test]
    fn test_revision_line_forms() {
        assert_eq!(
            parse_revision_line("v1.0"),
            Some(Revision {
                number: Some("1.0".to_string()),
                ..Revision::default()
            })
        );
        assert_eq!(
            parse_revision_line("2025-02-01: Fixes"),
            Some(Revision {
                number: None,
                date: Some("2025-02-01".to_string()),
                remark: Some("Fixes".to_string()),
            })
        );
        assert_eq!(parse_revision_line(":not: revision"), None);
    }

    #[test]
    fn test_body_entries_only_at_block_boundaries() {
        let text = "Intro paragraph\n:inside: no\n\n:outside: yes\n\n----\n:verbatim: no\n----\n\n====\n:compound: yes\n====\n";
        assert_eq!(
            user_attributes(text),
            pairs(&[("outside", "yes"), ("compound", "yes")])
        );
    }

    #[test]
    fn test_paragraphs_are_collected() {
        let doc = parse(":a: 1\n\nFirst line\nsecond line\n\n// comment\nSecond *para*\n");
        assert_eq!(doc.paragraphs, vec!["First line\nsecond line", "Second *para*"]);
    }

    #[test]
    fn test_locked_attributes_ignore_entries() {
        let mut attrs = AttributeMap::new();
        attrs.set_locked("experimental", "");
        let doc = Parser::new(":experimental!:\n", Path::new("."), &NullResolver, attrs)
            .parse()
            .unwrap();
        assert_eq!(doc.attributes.get("experimental"), Some(""));
    }

    #[test]
    fn test_doctype_entry_updates_derived_attributes() {
        let doc = Parser::new(":doctype: book\n", Path::new("."), &NullResolver, document_defaults())
            .parse()
            .unwrap();
        assert_eq!(doc.attributes.get("doctype"), Some("book"));
        assert!(doc.attributes.contains("doctype-book"));
        assert!(!doc.attributes.contains("doctype-article"));
    }

    #[test]
    fn test_conditionals_see_earlier_entries() {
        let text = ":flag:\nifdef::flag[:shown: yes]\nifndef::flag[:hidden: yes]\n";
        assert_eq!(
            user_attributes(text),
            pairs(&[("flag", ""), ("shown", "yes")])
        );
    }
}

/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Inline substitutions.
//!
//! Text is converted by running an ordered list of substitution steps over it.
//! Paragraph text goes through the full [`NORMAL_SUBS`] list; attribute entry
//! values go through [`HEADER_SUBS`]. When macros are part of the list,
//! passthroughs are pulled out before the first step and put back after the
//! last one, so their content is shielded from everything in between.

pub mod attributes;
pub mod macros;
pub mod passthrough;
pub mod quotes;
pub mod replacements;

use crate::attributes::AttributeMap;
use crate::backend::InlineBackend;
use once_cell::sync::Lazy;
use regex::Regex;

/// A single substitution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    SpecialCharacters,
    Quotes,
    Attributes,
    Replacements,
    Macros,
    PostReplacements,
}

/// Substitutions applied to paragraph text.
pub const NORMAL_SUBS: &[Substitution] = &[
    Substitution::SpecialCharacters,
    Substitution::Quotes,
    Substitution::Attributes,
    Substitution::Replacements,
    Substitution::Macros,
    Substitution::PostReplacements,
];

/// Substitutions applied to header text and attribute entry values.
pub const HEADER_SUBS: &[Substitution] = &[
    Substitution::SpecialCharacters,
    Substitution::Attributes,
];

/// Everything a substitution step may consult.
pub struct SubContext<'a> {
    pub attributes: &'a AttributeMap,
    pub backend: &'a dyn InlineBackend,
}

/// Parse a comma-separated substitution list such as `q,a` or
/// `quotes,macros`. Unknown names are skipped with a warning.
pub fn parse_subs(spec: &str) -> Vec<Substitution> {
    let mut subs = Vec::new();
    for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name {
            "none" => {}
            "n" | "normal" => subs.extend_from_slice(NORMAL_SUBS),
            "c" | "specialcharacters" | "specialchars" => {
                subs.push(Substitution::SpecialCharacters)
            }
            "q" | "quotes" => subs.push(Substitution::Quotes),
            "a" | "attributes" => subs.push(Substitution::Attributes),
            "r" | "replacements" => subs.push(Substitution::Replacements),
            "m" | "macros" => subs.push(Substitution::Macros),
            "p" | "post_replacements" => subs.push(Substitution::PostReplacements),
            other => tracing::warn!(substitution = %other, "unknown substitution"),
        }
    }
    subs
}

/// Run `subs` over `text` in order.
pub fn apply_subs(text: &str, subs: &[Substitution], ctx: &SubContext<'_>) -> String {
    if text.is_empty() || subs.is_empty() {
        return text.to_string();
    }

    let mut passthroughs = Vec::new();
    let mut result = if subs.contains(&Substitution::Macros) {
        passthrough::extract(text, &mut passthroughs)
    } else {
        text.to_string()
    };

    for sub in subs {
        result = match sub {
            Substitution::SpecialCharacters => escape_special_chars(&result),
            Substitution::Quotes => quotes::substitute_quotes(&result, ctx.backend),
            Substitution::Attributes => {
                attributes::substitute_attributes(&result, ctx.attributes)
            }
            Substitution::Replacements => replacements::substitute_replacements(&result),
            Substitution::Macros => macros::substitute_macros(&result, ctx),
            Substitution::PostReplacements => substitute_post_replacements(&result, ctx),
        };
    }

    if passthroughs.is_empty() {
        result
    } else {
        passthrough::restore(&result, &passthroughs, ctx)
    }
}

/// Escape `&`, `<` and `>`.
pub fn escape_special_chars(text: &str) -> String {
    if !text.contains(['&', '<', '>']) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// A line ending in ` +`.
static HARD_LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.*) \+$").unwrap());

fn substitute_post_replacements(text: &str, ctx: &SubContext<'_>) -> String {
    if ctx.attributes.contains("hardbreaks-option") {
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len().saturating_sub(1);
        return lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line = line.strip_suffix(" +").unwrap_or(line);
                if i < last {
                    ctx.backend.line_break(line)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    if !text.contains(" +") {
        return text.to_string();
    }

    HARD_LINE_BREAK
        .replace_all(text, |caps: &regex::Captures<'_>| ctx.backend.line_break(&caps[1]))
        .into_owned()
}

/// Is `c` a word character (letter, mark, digit, or connector punctuation)?
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DitaBackend;

    fn convert(text: &str) -> String {
        let attrs = AttributeMap::new();
        let ctx = SubContext {
            attributes: &attrs,
            backend: &DitaBackend,
        };
        apply_subs(text, NORMAL_SUBS, &ctx)
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape_special_chars("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_parse_subs() {
        assert_eq!(
            parse_subs("q, a"),
            vec![Substitution::Quotes, Substitution::Attributes]
        );
        assert_eq!(parse_subs("n"), NORMAL_SUBS.to_vec());
        assert!(parse_subs("none").is_empty());
    }

    #[test]
    fn test_header_subs_escape_and_resolve() {
        let mut attrs = AttributeMap::new();
        attrs.set("product", "Widget");
        let ctx = SubContext {
            attributes: &attrs,
            backend: &DitaBackend,
        };
        assert_eq!(
            apply_subs("{product} <Pro>", HEADER_SUBS, &ctx),
            "Widget &lt;Pro&gt;"
        );
    }

    #[test]
    fn test_entity_survives_double_processing() {
        // A value stored with header subs is converted again with normal subs.
        assert_eq!(convert("a &lt; b&#160;c"), "a &lt; b&#160;c");
    }

    #[test]
    fn test_hard_line_break() {
        assert_eq!(
            convert("first +\nsecond"),
            "first<ph outputclass=\"line-break\"/>\nsecond"
        );
    }
}

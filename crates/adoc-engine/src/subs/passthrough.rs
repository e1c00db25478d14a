/*
 * passthrough.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Inline passthroughs.
//!
//! `+++text+++` and `pass:[text]` pass their content through untouched;
//! `pass:q,a[text]` applies only the listed substitutions; `+text+` and
//! `++text++` apply only special character escaping. Passthrough content is
//! replaced by a numbered placeholder before the other substitutions run and
//! put back afterwards.

use super::{SubContext, Substitution, apply_subs, is_word_char, parse_subs};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const PLACEHOLDER_START: char = '\u{96}';
const PLACEHOLDER_END: char = '\u{97}';

/// `+++text+++` and `pass:subs[text]`, each optionally escaped.
static PASS_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\\)?(?:\+\+\+(.*?)\+\+\+|pass:([a-z,]*)\[(|.*?[^\\])\])").unwrap()
});

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new("\u{96}(\\d+)\u{97}").unwrap());

/// Content set aside during substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct Passthrough {
    pub text: String,
    pub subs: Vec<Substitution>,
}

/// Replace passthroughs in `text` with placeholders, storing their content.
pub fn extract(text: &str, store: &mut Vec<Passthrough>) -> String {
    let mut result = if text.contains("+++") || text.contains("pass:") {
        PASS_MACRO
            .replace_all(text, |caps: &Captures<'_>| {
                if caps.get(1).is_some() {
                    let literal = Passthrough {
                        text: caps[0][1..].to_string(),
                        subs: vec![Substitution::SpecialCharacters],
                    };
                    return placeholder(store, literal);
                }
                let passthrough = match caps.get(2) {
                    Some(content) => Passthrough {
                        text: content.as_str().to_string(),
                        subs: Vec::new(),
                    },
                    None => Passthrough {
                        text: caps[4].replace("\\]", "]"),
                        subs: parse_subs(&caps[3]),
                    },
                };
                placeholder(store, passthrough)
            })
            .into_owned()
    } else {
        text.to_string()
    };

    if result.contains('+') {
        result = extract_plus(&result, store);
    }
    result
}

/// Put stored passthrough content back, applying each one's substitutions.
pub fn restore(text: &str, store: &[Passthrough], ctx: &SubContext<'_>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            match caps[1].parse::<usize>().ok().and_then(|i| store.get(i)) {
                Some(passthrough) => apply_subs(&passthrough.text, &passthrough.subs, ctx),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn placeholder(store: &mut Vec<Passthrough>, passthrough: Passthrough) -> String {
    store.push(passthrough);
    format!("{PLACEHOLDER_START}{}{PLACEHOLDER_END}", store.len() - 1)
}

/// Extract `++text++` and `+text+`.
fn extract_plus(text: &str, store: &mut Vec<Passthrough>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut emitted = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('+') {
        let start = pos + offset;
        let delimiter = if text[start..].starts_with("++") { "++" } else { "+" };
        let before = text[..start].chars().next_back();
        let escaped = before == Some('\\');

        let boundary = escaped || !before.is_some_and(|c| is_word_char(c) || c == ';' || c == ':');
        let content_start = start + delimiter.len();
        let close = if boundary {
            find_close(text, content_start, delimiter)
        } else {
            None
        };

        let Some(content_end) = close else {
            pos = content_start;
            continue;
        };
        let end = content_end + delimiter.len();

        if escaped {
            out.push_str(&text[emitted..start - 1]);
            out.push_str(&text[start..end]);
        } else {
            out.push_str(&text[emitted..start]);
            out.push_str(&placeholder(
                store,
                Passthrough {
                    text: text[content_start..content_end].to_string(),
                    subs: vec![Substitution::SpecialCharacters],
                },
            ));
        }
        emitted = end;
        pos = end;
    }

    out.push_str(&text[emitted..]);
    out
}

fn find_close(text: &str, start: usize, delimiter: &str) -> Option<usize> {
    let first = text[start..].chars().next()?;
    if delimiter == "+" && first.is_whitespace() {
        return None;
    }

    let mut search = start + first.len_utf8();
    while let Some(offset) = text[search..].find(delimiter) {
        let found = search + offset;
        let last = text[..found].chars().next_back();
        let after = text[found + delimiter.len()..].chars().next();
        let inner_ok = delimiter == "++" || last.is_some_and(|c| !c.is_whitespace());
        if inner_ok && !after.is_some_and(is_word_char) {
            return Some(found);
        }
        search = found + delimiter.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::backend::DitaBackend;

    fn round_trip(text: &str) -> (String, Vec<Passthrough>) {
        let mut store = Vec::new();
        let extracted = extract(text, &mut store);
        (extracted, store)
    }

    #[test]
    fn test_triple_plus_is_raw() {
        let (text, store) = round_trip("a +++<b>raw</b>+++ b");
        assert_eq!(text, "a \u{96}0\u{97} b");
        assert_eq!(store[0].text, "<b>raw</b>");
        assert!(store[0].subs.is_empty());
    }

    #[test]
    fn test_pass_macro_with_subs() {
        let (_, store) = round_trip("pass:q[*x*]");
        assert_eq!(store[0].text, "*x*");
        assert_eq!(store[0].subs, vec![Substitution::Quotes]);
    }

    #[test]
    fn test_single_plus_needs_boundaries() {
        let (text, store) = round_trip("use +*literal*+ here");
        assert_eq!(text, "use \u{96}0\u{97} here");
        assert_eq!(store[0].subs, vec![Substitution::SpecialCharacters]);

        let (text, store) = round_trip("1 + 2 + 3 and C++ or C++");
        assert_eq!(text, "1 + 2 + 3 and C++ or C++");
        assert!(store.is_empty());
    }

    #[test]
    fn test_escaped_passthrough_is_literal() {
        let (text, store) = round_trip(r"\+++kept+++");
        assert_eq!(text, "\u{96}0\u{97}");
        assert_eq!(store[0].text, "+++kept+++");
        assert_eq!(store[0].subs, vec![Substitution::SpecialCharacters]);
    }

    #[test]
    fn test_restore_applies_subs() {
        let attrs = AttributeMap::new();
        let ctx = SubContext {
            attributes: &attrs,
            backend: &DitaBackend,
        };
        let store = vec![Passthrough {
            text: "<x>".to_string(),
            subs: vec![Substitution::SpecialCharacters],
        }];
        assert_eq!(restore("[\u{96}0\u{97}]", &store, &ctx), "[&lt;x&gt;]");
    }
}

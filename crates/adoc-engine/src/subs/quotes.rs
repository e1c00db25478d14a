/*
 * quotes.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Quoted text substitution: `*strong*`, `_emphasis_`, `` `mono` ``, `#mark#`,
//! `^super^`, `~sub~`, and curved quotes.
//!
//! Each rule is applied as its own pass over the text, in a fixed order, so
//! that `**` pairs are consumed before single `*` pairs. A rule matches when
//!
//! - an optional `[role]` attribute list is directly followed by the opening
//!   delimiter,
//! - for constrained rules, the opening is not preceded by a word character
//!   (or by one of a small set of punctuation characters), the content
//!   neither starts nor ends with whitespace, and the closing delimiter is not
//!   followed by a word character,
//! - for superscript and subscript, the content contains no whitespace at all.
//!
//! A backslash directly before the match escapes it: the backslash is removed
//! and the delimiters are kept as literal text.

use super::is_word_char;
use crate::backend::InlineBackend;

/// The kinds of quoted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Strong,
    Emphasis,
    Monospaced,
    Mark,
    Superscript,
    Subscript,
    DoubleQuoted,
    SingleQuoted,
}

/// Id and roles from a `[#id.role]` prefix on quoted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteAttributes {
    pub id: Option<String>,
    pub roles: Vec<String>,
}

impl QuoteAttributes {
    /// Parse the text between the brackets of a quoted text attribute list.
    ///
    /// Only the first positional attribute is considered. It may be a plain
    /// role (`big`) or a shorthand of `#id` and `.role` parts.
    pub fn parse(text: &str) -> Self {
        let first = text.split(',').next().unwrap_or_default().trim();
        let mut attrs = QuoteAttributes::default();
        if first.is_empty() {
            return attrs;
        }

        if !first.starts_with(['.', '#']) {
            attrs.roles = first.split_whitespace().map(str::to_string).collect();
            return attrs;
        }

        let mut current = String::new();
        let mut marker = ' ';
        for c in first.chars().chain(std::iter::once('.')) {
            if c == '.' || c == '#' {
                match marker {
                    '#' if !current.is_empty() => attrs.id = Some(std::mem::take(&mut current)),
                    '.' if !current.is_empty() => attrs.roles.push(std::mem::take(&mut current)),
                    _ => current.clear(),
                }
                marker = c;
            } else {
                current.push(c);
            }
        }
        attrs
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.roles.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Form {
    /// Delimiters may appear anywhere; content may be any non-empty text.
    Unconstrained,
    /// Delimiters must sit on word boundaries.
    Constrained {
        not_before: &'static str,
        not_after: &'static str,
    },
    /// Content may not contain whitespace.
    NoSpace,
}

#[derive(Debug, Clone, Copy)]
struct QuoteRule {
    kind: QuoteKind,
    open: &'static str,
    close: &'static str,
    form: Form,
}

const fn constrained(not_before: &'static str, not_after: &'static str) -> Form {
    Form::Constrained {
        not_before,
        not_after,
    }
}

const RULES: &[QuoteRule] = &[
    QuoteRule {
        kind: QuoteKind::Strong,
        open: "**",
        close: "**",
        form: Form::Unconstrained,
    },
    QuoteRule {
        kind: QuoteKind::Strong,
        open: "*",
        close: "*",
        form: constrained(";:}", ""),
    },
    QuoteRule {
        kind: QuoteKind::DoubleQuoted,
        open: "\"`",
        close: "`\"",
        form: constrained(";:}", ""),
    },
    QuoteRule {
        kind: QuoteKind::SingleQuoted,
        open: "'`",
        close: "`'",
        form: constrained(";:`}", "`"),
    },
    QuoteRule {
        kind: QuoteKind::Monospaced,
        open: "``",
        close: "``",
        form: Form::Unconstrained,
    },
    QuoteRule {
        kind: QuoteKind::Monospaced,
        open: "`",
        close: "`",
        form: constrained(";:\"'`}", "\"'`"),
    },
    QuoteRule {
        kind: QuoteKind::Emphasis,
        open: "__",
        close: "__",
        form: Form::Unconstrained,
    },
    QuoteRule {
        kind: QuoteKind::Emphasis,
        open: "_",
        close: "_",
        form: constrained(";:}", ""),
    },
    QuoteRule {
        kind: QuoteKind::Mark,
        open: "##",
        close: "##",
        form: Form::Unconstrained,
    },
    QuoteRule {
        kind: QuoteKind::Mark,
        open: "#",
        close: "#",
        form: constrained(";:}", ""),
    },
    QuoteRule {
        kind: QuoteKind::Superscript,
        open: "^",
        close: "^",
        form: Form::NoSpace,
    },
    QuoteRule {
        kind: QuoteKind::Subscript,
        open: "~",
        close: "~",
        form: Form::NoSpace,
    },
];

/// Apply every quote rule to `text`.
pub fn substitute_quotes(text: &str, backend: &dyn InlineBackend) -> String {
    let mut result = text.to_string();
    for rule in RULES {
        if result.contains(rule.open) {
            result = apply_rule(&result, rule, backend);
        }
    }
    result
}

fn apply_rule(text: &str, rule: &QuoteRule, backend: &dyn InlineBackend) -> String {
    let mut out = String::with_capacity(text.len());
    let mut emitted = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        let (open_at, attrs) = match attribute_list(rest, rule.open) {
            Some((len, attrs)) => (pos + len, Some(attrs)),
            None => (pos, None),
        };

        if !text[open_at..].starts_with(rule.open) {
            pos += c.len_utf8();
            continue;
        }

        let before = text[..pos].chars().next_back();
        let escaped = before == Some('\\');
        if let Form::Constrained { not_before, .. } = rule.form {
            if !escaped && before.is_some_and(|b| is_word_char(b) || not_before.contains(b)) {
                pos += c.len_utf8();
                continue;
            }
        }

        let content_start = open_at + rule.open.len();
        let Some(content_end) = find_close(text, content_start, rule) else {
            pos += c.len_utf8();
            continue;
        };
        let end = content_end + rule.close.len();

        if escaped {
            out.push_str(&text[emitted..pos - 1]);
            out.push_str(&text[pos..end]);
        } else {
            out.push_str(&text[emitted..pos]);
            let attrs = attrs.map(QuoteAttributes::parse).unwrap_or_default();
            out.push_str(&backend.quoted(rule.kind, &text[content_start..content_end], &attrs));
        }
        emitted = end;
        pos = end;
    }

    out.push_str(&text[emitted..]);
    out
}

/// Recognize `[attrs]` directly followed by `open`. Returns the length of the
/// bracketed list and its inner text.
fn attribute_list<'a>(rest: &'a str, open: &str) -> Option<(usize, &'a str)> {
    let inner = rest.strip_prefix('[')?;
    let close = inner.find(']')?;
    let attrs = &inner[..close];
    if attrs.is_empty() || attrs.contains('[') || !inner[close + 1..].starts_with(open) {
        return None;
    }
    Some((close + 2, attrs))
}

/// Find where the content of a quote starting at `start` ends, if it is closed.
fn find_close(text: &str, start: usize, rule: &QuoteRule) -> Option<usize> {
    let first = text[start..].chars().next()?;
    if !matches!(rule.form, Form::Unconstrained) && first.is_whitespace() {
        return None;
    }

    let mut search = start + first.len_utf8();
    while search <= text.len() {
        let found = search + text[search..].find(rule.close)?;
        match rule.form {
            Form::Unconstrained => return Some(found),
            Form::NoSpace => {
                return (!text[start..found].contains(char::is_whitespace)).then_some(found);
            }
            Form::Constrained { not_after, .. } => {
                let last = text[..found].chars().next_back();
                let after = text[found + rule.close.len()..].chars().next();
                let closes = last.is_some_and(|c| !c.is_whitespace())
                    && !after.is_some_and(|c| is_word_char(c) || not_after.contains(c));
                if closes {
                    return Some(found);
                }
                search = found + rule.close.len();
            }
        }
    }
    None
}

/*
 * replacements.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Typographic replacements: symbols, dashes, ellipses, arrows, apostrophes,
//! and restoration of entity references that special character escaping
//! turned into `&amp;...;`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// What part of the match survives around the replacement text.
#[derive(Debug, Clone, Copy)]
enum Restore {
    /// The whole match is replaced.
    None,
    /// The first group is kept before the replacement.
    Leading,
    /// The first and second groups are kept around the replacement.
    Bounding,
}

struct Replacement {
    pattern: Regex,
    replacement: &'static str,
    restore: Restore,
    /// A character that must follow the match for it to count.
    followed_by: Option<fn(char) -> bool>,
}

impl Replacement {
    fn new(pattern: &str, replacement: &'static str, restore: Restore) -> Self {
        Replacement {
            pattern: Regex::new(pattern).unwrap(),
            replacement,
            restore,
            followed_by: None,
        }
    }

    fn followed_by(mut self, predicate: fn(char) -> bool) -> Self {
        self.followed_by = Some(predicate);
        self
    }

    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if let Some(predicate) = self.followed_by {
                if !text[whole.end()..].chars().next().is_some_and(predicate) {
                    continue;
                }
            }
            out.push_str(&text[last..whole.start()]);
            out.push_str(&self.replace(&caps));
            last = whole.end();
        }

        out.push_str(&text[last..]);
        out
    }

    fn replace(&self, caps: &Captures<'_>) -> String {
        let whole = &caps[0];
        if whole.contains('\\') {
            return whole.replacen('\\', "", 1);
        }

        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        match self.restore {
            Restore::None => self.replacement.to_string(),
            Restore::Leading => format!("{}{}", group(1), self.replacement),
            Restore::Bounding => format!("{}{}{}", group(1), self.replacement, group(2)),
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

static REPLACEMENTS: Lazy<Vec<Replacement>> = Lazy::new(|| {
    vec![
        // (C) (R) (TM)
        Replacement::new(r"\\?\(C\)", "&#169;", Restore::None),
        Replacement::new(r"\\?\(R\)", "&#174;", Restore::None),
        Replacement::new(r"\\?\(TM\)", "&#8482;", Restore::None),
        // -- surrounded by spaces or line boundaries
        Replacement::new(
            r"(?m)(?:^|\n| |\\)--(?: |\n|$)",
            "&#8201;&#8212;&#8201;",
            Restore::None,
        ),
        // -- between word characters
        Replacement::new(r"(\w)\\?--", "&#8212;&#8203;", Restore::Leading).followed_by(is_word),
        Replacement::new(r"\\?\.\.\.", "&#8230;&#8203;", Restore::None),
        Replacement::new(r"\\?`'", "&#8217;", Restore::None),
        // apostrophe inside a word
        Replacement::new(r"([\p{L}\p{N}])\\?'", "&#8217;", Restore::Leading)
            .followed_by(char::is_alphabetic),
        Replacement::new(r"\\?-&gt;", "&#8594;", Restore::None),
        Replacement::new(r"\\?=&gt;", "&#8658;", Restore::None),
        Replacement::new(r"\\?&lt;-", "&#8592;", Restore::None),
        Replacement::new(r"\\?&lt;=", "&#8656;", Restore::None),
        // escaped entity references
        Replacement::new(
            r"\\?(&)amp;((?:[a-zA-Z][a-zA-Z]+\d{0,2}|#\d\d\d{0,4}|#x[\da-fA-F][\da-fA-F][\da-fA-F]{0,3});)",
            "",
            Restore::Bounding,
        ),
    ]
});

/// Apply the typographic replacements to `text`.
pub fn substitute_replacements(text: &str) -> String {
    let mut result = text.to_string();
    for replacement in REPLACEMENTS.iter() {
        result = replacement.apply(&result);
    }
    result
}

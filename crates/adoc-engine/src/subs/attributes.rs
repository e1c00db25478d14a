/*
 * attributes.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Attribute reference substitution (`{name}`).

use crate::attributes::AttributeMap;
use crate::defaults::intrinsic;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `{name}`, with optional escaping backslashes before the brace or the name end.
static ATTRIBUTE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\\)?\{(\w[\w-]*)(\\)?\}").unwrap());

/// What to do with a reference to an attribute that is not defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingMode {
    Skip,
    Drop,
    DropLine,
    Warn,
}

impl MissingMode {
    fn from_attributes(attrs: &AttributeMap) -> Self {
        match attrs.get("attribute-missing") {
            Some("drop") => MissingMode::Drop,
            Some("drop-line") => MissingMode::DropLine,
            Some("warn") => MissingMode::Warn,
            _ => MissingMode::Skip,
        }
    }
}

/// Replace attribute references in `text` with attribute values.
///
/// Names are looked up lower-cased, first in `attrs`, then among the intrinsic
/// character attributes. Unknown references are handled according to the
/// `attribute-missing` attribute. `\{name}` is left as the literal `{name}`.
pub fn substitute_attributes(text: &str, attrs: &AttributeMap) -> String {
    if !text.contains('{') {
        return text.to_string();
    }

    let mode = MissingMode::from_attributes(attrs);
    let mut lines = Vec::new();

    for line in text.split('\n') {
        let mut drop_line = false;
        let replaced = ATTRIBUTE_REFERENCE.replace_all(line, |caps: &Captures<'_>| {
            if caps.get(1).is_some() || caps.get(3).is_some() {
                return format!("{{{}}}", &caps[2]);
            }

            let name = caps[2].to_lowercase();
            if let Some(value) = attrs.get(&name).or_else(|| intrinsic(&name)) {
                return value.to_string();
            }

            match mode {
                MissingMode::Skip => caps[0].to_string(),
                MissingMode::Drop => String::new(),
                MissingMode::DropLine => {
                    drop_line = true;
                    String::new()
                }
                MissingMode::Warn => {
                    tracing::warn!(attribute = %name, "skipping reference to missing attribute");
                    caps[0].to_string()
                }
            }
        });

        if drop_line {
            tracing::debug!(line = %line, "dropping line containing reference to missing attribute");
        } else {
            lines.push(replaced.into_owned());
        }
    }

    lines.join("\n")
}

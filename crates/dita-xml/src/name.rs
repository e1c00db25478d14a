//! XML name validation.

/// Check whether `name` can be used as an element id.
///
/// Accepts an ASCII letter, `:` or `_` followed by any number of ASCII
/// letters, digits, `:`, `.`, `-` or `_`.
pub fn is_valid_id(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == ':' || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '-' | '_'))
}

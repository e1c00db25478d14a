//! Escaping of text for insertion into XML documents.

use quick_xml::escape::partial_escape;
use std::borrow::Cow;

/// Escape `&`, `<` and `>` for use in element content.
///
/// Quotes are left alone, so `"Big" title` stays readable in the output.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    partial_escape(text)
}

/*
 * backend.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Output vocabulary for inline nodes.
//!
//! The substitution steps find inline constructs and hand their pieces to an
//! [`InlineBackend`], which decides the markup they become. [`DitaBackend`]
//! produces DITA topic elements. All text passed to a backend has already been
//! through special character escaping.

use crate::subs::quotes::{QuoteAttributes, QuoteKind};

/// The flavor of a link produced by a URL, `link:` or `mailto:` macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Web,
    Email,
}

/// Converts inline nodes to output markup.
pub trait InlineBackend {
    /// Quoted text: strong, emphasis, monospace, and friends.
    fn quoted(&self, kind: QuoteKind, text: &str, attrs: &QuoteAttributes) -> String;

    /// A `kbd:[...]` key or key combination.
    fn keyboard(&self, keys: &[&str]) -> String;

    /// A `btn:[...]` label.
    fn button(&self, label: &str) -> String;

    /// A `menu:...[...]` selection path.
    fn menu(&self, menu: &str, submenus: &[&str], item: Option<&str>) -> String;

    /// An inline `image:target[alt]`.
    fn image(&self, target: &str, alt: &str) -> String;

    fn link(&self, target: &str, text: &str, kind: LinkKind) -> String;

    /// A cross reference. `href` is already translated to the output
    /// vocabulary; `text` is `None` when the reference had no link text.
    fn xref(&self, href: &str, text: Option<&str>) -> String;

    fn footnote(&self, text: &str) -> String;

    /// A line followed by a hard line break.
    fn line_break(&self, line: &str) -> String;

    /// A paragraph of converted inline content.
    fn paragraph(&self, content: &str) -> String;
}

/// Inline backend producing DITA elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct DitaBackend;

impl DitaBackend {
    fn common_attributes(attrs: &QuoteAttributes, default_class: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(id) = &attrs.id {
            out.push_str(&format!(" id=\"{}\"", escape_quotes(id)));
        }
        if !attrs.roles.is_empty() {
            out.push_str(&format!(
                " outputclass=\"{}\"",
                escape_quotes(&attrs.roles.join(" "))
            ));
        } else if let Some(class) = default_class {
            out.push_str(&format!(" outputclass=\"{class}\""));
        }
        out
    }
}

impl InlineBackend for DitaBackend {
    fn quoted(&self, kind: QuoteKind, text: &str, attrs: &QuoteAttributes) -> String {
        let (tag, default_class) = match kind {
            QuoteKind::Strong => ("b", None),
            QuoteKind::Emphasis => ("i", None),
            QuoteKind::Monospaced => ("codeph", None),
            QuoteKind::Superscript => ("sup", None),
            QuoteKind::Subscript => ("sub", None),
            QuoteKind::Mark => ("ph", Some("mark")),
            QuoteKind::DoubleQuoted | QuoteKind::SingleQuoted => {
                let (open, close) = if kind == QuoteKind::DoubleQuoted {
                    ("&#8220;", "&#8221;")
                } else {
                    ("&#8216;", "&#8217;")
                };
                let quoted = format!("{open}{text}{close}");
                return if attrs.is_empty() {
                    quoted
                } else {
                    format!("<ph{}>{quoted}</ph>", Self::common_attributes(attrs, None))
                };
            }
        };
        format!(
            "<{tag}{}>{text}</{tag}>",
            Self::common_attributes(attrs, default_class)
        )
    }

    fn keyboard(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| format!("<userinput>{key}</userinput>"))
            .collect::<Vec<_>>()
            .join("+")
    }

    fn button(&self, label: &str) -> String {
        format!("<uicontrol>{label}</uicontrol>")
    }

    fn menu(&self, menu: &str, submenus: &[&str], item: Option<&str>) -> String {
        let Some(item) = item else {
            return format!("<uicontrol>{menu}</uicontrol>");
        };
        let mut out = String::from("<menucascade>");
        for name in std::iter::once(menu).chain(submenus.iter().copied()).chain([item]) {
            out.push_str(&format!("<uicontrol>{name}</uicontrol>"));
        }
        out.push_str("</menucascade>");
        out
    }

    fn image(&self, target: &str, alt: &str) -> String {
        format!(
            "<image href=\"{}\" placement=\"inline\"><alt>{alt}</alt></image>",
            escape_quotes(target)
        )
    }

    fn link(&self, target: &str, text: &str, kind: LinkKind) -> String {
        let format = match kind {
            LinkKind::Web => "html",
            LinkKind::Email => "email",
        };
        format!(
            "<xref href=\"{}\" scope=\"external\" format=\"{format}\">{text}</xref>",
            escape_quotes(target)
        )
    }

    fn xref(&self, href: &str, text: Option<&str>) -> String {
        match text {
            Some(text) => format!("<xref href=\"{}\">{text}</xref>", escape_quotes(href)),
            None => format!("<xref href=\"{}\"/>", escape_quotes(href)),
        }
    }

    fn footnote(&self, text: &str) -> String {
        format!("<fn>{text}</fn>")
    }

    fn line_break(&self, line: &str) -> String {
        format!("{line}<ph outputclass=\"line-break\"/>")
    }

    fn paragraph(&self, content: &str) -> String {
        format!("<p>{content}</p>")
    }
}

/// Make already-escaped text safe inside a double-quoted attribute value.
fn escape_quotes(value: &str) -> String {
    value.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_elements() {
        let none = QuoteAttributes::default();
        assert_eq!(DitaBackend.quoted(QuoteKind::Strong, "a", &none), "<b>a</b>");
        assert_eq!(
            DitaBackend.quoted(QuoteKind::Mark, "a", &none),
            "<ph outputclass=\"mark\">a</ph>"
        );
        assert_eq!(
            DitaBackend.quoted(QuoteKind::DoubleQuoted, "a", &none),
            "&#8220;a&#8221;"
        );
    }

    #[test]
    fn test_role_becomes_outputclass() {
        let attrs = QuoteAttributes {
            id: None,
            roles: vec!["big".to_string()],
        };
        assert_eq!(
            DitaBackend.quoted(QuoteKind::Mark, "a", &attrs),
            "<ph outputclass=\"big\">a</ph>"
        );
        assert_eq!(
            DitaBackend.quoted(QuoteKind::Strong, "a", &attrs),
            "<b outputclass=\"big\">a</b>"
        );
    }

    #[test]
    fn test_menu_without_items() {
        assert_eq!(DitaBackend.menu("File", &[], None), "<uicontrol>File</uicontrol>");
        assert_eq!(
            DitaBackend.menu("File", &["Export"], Some("PDF")),
            "<menucascade><uicontrol>File</uicontrol><uicontrol>Export</uicontrol><uicontrol>PDF</uicontrol></menucascade>"
        );
    }

    #[test]
    fn test_link_href_quotes_are_escaped() {
        assert_eq!(
            DitaBackend.link("https://x.org/?q=\"a\"", "x", LinkKind::Web),
            "<xref href=\"https://x.org/?q=&quot;a&quot;\" scope=\"external\" format=\"html\">x</xref>"
        );
    }
}

/*
 * macros.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Inline macros.
//!
//! Macros are replaced one kind at a time, in this order: keyboard and button
//! macros, menus (both only when the `experimental` attribute is set), inline
//! images, URLs, `link:` and `mailto:` macros, bare email addresses,
//! footnotes, and cross references. A backslash directly before a macro keeps
//! it as literal text.

use super::SubContext;
use crate::backend::{InlineBackend, LinkKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `kbd:[keys]` and `btn:[label]`.
static KBD_BTN_MACRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(\\)?(kbd|btn):\[(.*?[^\\])\]").unwrap());

/// `menu:Name[Sub > Item]`.
static MENU_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\\)?menu:(\w|[\w&][^\n\[]*[^\s\[])\[ *(|.*?[^\\])\]").unwrap()
});

/// `"Menu > Sub > Item"`, after special character escaping.
static QUOTED_MENU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\\)?"([\w&][^"]*?[ \n]+&gt;[ \n]+[^"]*)""#).unwrap());

/// `image:target[attrs]`.
static IMAGE_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\\)?image:([^:\s\[](?:[^\n\[]*[^\s\[])?)\[(|.*?[^\\])\]").unwrap()
});

/// A URL, either followed by `[text]` or bare.
static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(^|link:|[ \t]|&lt;|[>\(\)\[\];'])(\\?(?:https?|file|ftp|irc)://)(?:([^\s\[\]]+)\[(|(?s:.*?)[^\\])\]|([^\s\[\]<]*[^\s,.?!\[\]<\)]))",
    )
    .unwrap()
});

/// `link:target[text]` and `mailto:address[text]`.
static LINK_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\\)?(?:link|(mailto)):(|[^:\s\[][^\s\[]*)\[(|.*?[^\\])\]").unwrap()
});

/// A bare email address, with the character before it when that character
/// marks the address as escaped or already linked.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\\>:/])?\w(?:&amp;|[\w\-.%+])*@[\p{L}\p{N}][\p{L}\p{N}_\-.]*\.[a-z]{2,5}\b")
        .unwrap()
});

/// `footnote:[text]` and `footnote:id[text]`.
static FOOTNOTE_MACRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(\\)?footnote:(\w[\w-]*)?\[(|.*?[^\\])\]").unwrap());

/// `<<id,text>>` (after escaping) and `xref:id[text]`.
static XREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)(\\)?(?:&lt;&lt;([\w"].*?)&gt;&gt;|xref:([\w"][^\s\[]*)\[(|.*?[^\\])\])"#)
        .unwrap()
});

/// Replace inline macros in `text`.
pub fn substitute_macros(text: &str, ctx: &SubContext<'_>) -> String {
    let backend = ctx.backend;
    let macroish = text.contains('[') && text.contains(':');
    let mut result = text.to_string();

    if ctx.attributes.contains("experimental") {
        if macroish && (result.contains("kbd:") || result.contains("btn:")) {
            result = keyboard_and_buttons(&result, backend);
        }
        if macroish && result.contains("menu:") {
            result = menus(&result, backend);
        }
        if result.contains('"') && result.contains("&gt;") {
            result = quoted_menus(&result, backend);
        }
    }

    if macroish && result.contains("image:") {
        result = images(&result, backend);
    }

    if result.contains("://") {
        result = urls(&result, ctx);
    }

    if macroish && (result.contains("link:") || result.contains("mailto:")) {
        result = link_macros(&result, ctx);
    }

    if result.contains('@') {
        result = emails(&result, backend);
    }

    if macroish && result.contains("footnote") {
        result = footnotes(&result, backend);
    }

    if result.contains("&lt;&lt;") || (macroish && result.contains("xref:")) {
        result = cross_references(&result, backend);
    }

    result
}

fn unescape_brackets(text: &str) -> String {
    text.replace("\\]", "]")
}

/// The match without its escaping backslash.
fn escaped_literal(caps: &Captures<'_>) -> String {
    caps[0][1..].to_string()
}

fn keyboard_and_buttons(text: &str, backend: &dyn InlineBackend) -> String {
    KBD_BTN_MACRO
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return escaped_literal(caps);
            }
            let content = unescape_brackets(&caps[3]);
            if &caps[2] == "kbd" {
                let keys = split_keys(content.trim());
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                backend.keyboard(&keys)
            } else {
                backend.button(content.trim())
            }
        })
        .into_owned()
}

/// Split a key combination on `,` or `+`. A doubled delimiter at the end
/// stands for the delimiter key itself.
fn split_keys(keys: &str) -> Vec<String> {
    if keys == "+" || keys == "," {
        return vec![keys.to_string()];
    }

    let delimiter = if keys.contains(',') { ',' } else { '+' };
    let doubled = format!("{delimiter}{delimiter}");
    let (body, trailing) = match keys.strip_suffix(&doubled) {
        Some(body) => (body, Some(delimiter.to_string())),
        None => (keys, None),
    };

    let mut split: Vec<String> = body.split(delimiter).map(|k| k.trim().to_string()).collect();
    split.extend(trailing);
    split
}

fn menus(text: &str, backend: &dyn InlineBackend) -> String {
    MENU_MACRO
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return escaped_literal(caps);
            }
            let menu = caps[2].trim();
            let items = unescape_brackets(&caps[3]);
            let items = items.trim();
            if items.is_empty() {
                return backend.menu(menu, &[], None);
            }

            let parts: Vec<&str> = if items.contains("&gt;") {
                items.split("&gt;").map(str::trim).collect()
            } else if items.contains(',') {
                items.split(',').map(str::trim).collect()
            } else {
                vec![items]
            };
            match parts.split_last() {
                Some((item, submenus)) => backend.menu(menu, submenus, Some(item)),
                None => backend.menu(menu, &[], None),
            }
        })
        .into_owned()
}

fn quoted_menus(text: &str, backend: &dyn InlineBackend) -> String {
    QUOTED_MENU
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return escaped_literal(caps);
            }
            let parts: Vec<&str> = caps[2].split("&gt;").map(str::trim).collect();
            match parts.split_first() {
                Some((menu, rest)) => match rest.split_last() {
                    Some((item, submenus)) => backend.menu(menu, submenus, Some(item)),
                    None => backend.menu(menu, &[], None),
                },
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn images(text: &str, backend: &dyn InlineBackend) -> String {
    IMAGE_MACRO
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return escaped_literal(caps);
            }
            let target = &caps[2];
            let attrlist = unescape_brackets(&caps[3]);

            let mut alt = None;
            for (index, part) in attrlist.split(',').map(str::trim).enumerate() {
                if let Some(value) = part.strip_prefix("alt=") {
                    alt = Some(strip_quotes(value).to_string());
                } else if index == 0 && !part.is_empty() && !part.contains('=') {
                    alt = Some(strip_quotes(part).to_string());
                }
            }
            let alt = alt.unwrap_or_else(|| default_alt(target));
            backend.image(target, &alt)
        })
        .into_owned()
}

/// Alt text derived from an image file name: `my-logo_v2.png` becomes `my logo v2`.
fn default_alt(target: &str) -> String {
    let name = target.rsplit('/').next().unwrap_or(target);
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    stem.replace(['-', '_'], " ")
}

fn urls(text: &str, ctx: &SubContext<'_>) -> String {
    URL.replace_all(text, |caps: &Captures<'_>| {
        let prefix = &caps[1];
        let scheme = &caps[2];
        if scheme.starts_with('\\') {
            return format!("{prefix}{}", &caps[0][prefix.len() + 1..]);
        }

        if let Some(target) = caps.get(3) {
            let href = format!("{scheme}{}", target.as_str());
            let mut link_text = link_text(&unescape_brackets(&caps[4]));
            if link_text.is_empty() {
                link_text = display_url(&href, ctx);
            }
            let prefix = if prefix == "link:" { "" } else { prefix };
            return format!(
                "{prefix}{}",
                ctx.backend.link(&href, &link_text, LinkKind::Web)
            );
        }

        let mut prefix = prefix;
        let mut href = format!("{scheme}{}", &caps[5]);
        if prefix == "&lt;" {
            if let Some(stripped) = href.strip_suffix("&gt;") {
                href = stripped.to_string();
                prefix = "";
            }
        }
        let display = display_url(&href, ctx);
        format!("{prefix}{}", ctx.backend.link(&href, &display, LinkKind::Web))
    })
    .into_owned()
}

fn link_macros(text: &str, ctx: &SubContext<'_>) -> String {
    LINK_MACRO
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return escaped_literal(caps);
            }
            let target = &caps[3];
            if target.is_empty() {
                return caps[0].to_string();
            }
            let text = link_text(&unescape_brackets(&caps[4]));

            if caps.get(2).is_some() {
                let href = format!("mailto:{target}");
                let text = if text.is_empty() { target.to_string() } else { text };
                ctx.backend.link(&href, &text, LinkKind::Email)
            } else {
                let text = if text.is_empty() {
                    display_url(target, ctx)
                } else {
                    text
                };
                ctx.backend.link(target, &text, LinkKind::Web)
            }
        })
        .into_owned()
}

fn emails(text: &str, backend: &dyn InlineBackend) -> String {
    EMAIL
        .replace_all(text, |caps: &Captures<'_>| match caps.get(1).map(|m| m.as_str()) {
            Some("\\") => escaped_literal(caps),
            Some(_) => caps[0].to_string(),
            None => {
                let address = &caps[0];
                backend.link(&format!("mailto:{address}"), address, LinkKind::Email)
            }
        })
        .into_owned()
}

fn footnotes(text: &str, backend: &dyn InlineBackend) -> String {
    FOOTNOTE_MACRO
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return escaped_literal(caps);
            }
            let content = unescape_brackets(&caps[3]);
            let content = content.trim();
            match caps.get(2) {
                _ if !content.is_empty() => backend.footnote(content),
                Some(id) => backend.xref(&format!("#./{}", id.as_str()), None),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn cross_references(text: &str, backend: &dyn InlineBackend) -> String {
    XREF.replace_all(text, |caps: &Captures<'_>| {
        if caps.get(1).is_some() {
            return escaped_literal(caps);
        }

        let (target, label) = match caps.get(2) {
            Some(inner) => match inner.as_str().split_once(',') {
                Some((id, label)) => (id.trim().to_string(), label.trim().to_string()),
                None => (inner.as_str().trim().to_string(), String::new()),
            },
            None => (
                caps[3].trim().to_string(),
                unescape_brackets(&caps[4]).trim().to_string(),
            ),
        };

        let label = strip_quotes(&label);
        let label = (!label.is_empty()).then_some(label);
        backend.xref(&xref_href(strip_quotes(&target)), label)
    })
    .into_owned()
}

/// Translate a cross reference target to a DITA href. Bare ids point into
/// the current topic; `doc.adoc#id` points at the converted `doc.dita`.
fn xref_href(target: &str) -> String {
    let (path, fragment) = match target.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None if target.ends_with(".adoc") => (target, None),
        None => ("", Some(target)),
    };

    if path.is_empty() {
        return format!("#./{}", fragment.unwrap_or_default());
    }

    let path = match path.strip_suffix(".adoc") {
        Some(stem) => format!("{stem}.dita"),
        None => path.to_string(),
    };
    match fragment {
        Some(fragment) if !fragment.is_empty() => format!("{path}#{fragment}"),
        _ => path,
    }
}

/// Link text from a macro's attribute list: the first positional attribute,
/// unquoted, without the trailing `^` window shorthand.
fn link_text(raw: &str) -> String {
    let raw = raw.trim();
    let text = if let Some(rest) = raw.strip_prefix('"') {
        rest.find('"').map_or(rest, |end| &rest[..end])
    } else if raw.contains('=') {
        raw.split(',')
            .next()
            .filter(|first| !first.contains('='))
            .unwrap_or_default()
    } else {
        raw
    };
    let text = text.trim();
    text.strip_suffix('^').unwrap_or(text).to_string()
}

/// How a URL is shown when a link has no text of its own.
fn display_url(url: &str, ctx: &SubContext<'_>) -> String {
    if !ctx.attributes.contains("hide-uri-scheme") {
        return url.to_string();
    }
    match url.split_once("://") {
        Some((_, rest)) => rest.to_string(),
        None => url.strip_prefix("mailto:").unwrap_or(url).to_string(),
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::backend::DitaBackend;

    fn macros_with(text: &str, names: &[&str]) -> String {
        let attrs: AttributeMap = names.iter().map(|n| (*n, "")).collect();
        let ctx = SubContext {
            attributes: &attrs,
            backend: &DitaBackend,
        };
        substitute_macros(text, &ctx)
    }

    fn macros(text: &str) -> String {
        macros_with(text, &["experimental"])
    }

    #[test]
    fn test_keyboard() {
        assert_eq!(
            macros("press kbd:[Ctrl+T]"),
            "press <userinput>Ctrl</userinput>+<userinput>T</userinput>"
        );
        assert_eq!(
            macros("kbd:[Ctrl++]"),
            "<userinput>Ctrl</userinput>+<userinput>+</userinput>"
        );
    }

    #[test]
    fn test_ui_macros_need_experimental() {
        assert_eq!(macros_with("btn:[OK]", &[]), "btn:[OK]");
        assert_eq!(macros("btn:[OK]"), "<uicontrol>OK</uicontrol>");
    }

    #[test]
    fn test_menu() {
        assert_eq!(
            macros("menu:File[Save &gt; As]"),
            "<menucascade><uicontrol>File</uicontrol><uicontrol>Save</uicontrol><uicontrol>As</uicontrol></menucascade>"
        );
        assert_eq!(
            macros("\"File &gt; Quit\""),
            "<menucascade><uicontrol>File</uicontrol><uicontrol>Quit</uicontrol></menucascade>"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            macros("image:icons/my-logo_v2.png[]"),
            "<image href=\"icons/my-logo_v2.png\" placement=\"inline\"><alt>my logo v2</alt></image>"
        );
        assert_eq!(
            macros("image:logo.png[Logo,32]"),
            "<image href=\"logo.png\" placement=\"inline\"><alt>Logo</alt></image>"
        );
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            macros("see https://example.com[Example^]"),
            "see <xref href=\"https://example.com\" scope=\"external\" format=\"html\">Example</xref>"
        );
        assert_eq!(
            macros("at https://example.com."),
            "at <xref href=\"https://example.com\" scope=\"external\" format=\"html\">https://example.com</xref>."
        );
        assert_eq!(
            macros("&lt;https://example.com&gt;"),
            "<xref href=\"https://example.com\" scope=\"external\" format=\"html\">https://example.com</xref>"
        );
        assert_eq!(macros(r"\https://example.com"), "https://example.com");
    }

    #[test]
    fn test_hide_uri_scheme() {
        assert_eq!(
            macros_with("https://example.com", &["hide-uri-scheme"]),
            "<xref href=\"https://example.com\" scope=\"external\" format=\"html\">example.com</xref>"
        );
    }

    #[test]
    fn test_link_and_mailto() {
        assert_eq!(
            macros("link:guide.html[the guide]"),
            "<xref href=\"guide.html\" scope=\"external\" format=\"html\">the guide</xref>"
        );
        assert_eq!(
            macros("mailto:help@example.com[Help]"),
            "<xref href=\"mailto:help@example.com\" scope=\"external\" format=\"email\">Help</xref>"
        );
    }

    #[test]
    fn test_bare_email() {
        assert_eq!(
            macros("write to help@example.com"),
            "write to <xref href=\"mailto:help@example.com\" scope=\"external\" format=\"email\">help@example.com</xref>"
        );
        assert_eq!(macros(r"\help@example.com"), "help@example.com");
    }

    #[test]
    fn test_footnote() {
        assert_eq!(macros("text.footnote:[More info.]"), "text.<fn>More info.</fn>");
    }

    #[test]
    fn test_cross_references() {
        assert_eq!(
            macros("&lt;&lt;install,Installing&gt;&gt;"),
            "<xref href=\"#./install\">Installing</xref>"
        );
        assert_eq!(macros("&lt;&lt;install&gt;&gt;"), "<xref href=\"#./install\"/>");
        assert_eq!(
            macros("xref:setup.adoc#prereq[Prerequisites]"),
            "<xref href=\"setup.dita#prereq\">Prerequisites</xref>"
        );
    }

    #[test]
    fn test_split_keys() {
        assert_eq!(split_keys("Ctrl, Shift, N"), vec!["Ctrl", "Shift", "N"]);
        assert_eq!(split_keys("+"), vec!["+"]);
    }
}

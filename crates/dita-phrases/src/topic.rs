/*
 * topic.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Assembly of the DITA concept topic.

use crate::config::{Config, Layout};
use crate::error::{PhraseError, Result};
use crate::generator::Phrase;
use dita_xml::{XmlDocument, escape_text, is_valid_id};

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8' ?>";
const DOCTYPE: &str =
    r#"<!DOCTYPE concept PUBLIC "-//OASIS//DTD DITA Concept//EN" "concept.dtd">"#;

/// Render the topic as text, one element per line, ending with a newline.
pub fn render(config: &Config, phrases: &[Phrase]) -> String {
    let mut lines = vec![
        XML_DECLARATION.to_string(),
        DOCTYPE.to_string(),
        format!(r#"<concept id="{}">"#, config.id),
        format!("  <title>{}</title>", escape_text(&config.title)),
        "  <conbody>".to_string(),
    ];

    match config.layout {
        Layout::List => {
            lines.push("    <ul>".to_string());
            lines.extend(phrases.iter().map(|p| format!("      <li>{}</li>", phrase(p))));
            lines.push("    </ul>".to_string());
        }
        Layout::Paragraph => {
            lines.extend(phrases.iter().map(|p| format!("    <p>{}</p>", phrase(p))));
        }
    }

    lines.push("  </conbody>".to_string());
    lines.push("</concept>".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn phrase(phrase: &Phrase) -> String {
    if !is_valid_id(&phrase.name) {
        tracing::warn!(attribute = %phrase.name, "attribute name is not a valid XML ID");
    }
    format!(r#"<ph id="{}">{}</ph>"#, phrase.name, phrase.value)
}

/// Render the topic and check that it is well-formed.
pub fn render_checked(config: &Config, phrases: &[Phrase]) -> Result<String> {
    let topic = render(config, phrases);
    check(&topic)?;
    Ok(topic)
}

/// Check a rendered topic.
pub fn check(topic: &str) -> Result<XmlDocument> {
    dita_xml::check(topic).map_err(PhraseError::MalformedTopic)
}

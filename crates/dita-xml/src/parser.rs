//! Well-formedness checker that builds an [`XmlDocument`] tree.

use crate::{Error, Result, XmlAttribute, XmlChild, XmlDocument, XmlElement};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

/// Check that `content` is a well-formed XML document and return its tree.
///
/// Comments, processing instructions and the XML declaration are skipped.
/// The DOCTYPE declaration is kept verbatim on the returned document.
///
/// # Example
///
/// ```rust
/// use dita_xml::check;
///
/// let doc = check(r#"<concept id="a"><title>T</title></concept>"#).unwrap();
/// assert_eq!(doc.root.name, "concept");
/// assert_eq!(doc.root.get_attribute("id"), Some("a"));
/// ```
///
/// # Errors
///
/// Returns an error if the document is malformed, empty, or has more than
/// one root element.
pub fn check(content: &str) -> Result<XmlDocument> {
    let mut checker = XmlChecker::new(content);
    checker.run()
}

/// Check that `fragment` is well-formed mixed content, as it would appear
/// inside an element. The fragment may contain text and any number of
/// sibling elements.
///
/// # Errors
///
/// Returns an error if the fragment is malformed.
pub fn check_fragment(fragment: &str) -> Result<Vec<XmlChild>> {
    let wrapped = format!("<fragment>{}</fragment>", fragment);
    let doc = check(&wrapped)?;
    Ok(doc.root.children)
}

struct XmlChecker<'a> {
    reader: Reader<&'a [u8]>,

    /// Elements opened but not yet closed.
    stack: Vec<XmlElement>,
}

impl<'a> XmlChecker<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            stack: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<XmlDocument> {
        let mut root: Option<XmlElement> = None;
        let mut doctype: Option<String> = None;

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let element = self.open_element(&e)?;
                    if self.stack.is_empty() && root.is_some() {
                        return Err(Error::MultipleRoots);
                    }
                    self.stack.push(element);
                }
                Ok(Event::End(e)) => {
                    let end_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    let element = self
                        .stack
                        .pop()
                        .ok_or_else(|| Error::UnexpectedEndTag(end_name.clone()))?;

                    if element.name != end_name {
                        return Err(Error::MismatchedEndTag {
                            expected: element.name,
                            found: end_name,
                        });
                    }

                    self.attach(element, &mut root)?;
                }
                Ok(Event::Empty(e)) => {
                    let element = self.open_element(&e)?;
                    self.attach(element, &mut root)?;
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(&e)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    if let Some(node) = self.stack.last_mut() {
                        node.children.push(XmlChild::Text(text));
                    }
                }
                Ok(Event::DocType(e)) => {
                    doctype = Some(String::from_utf8_lossy(&e).trim().to_string());
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::malformed(e, Some(self.reader.error_position())));
                }
            }
        }

        if let Some(node) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", node.name),
            });
        }

        let root = root.ok_or(Error::EmptyDocument)?;
        Ok(XmlDocument { root, doctype })
    }

    fn open_element(&self, e: &BytesStart<'_>) -> Result<XmlElement> {
        let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));

        for attr in e.attributes() {
            let offset = Some(self.reader.buffer_position());
            let attr = attr.map_err(|err| Error::malformed(err, offset))?;
            let value = attr
                .unescape_value()
                .map_err(|err| Error::malformed(format!("attribute value: {err}"), offset))?;
            element.attributes.push(XmlAttribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                value: value.into_owned(),
            });
        }

        Ok(element)
    }

    fn attach(&mut self, element: XmlElement, root: &mut Option<XmlElement>) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(XmlChild::Element(element));
                Ok(())
            }
            None if root.is_some() => Err(Error::MultipleRoots),
            None => {
                *root = Some(element);
                Ok(())
            }
        }
    }

    fn handle_text(&mut self, e: &BytesText<'_>) -> Result<()> {
        let text = e.unescape().map_err(|err| {
            Error::malformed(
                format!("text content: {err}"),
                Some(self.reader.buffer_position()),
            )
        })?;

        match self.stack.last_mut() {
            Some(node) => {
                node.children.push(XmlChild::Text(text.into_owned()));
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(Error::TextOutsideRoot(text.trim().to_string())),
        }
    }
}

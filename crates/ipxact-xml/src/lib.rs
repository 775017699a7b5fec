#![cfg_attr(docsrs, feature(doc_cfg))]
//! Load IP-XACT / SPIRIT documents into an owned element tree using
//! quick-xml, and pretty print element trees back to text.

mod element;
mod writer;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;
use tracing::trace;

pub use element::Element;

/// SPIRIT consortium namespace of IP-XACT 1685-2009 documents.
pub const SPIRIT_1685_2009: &str =
    "http://www.spiritconsortium.org/XMLSchema/SPIRIT/1685-2009";

/// Default indentation width for [`Element::to_pretty_string`].
pub const DEFAULT_INDENT: usize = 2;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error("write: {0}")]
    Write(String),
}

/// Parse a complete XML document and return its root element.
///
/// Namespace prefixes are resolved while reading, so every element carries
/// the namespace URI it is bound to rather than the prefix used in the text.
pub fn parse(xml: &str) -> Result<Element, XmlError> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                open.push(open_element(ns, &e)?);
            }
            Ok((ns, Event::Empty(e))) => {
                let element = open_element(ns, &e)?;
                close_element(&mut open, &mut root, element)?;
            }
            Ok((_, Event::End(_))) => {
                let element = open
                    .pop()
                    .ok_or_else(|| XmlError::Invalid("unbalanced end tag".into()))?;
                close_element(&mut open, &mut root, element)?;
            }
            Ok((_, Event::Text(t))) => {
                if let Some(current) = open.last_mut() {
                    let text = t.unescape().map_err(|err| XmlError::Xml(err.to_string()))?;
                    current.append_text(&text);
                }
            }
            Ok((_, Event::CData(c))) => {
                if let Some(current) = open.last_mut() {
                    let bytes = c.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| XmlError::Xml(format!("invalid UTF-8: {err}")))?;
                    current.append_text(text);
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(err) => return Err(XmlError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(XmlError::Invalid(format!(
            "element '{}' is not closed",
            unclosed.name()
        )));
    }
    root.ok_or_else(|| XmlError::Invalid("document has no root element".into()))
}

fn open_element(ns: ResolveResult<'_>, event: &BytesStart<'_>) -> Result<Element, XmlError> {
    let local = std::str::from_utf8(event.local_name().as_ref())
        .map_err(|err| XmlError::Xml(format!("invalid UTF-8 in tag name: {err}")))?
        .to_string();
    let mut element = match ns {
        ResolveResult::Bound(Namespace(uri)) => {
            Element::with_namespace(String::from_utf8_lossy(uri).into_owned(), local)
        }
        ResolveResult::Unbound => Element::new(local),
        ResolveResult::Unknown(prefix) => {
            return Err(XmlError::Xml(format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )))
        }
    };
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        element.set_attribute(key, value.into_owned());
    }
    trace!(
        tag = element.name(),
        namespace = element.namespace().unwrap_or(""),
        "open element"
    );
    Ok(element)
}

fn close_element(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = open.last_mut() {
        parent.push_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::Invalid(format!(
            "second root element '{}'",
            element.name()
        )));
    }
    *root = Some(element);
    Ok(())
}

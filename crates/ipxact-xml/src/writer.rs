use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{Element, XmlError};

impl Element {
    /// Serialize the tree rooted at this element as indented XML.
    ///
    /// Tags are written by local name without a namespace prefix. Elements
    /// with neither text nor children are self-closed. No XML declaration is
    /// emitted and the output ends with a newline.
    pub fn to_pretty_string(&self, indent: usize) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);
        write_element(&mut writer, self)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|err| XmlError::Write(format!("invalid UTF-8: {err}")))
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        let value = escape_attribute(value);
        start.push_attribute((key.as_bytes(), value.as_bytes()));
    }

    if element.children().is_empty() && element.text().is_none() {
        return emit(writer, Event::Empty(start));
    }

    let end = start.to_end().into_owned();
    emit(writer, Event::Start(start))?;
    if let Some(text) = element.text() {
        emit(writer, Event::Text(BytesText::new(text)))?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    emit(writer, Event::End(end))
}

/// Escape markup characters and write tab, LF and CR as character
/// references, since readers normalize literal attribute whitespace to spaces.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\t', '\n', '\r']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|err| XmlError::Write(err.to_string()))
}

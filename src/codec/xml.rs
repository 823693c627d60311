//! Minimal XML element tree
//!
//! Parsing keeps elements, attributes, text and CDATA; comments, processing
//! instructions and doctypes are dropped. A document must have exactly one
//! root element and no text outside it.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Document has no root element")]
    NoRoot,

    #[error("Junk after document element: <{0}>")]
    MultipleRoots(String),

    #[error("Text outside the root element")]
    TextOutsideRoot,

    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    #[error("Failed to write XML: {0}")]
    Write(#[from] std::io::Error),

    #[error("XML output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An element holding a single text child
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
    } else if root.is_some() {
        return Err(XmlError::MultipleRoots(element.name));
    } else {
        *root = Some(element);
    }
    Ok(())
}

/// Keeps text verbatim; whitespace-only runs are layout and get dropped
fn push_text(stack: &mut [XmlElement], text: String) -> Result<(), XmlError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(text));
            Ok(())
        }
        None => Err(XmlError::TextOutsideRoot),
    }
}

/// Parses a complete XML document
pub fn parse(text: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(XmlElement::from_start(&e)?),
            Event::Empty(e) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(XmlError::NoRoot)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => push_text(&mut stack, e.unescape()?.into_owned())?,
            Event::CData(e) => {
                push_text(&mut stack, String::from_utf8_lossy(&e.into_inner()).into_owned())?
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(inner) => write_element(writer, inner)?,
            XmlNode::Text(text) => {
                let escaped = partial_escape(text.as_str());
                writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Serializes with 2-space indentation, optionally preceded by a declaration
pub fn render(root: &XmlElement, declaration: bool) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    if declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    }
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_document() {
        let root = parse(r#"<?xml version="1.0"?><shots count="2"><shot id="a">Intro &amp; titles</shot><shot id="b"/></shots>"#).unwrap();
        assert_eq!(root.name, "shots");
        assert_eq!(root.attributes, vec![("count".to_string(), "2".to_string())]);
        assert_eq!(root.children.len(), 2);
        match &root.children[0] {
            XmlNode::Element(shot) => assert_eq!(shot.text(), "Intro & titles"),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse("just some words").is_err());
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("<a>").is_err());
        assert!(parse("<a/><b/>").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn renders_indented_with_declaration() {
        let root = parse("<root><item>1</item><item>2</item><empty/></root>").unwrap();
        let xml = render(&root, true).unwrap();
        let lines: Vec<&str> = xml.lines().collect();
        assert!(lines[0].starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert_eq!(lines[1], "<root>");
        assert_eq!(lines[2], "  <item>1</item>");
        assert_eq!(lines[3], "  <item>2</item>");
        assert_eq!(lines[5], "</root>");
    }

    #[test]
    fn escapes_text_on_render() {
        let root = XmlElement::with_text("data", "a < b & c");
        let xml = render(&root, false).unwrap();
        assert_eq!(xml, "<data>a &lt; b &amp; c</data>");
        assert_eq!(parse(&xml).unwrap().text(), "a < b & c");

        let quoted = render(&XmlElement::with_text("line", r#"It's "done""#), false).unwrap();
        assert_eq!(quoted, r#"<line>It's "done"</line>"#);
    }

    #[test]
    fn mixed_content_is_preserved() {
        let root = parse("<p>Hello <b>world</b> again</p>").unwrap();
        assert_eq!(root.text(), "Hello  again");
        assert_eq!(render(&root, false).unwrap(), "<p>Hello <b>world</b> again</p>");
    }

    #[test]
    fn padded_text_is_kept() {
        let root = parse("<name>  John  Smith </name>").unwrap();
        assert_eq!(root.text(), "  John  Smith ");
        assert_eq!(render(&root, false).unwrap(), "<name>  John  Smith </name>");
    }

    #[test]
    fn layout_whitespace_is_dropped() {
        let root = parse("<a>\n  <b>1</b>\n  <c/>\n</a>\n").unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(render(&root, false).unwrap(), "<a>\n  <b>1</b>\n  <c/>\n</a>");
    }
}

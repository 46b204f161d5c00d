//! Owned XML element tree built from quick-xml events
//!
//! Workbook documents are small enough to hold in memory, and the extractors
//! need random access to subtrees (first descendant, direct children, etc.),
//! so the event stream is folded into a plain tree once up front.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::slice;

use crate::error::{ParseError, Result};

/// A single XML element with its attributes, leading text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Text that appears before the first child element (trimmed)
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Raw attribute value, including empty strings
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, treating an empty string as absent
    pub fn non_empty_attr(&self, key: &str) -> Option<&str> {
        self.attr(key).filter(|v| !v.is_empty())
    }

    /// Check whether an attribute is present with exactly the given value
    pub fn attr_is(&self, key: &str, value: &str) -> bool {
        self.attr(key) == Some(value)
    }

    /// Leading text content, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First direct child with the given tag
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given tag, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All descendants in document (pre-)order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// First descendant with the given tag
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }

    /// All descendants with the given tag, in document order
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.descendants().filter(move |e| e.name == name)
    }
}

/// Pre-order iterator over the descendants of an element
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(element) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Parse a complete XML document and return its root element
pub fn parse_document(xml: &str) -> Result<Element> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::malformed(reader.error_position() as u64, e.to_string()))?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Start(e) => open.push(element_from_start(&e, position)?),
            Event::Empty(e) => {
                let element = element_from_start(&e, position)?;
                attach(&mut open, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| ParseError::malformed(position, "unexpected end tag"))?;
                attach(&mut open, &mut root, element, position)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| ParseError::malformed(position, e.to_string()))?;
                push_text(&mut open, &text, position)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                push_text(&mut open, &text, position)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no metadata
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(ParseError::malformed(
            reader.buffer_position() as u64,
            format!("unexpected end of document: <{}> is not closed", unclosed.name),
        ));
    }

    root.ok_or_else(|| ParseError::malformed(0, "document has no root element"))
}

fn element_from_start(start: &BytesStart, position: u64) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::malformed(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::malformed(position, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<()> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::malformed(
            position,
            format!("multiple root elements: <{}>", element.name),
        ));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(open: &mut [Element], text: &str, position: u64) -> Result<()> {
    let Some(current) = open.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(ParseError::malformed(position, "text outside of root element"));
    };

    // Only leading text is kept; text following a child element is ignored
    if !current.children.is_empty() {
        return Ok(());
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    match current.text.as_mut() {
        Some(existing) => existing.push_str(text),
        None => current.text = Some(text.to_string()),
    }
    Ok(())
}

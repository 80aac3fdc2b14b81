//! Generic XML decoding into a navigable tree.
//!
//! The search API answers with small XML documents. Rather than binding each
//! response to a fixed struct, the body is decoded into an [`XmlValue`] tree
//! that callers walk by element name:
//!
//! - an element with only text becomes [`XmlValue::Text`]
//! - an element with child elements becomes [`XmlValue::Element`]
//! - repeated sibling elements with the same name collapse into [`XmlValue::List`]
//!
//! A single child is never wrapped in a one-element list, so consumers must be
//! prepared to see either shape for repeated elements.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::client::ClientError;

/// A decoded XML node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// Text content of a leaf element (empty for `<tag/>`)
    Text(String),
    /// Child elements keyed by element name
    Element(BTreeMap<String, XmlValue>),
    /// Repeated sibling elements, in document order
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Look up a child element by name.
    ///
    /// Returns `None` for missing children and for text or list nodes.
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        match self {
            XmlValue::Element(children) => children.get(name),
            _ => None,
        }
    }

    /// Text content, if this node is a leaf.
    pub fn text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Build an element node from `(name, value)` pairs.
    pub fn element<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, XmlValue)>,
        K: Into<String>,
    {
        XmlValue::Element(
            children
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Build a text node.
    pub fn text_node(text: impl Into<String>) -> Self {
        XmlValue::Text(text.into())
    }
}

/// An element that has been opened but not yet closed.
struct Frame {
    name: String,
    text: String,
    children: BTreeMap<String, XmlValue>,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            text: String::new(),
            children: BTreeMap::new(),
        }
    }

    fn finish(self) -> (String, XmlValue) {
        // Mixed content keeps the elements and drops the stray text.
        let value = if self.children.is_empty() {
            XmlValue::Text(self.text.trim().to_string())
        } else {
            XmlValue::Element(self.children)
        };
        (self.name, value)
    }
}

fn insert_child(children: &mut BTreeMap<String, XmlValue>, name: String, value: XmlValue) {
    match children.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            XmlValue::List(items) => items.push(value),
            existing => {
                let first = std::mem::replace(existing, XmlValue::List(Vec::new()));
                *existing = XmlValue::List(vec![first, value]);
            }
        },
    }
}

fn close(
    stack: &mut [Frame],
    root: &mut Option<XmlValue>,
    frame: Frame,
) -> Result<(), ClientError> {
    let (name, value) = frame.finish();
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None => {
            if root.is_some() {
                return Err(ClientError::Decode(format!(
                    "unexpected second root element <{}>",
                    name
                )));
            }
            *root = Some(value);
        }
    }
    Ok(())
}

/// Decode an XML document into a tree.
///
/// The root element's name is dropped; the returned value is its content.
/// Attributes, comments and processing instructions are ignored.
pub fn decode(xml: &str) -> Result<XmlValue, ClientError> {
    // Text is trimmed per element in `Frame::finish`, so whitespace next to
    // CDATA sections and entities survives.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<XmlValue> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => stack.push(Frame::open(e)),
            Event::Empty(ref e) => {
                let frame = Frame::open(e);
                close(&mut stack, &mut root, frame)?;
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ClientError::Decode("unexpected closing tag".to_string()))?;
                close(&mut stack, &mut root, frame)?;
            }
            Event::Text(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ClientError::Decode(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| ClientError::Decode("document has no root element".to_string()))
}

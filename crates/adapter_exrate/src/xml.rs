//! Generic XML to field-tree conversion.
//!
//! First stage of the feed parser. Knows nothing about exchange rates:
//! attributes and child elements are flattened into one ordered field list,
//! repeated names collapse into [`XmlValue::Many`], and leaf elements become
//! plain text. Shape normalization (one vs. many) lives in [`XmlValue::items`].

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::ExrateError;

/// A field value in the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    /// Attribute value or leaf element text
    Text(String),
    /// Element with attributes and/or child elements
    Node(XmlNode),
    /// Same field name seen more than once, in document order
    Many(Vec<XmlValue>),
}

impl XmlValue {
    /// Text content, if this value is a leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Node content, if this value is a single element with fields.
    pub fn as_node(&self) -> Option<&XmlNode> {
        match self {
            XmlValue::Node(node) => Some(node),
            _ => None,
        }
    }

    /// View the value as a sequence.
    ///
    /// A single occurrence is wrapped into a one-element slice, so callers
    /// never need to care whether upstream sent one item or many.
    pub fn items(&self) -> &[XmlValue] {
        match self {
            XmlValue::Many(values) => values.as_slice(),
            single => std::slice::from_ref(single),
        }
    }
}

/// An element with its attributes and children flattened into fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    fields: Vec<(String, XmlValue)>,
    text: Option<String>,
}

impl XmlNode {
    /// Look up a field by exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Text content of a leaf field.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(XmlValue::as_text)
    }

    /// Mixed text content of an element that also carries fields.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Field names in first-seen order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Whether the element carried no attributes or children.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a field, merging a repeated name into [`XmlValue::Many`].
    fn insert(&mut self, name: String, value: XmlValue) {
        match self.fields.iter().position(|(key, _)| *key == name) {
            Some(index) => match &mut self.fields[index].1 {
                XmlValue::Many(values) => values.push(value),
                existing => {
                    let first = std::mem::replace(existing, XmlValue::Many(Vec::new()));
                    *existing = XmlValue::Many(vec![first, value]);
                }
            },
            None => self.fields.push((name, value)),
        }
    }

    fn push_text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.text.get_or_insert_with(String::new).push_str(chunk);
    }

    /// Collapse into a field value: elements with no fields become text.
    fn into_value(self) -> XmlValue {
        if self.fields.is_empty() {
            XmlValue::Text(self.text.unwrap_or_default())
        } else {
            XmlValue::Node(self)
        }
    }
}

/// Open element on the parse stack.
struct Frame {
    name: String,
    node: XmlNode,
}

/// Parse an XML document into a field tree.
///
/// The returned node is a virtual document root whose fields are the
/// top-level elements. Text outside any element is discarded, so an empty
/// or plain-text body yields an empty root rather than an error; callers
/// detect the missing structure themselves.
///
/// # Errors
///
/// Returns [`ExrateError::MalformedFeed`] on syntax errors, mismatched or
/// unclosed tags, and invalid attributes.
pub fn parse_document(xml: &str) -> Result<XmlNode, ExrateError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = XmlNode::default();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let (name, node) = open_element(&start)?;
                stack.push(Frame { name, node });
            }
            Event::Empty(start) => {
                let (name, node) = open_element(&start)?;
                attach(&mut root, &mut stack, name, node.into_value());
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ExrateError::malformed("unexpected closing tag"))?;
                attach(&mut root, &mut stack, frame.name, frame.node.into_value());
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.node.push_text(&unescape_text(&text));
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    let raw = data.into_inner();
                    frame.node.push_text(&String::from_utf8_lossy(&raw));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(ExrateError::malformed(format!(
            "unclosed element <{}>",
            frame.name
        )));
    }

    Ok(root)
}

fn open_element(start: &BytesStart<'_>) -> Result<(String, XmlNode), ExrateError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = XmlNode::default();

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        node.insert(key, XmlValue::Text(value));
    }

    Ok((name, node))
}

/// XML and HTML named entities are resolved; text holding any other
/// entity is kept verbatim.
fn unescape_text(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(value) => value.into_owned(),
        Err(err) => {
            tracing::debug!(error = %err, "Keeping unresolved entity text");
            String::from_utf8_lossy(text).into_owned()
        }
    }
}

fn attach(root: &mut XmlNode, stack: &mut [Frame], name: String, value: XmlValue) {
    match stack.last_mut() {
        Some(parent) => parent.node.insert(name, value),
        None => root.insert(name, value),
    }
}

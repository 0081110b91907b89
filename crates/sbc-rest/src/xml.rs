//! XML field extraction.
//!
//! Response bodies are small, so they are parsed into a tree once and then
//! queried with path-like selectors:
//!
//! - `a/b/c` matches every `c` element whose parent is `b` and grandparent
//!   is `a`, wherever that chain sits in the document.
//! - `/a/b/c` additionally requires `a` to be the document element.
//!
//! Element names are compared without namespace prefixes.

use quick_xml::Reader;
use quick_xml::events::Event;

use sbc_core::error::ParseError;

/// An element with its text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content directly inside this element, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// First direct child with this name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with this name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(XmlNode::text)
    }
}

/// A parsed response body.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: XmlNode,
}

impl XmlDocument {
    /// Parse a document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Malformed`] for input that is not a single
    /// well-formed element tree.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(input);
        // Synthetic node holding the document element
        let mut stack: Vec<XmlNode> = vec![XmlNode::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    stack.push(XmlNode::named(name));
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::named(name));
                    }
                }
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(malformed("unexpected closing tag"));
                    }
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| malformed(&e.to_string()))?;
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(malformed(&format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if stack.len() != 1 {
            return Err(malformed("unclosed element"));
        }
        let root = stack.pop().unwrap_or_default();
        match root.children.len() {
            0 => Err(malformed("document has no element")),
            1 => Ok(Self { root }),
            _ => Err(malformed("document has more than one root element")),
        }
    }

    /// The document element.
    pub fn root(&self) -> &XmlNode {
        &self.root.children[0]
    }

    /// All elements matching the selector, in document order.
    pub fn find_all(&self, selector: &str) -> Vec<&XmlNode> {
        let anchored = selector.starts_with('/');
        let segments: Vec<&str> = selector.split('/').filter(|s| !s.is_empty()).collect();
        let mut found = Vec::new();
        if segments.is_empty() {
            return found;
        }

        let mut trail = Vec::new();
        for child in &self.root.children {
            collect(child, &mut trail, &segments, anchored, &mut found);
        }
        found
    }

    /// First element matching the selector.
    pub fn find(&self, selector: &str) -> Option<&XmlNode> {
        self.find_all(selector).into_iter().next()
    }

    /// Trimmed text of the first element matching the selector.
    pub fn text(&self, selector: &str) -> Option<&str> {
        self.find(selector).map(XmlNode::text)
    }

    /// Like [`XmlDocument::text`], but a missing element is an error.
    pub fn require_text(&self, selector: &str) -> Result<&str, ParseError> {
        self.text(selector).ok_or_else(|| ParseError::MissingField {
            field: selector.to_string(),
        })
    }

    /// Trimmed text of every element matching the selector.
    pub fn texts(&self, selector: &str) -> Vec<&str> {
        self.find_all(selector).into_iter().map(XmlNode::text).collect()
    }
}

fn collect<'a>(
    node: &'a XmlNode,
    trail: &mut Vec<&'a str>,
    segments: &[&str],
    anchored: bool,
    found: &mut Vec<&'a XmlNode>,
) {
    trail.push(&node.name);

    let matched = if anchored {
        trail.as_slice() == segments
    } else {
        trail.ends_with(segments)
    };
    if matched {
        found.push(node);
    }

    if !anchored || trail.len() < segments.len() {
        for child in &node.children {
            collect(child, trail, segments, anchored, found);
        }
    }

    trail.pop();
}

fn malformed(message: &str) -> ParseError {
    ParseError::Malformed {
        message: message.to_string(),
    }
}

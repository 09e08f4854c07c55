//! XML source document handling
//!
//! This module reads the XML surface form of a module into an owned element
//! tree. Namespace prefixes are resolved against the in-scope `xmlns`
//! declarations while reading, entity references are decoded, and invalid
//! UTF-8 is rejected at the octet level.

use crate::error::{Error, Result, SyntaxError};
use crate::namespaces::NamespaceStack;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An attribute of an element.
///
/// Attributes with no prefix belong to no namespace.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute prefix, if any
    pub prefix: Option<String>,
    /// Local attribute name
    pub local: String,
    /// Decoded attribute value
    pub value: String,
}

/// XML element in the source document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element prefix, if any
    pub prefix: Option<String>,
    /// Local element name
    pub local: String,
    /// Resolved namespace URI, if the element is in a namespace
    pub namespace: Option<String>,
    /// Element attributes, in source order
    pub attributes: Vec<Attribute>,
    /// Decoded character data, if any
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Line of the start tag (1-based)
    pub line: usize,
    /// Column of the start tag (1-based)
    pub column: usize,
}

impl Element {
    fn new(prefix: Option<String>, local: String, line: usize, column: usize) -> Self {
        Self {
            prefix,
            local,
            namespace: None,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            line,
            column,
        }
    }

    /// Get an attribute value by local name, ignoring prefixed attributes
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_none() && a.local == local)
            .map(|a| a.value.as_str())
    }
}

/// Parsed XML source document
#[derive(Debug)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        if let Err(e) = std::str::from_utf8(xml) {
            let (line, column) = line_col(xml, e.valid_up_to());
            return Err(Error::Syntax(
                SyntaxError::new("invalid UTF-8 in input").at(line, column),
            ));
        }

        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut namespaces = NamespaceStack::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            let position = reader.buffer_position();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    namespaces.push_scope();
                    let element = parse_start(&e, &mut namespaces, xml, position)?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    namespaces.pop_scope();
                    let current = element_stack.pop().ok_or_else(|| {
                        let (line, column) = line_col(xml, position);
                        Error::Syntax(SyntaxError::new("unexpected end tag").at(line, column))
                    })?;
                    match element_stack.last_mut() {
                        Some(parent) => parent.children.push(current),
                        None => root = Some(current),
                    }
                }
                Ok(Event::Empty(e)) => {
                    namespaces.push_scope();
                    let element = parse_start(&e, &mut namespaces, xml, position)?;
                    namespaces.pop_scope();
                    match element_stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e.unescape().map_err(|err| {
                            let (line, column) = line_col(xml, position);
                            Error::Syntax(
                                SyntaxError::new(format!("bad character data: {}", err))
                                    .at(line, column),
                            )
                        })?;
                        if !text.trim().is_empty() {
                            current.text = Some(text.into_owned());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {} // comments, processing instructions, declarations
                Err(e) => {
                    let (line, column) = line_col(xml, reader.buffer_position());
                    return Err(Error::Syntax(
                        SyntaxError::new(format!("{}", e)).at(line, column),
                    ));
                }
            }
            buf.clear();
        }

        match root {
            Some(root) => Ok(Document { root }),
            None => Err(Error::Syntax(SyntaxError::new("no root element").at(1, 1))),
        }
    }
}

/// Parse a start (or empty) tag into an Element with resolved namespace
fn parse_start(
    start: &BytesStart,
    namespaces: &mut NamespaceStack,
    input: &[u8],
    position: usize,
) -> Result<Element> {
    let (line, column) = line_col(input, position);

    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|_| Error::Syntax(SyntaxError::new("invalid element name").at(line, column)))?
        .to_string();

    let (prefix, local) = match name.split_once(':') {
        Some((p, l)) => (Some(p.to_string()), l.to_string()),
        None => (None, name),
    };

    let mut element = Element::new(prefix, local, line, column);

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| {
            Error::Syntax(SyntaxError::new(format!("bad attribute: {}", e)).at(line, column))
        })?;
        let attr_name = std::str::from_utf8(attr.key.as_ref()).map_err(|_| {
            Error::Syntax(SyntaxError::new("invalid attribute name").at(line, column))
        })?;
        let attr_value = attr
            .unescape_value()
            .map_err(|e| {
                Error::Syntax(
                    SyntaxError::new(format!("bad attribute value: {}", e)).at(line, column),
                )
            })?
            .into_owned();

        if attr_name == "xmlns" {
            namespaces.declare_default(&attr_value);
        } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
            namespaces.declare_prefix(prefix, &attr_value);
        } else {
            let (aprefix, alocal) = match attr_name.split_once(':') {
                Some((p, l)) => (Some(p.to_string()), l.to_string()),
                None => (None, attr_name.to_string()),
            };
            element.attributes.push(Attribute {
                prefix: aprefix,
                local: alocal,
                value: attr_value,
            });
        }
    }

    element.namespace = namespaces
        .resolve_element(element.prefix.as_deref())
        .map(|s| s.to_string());

    Ok(element)
}

/// Compute a 1-based line/column pair for a byte offset
pub(crate) fn line_col(input: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let mut line = 1;
    let mut col = 1;
    for &b in &input[..offset] {
        if b == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let xml = r#"<module name="m"><leaf name="l"/></module>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.local, "module");
        assert_eq!(doc.root.attribute("name"), Some("m"));
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.root.children[0].local, "leaf");
    }

    #[test]
    fn test_namespace_resolution() {
        let xml = r#"<module xmlns="urn:ietf:params:xml:ns:yang:yin:1" name="m">
            <ext:note xmlns:ext="urn:example:ext" name="n"/>
        </module>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(
            doc.root.namespace.as_deref(),
            Some("urn:ietf:params:xml:ns:yang:yin:1")
        );
        let note = &doc.root.children[0];
        assert_eq!(note.prefix.as_deref(), Some("ext"));
        assert_eq!(note.namespace.as_deref(), Some("urn:example:ext"));
    }

    #[test]
    fn test_text_and_entities() {
        let xml = "<description><text>a &lt; b &amp; c&#x21;</text></description>";
        let doc = Document::from_string(xml).unwrap();

        let text = &doc.root.children[0];
        assert_eq!(text.local, "text");
        assert_eq!(text.text.as_deref(), Some("a < b & c!"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let bytes = b"<module name=\"\xff\"/>";
        let err = Document::parse(bytes).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
        assert!(format!("{}", err).contains("UTF-8"));
    }

    #[test]
    fn test_error_position() {
        let xml = "<module>\n  <unclosed>\n</module>";
        let err = Document::from_string(xml).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("line"));
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let xml = r#"<module xmlns="urn:ns" name="m"/>"#;
        let doc = Document::from_string(xml).unwrap();
        let attr = &doc.root.attributes[0];
        assert!(attr.prefix.is_none());
        assert_eq!(attr.local, "name");
    }
}

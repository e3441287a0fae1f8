//! Owned XML element tree.
//!
//! Constraint parsing works on a small read-only element tree rather than on
//! the raw event stream: the body parsers look children up by tag in any
//! order, and the exporter builds new nodes that are attached under a caller
//! supplied parent. The tree is read from text with `quick-xml`'s `Reader` and
//! written back with its `Writer`.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{ConstraintError, Result};

/// An XML element with its attributes and child elements.
///
/// Text content, comments and processing instructions are dropped on read;
/// nothing in the constraint schema carries text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element with the given tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First child element with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == tag)
    }

    /// Named attribute of the first child element with the given tag.
    pub fn child_attribute(&self, tag: &str, attribute: &str) -> Option<&str> {
        self.child(tag).and_then(|c| c.attribute(attribute))
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child element and return a handle to it.
    pub fn push_child(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Builder form of [`push_child`](Self::push_child).
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Parse the root element of an XML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::XmlParse`] if the text is not well-formed or
    /// does not contain exactly one root element.
    pub fn parse_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if root.is_some() {
                        return Err(ConstraintError::XmlParse(
                            "multiple root elements".into(),
                        ));
                    }
                    stack.push(element_from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        ConstraintError::XmlParse("unexpected closing tag".into())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ConstraintError::XmlParse(e.to_string())),
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(ConstraintError::XmlParse(format!(
                "unexpected EOF in <{}>",
                open.name
            )));
        }
        root.ok_or_else(|| ConstraintError::XmlParse("no root element".into()))
    }

    /// Serialize this element and its children.
    ///
    /// `indent` selects pretty printing with the given number of spaces per
    /// level; `None` writes everything on one line.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::XmlWrite`] if the writer fails.
    pub fn to_xml_string(&self, indent: Option<usize>) -> Result<String> {
        let mut writer = match indent {
            Some(n) => Writer::new_with_indent(Vec::new(), b' ', n),
            None => Writer::new(Vec::new()),
        };
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| ConstraintError::XmlWrite(format!("invalid UTF-8 in generated XML: {e}")))
    }
}

/// Attach a finished element to the open parent, or make it the root.
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(ConstraintError::XmlParse("multiple root elements".into()))
    } else {
        *root = Some(element);
        Ok(())
    }
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8(e.name().as_ref().to_vec())
        .map_err(|_| ConstraintError::XmlParse("invalid UTF-8 in element name".into()))?;
    let mut element = XmlElement::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConstraintError::XmlParse(err.to_string()))?;
        let key = String::from_utf8(attr.key.as_ref().to_vec()).map_err(|_| {
            ConstraintError::XmlParse(format!("invalid UTF-8 in attribute of <{}>", element.name))
        })?;
        let raw = std::str::from_utf8(&attr.value).map_err(|_| {
            ConstraintError::XmlParse(format!("invalid UTF-8 in {key} on <{}>", element.name))
        })?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|err| ConstraintError::XmlParse(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| write_error(&element.name, &e));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| write_error(&element.name, &e))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| ConstraintError::XmlWrite(format!("failed to close <{}>: {e}", element.name)))
}

fn write_error(name: &str, err: &impl std::fmt::Display) -> ConstraintError {
    ConstraintError::XmlWrite(format!("failed to write <{name}>: {err}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = r#"
            <loop_joint name="l1" type="revolute">
                <predecessor link="a">
                    <origin xyz="0 0 1"/>
                </predecessor>
                <successor link="b"/>
            </loop_joint>
        "#;
        let root = XmlElement::parse_str(xml).expect("should parse");
        assert_eq!(root.name(), "loop_joint");
        assert_eq!(root.attribute("type"), Some("revolute"));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.child_attribute("successor", "link"), Some("b"));

        let pred = root.child("predecessor").expect("predecessor");
        assert_eq!(pred.child_attribute("origin", "xyz"), Some("0 0 1"));
        assert!(root.child("axis").is_none());
    }

    #[test]
    fn test_unescapes_attributes() {
        let root = XmlElement::parse_str(r#"<c name="a &amp; b"/>"#).expect("should parse");
        assert_eq!(root.attribute("name"), Some("a & b"));
    }

    #[test]
    fn test_skips_comments_and_text() {
        let xml = "<?xml version=\"1.0\"?><!-- c --><robot>text<link name=\"x\"/></robot>";
        let root = XmlElement::parse_str(xml).expect("should parse");
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            XmlElement::parse_str("<a><b></a>"),
            Err(ConstraintError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse_str("<a>"),
            Err(ConstraintError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse_str(""),
            Err(ConstraintError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse_str("<a/><b/>"),
            Err(ConstraintError::XmlParse(_))
        ));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut e = XmlElement::new("axis").with_attribute("xyz", "1 0 0");
        e.set_attribute("xyz", "0 1 0");
        assert_eq!(e.attribute("xyz"), Some("0 1 0"));
        assert_eq!(e.attributes().count(), 1);
    }

    #[test]
    fn test_write_and_reparse() {
        let tree = XmlElement::new("coupling")
            .with_attribute("name", "c\"1")
            .with_child(XmlElement::new("ratio").with_attribute("value", "2.5"));

        let compact = tree.to_xml_string(None).expect("should write");
        assert_eq!(
            compact,
            r#"<coupling name="c&quot;1"><ratio value="2.5"/></coupling>"#
        );

        let pretty = tree.to_xml_string(Some(2)).expect("should write");
        assert!(pretty.contains('\n'));
        assert_eq!(XmlElement::parse_str(&pretty).expect("reparse"), tree);
    }

    #[test]
    fn test_push_child_returns_handle() {
        let mut robot = XmlElement::new("robot");
        robot
            .push_child(XmlElement::new("constraint"))
            .set_attribute("name", "j");
        assert_eq!(robot.child_attribute("constraint", "name"), Some("j"));
    }
}

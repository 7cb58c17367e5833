//! Owned XML tree for one package part.
//!
//! quick-xml is event based; paragraph rewriting needs random access to
//! siblings, so the part is materialized into elements and written back
//! event by event. Attribute order, comments and CDATA survive the round
//! trip; insignificant formatting inside tags does not.

use std::io::Write as _;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `w:p`
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

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text content of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Follow child indices from this element down to a descendant element.
    pub fn descendant(&self, path: &[usize]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, &idx| match el.children.get(idx) {
            Some(XmlNode::Element(child)) => Some(child),
            _ => None,
        })
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        path.iter().try_fold(self, |el, &idx| match el.children.get_mut(idx) {
            Some(XmlNode::Element(child)) => Some(child),
            _ => None,
        })
    }
}

/// A parsed XML part: optional declaration plus the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Raw declaration content, e.g. `xml version="1.0" standalone="yes"`
    declaration: Option<String>,
    /// Comments and processing instructions before the root element
    prolog: Vec<XmlNode>,
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            let event = reader.read_event()?;
            let node = match event {
                Event::Decl(decl) => {
                    declaration = Some(String::from_utf8_lossy(&decl).into_owned());
                    continue;
                }
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let Some(done) = stack.pop() else {
                        return Err(Error::Xml("unbalanced closing tag".to_string()));
                    };
                    XmlNode::Element(done)
                }
                Event::Empty(start) => XmlNode::Element(element_from_start(&start)?),
                Event::Text(text) => {
                    let text = text.unescape()?.into_owned();
                    if stack.is_empty() {
                        // whitespace between prolog and root
                        continue;
                    }
                    XmlNode::Text(text)
                }
                Event::CData(data) => {
                    XmlNode::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Event::Comment(comment) => {
                    XmlNode::Comment(String::from_utf8_lossy(&comment.into_inner()).into_owned())
                }
                Event::PI(pi) => XmlNode::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned()),
                Event::Eof => break,
                _ => continue,
            };

            match (stack.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, XmlNode::Element(element)) => {
                    if root.replace(element).is_some() {
                        return Err(Error::Xml("multiple root elements".to_string()));
                    }
                }
                (None, other) => prolog.push(other),
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("unexpected end of document".to_string()));
        }

        let root = root.ok_or_else(|| Error::Xml("document has no root element".to_string()))?;

        Ok(Self {
            declaration,
            prolog,
            root,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            write!(writer.get_mut(), "<?{decl}?>\r\n")?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;

        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let start = BytesStart::new(element.name.as_str()).with_attributes(
        element
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(e) => write_element(writer, e)?,
        XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        XmlNode::CData(t) => write!(writer.get_mut(), "<![CDATA[{t}]]>")?,
        XmlNode::Comment(t) => write!(writer.get_mut(), "<!--{t}-->")?,
        XmlNode::ProcessingInstruction(t) => write!(writer.get_mut(), "<?{t}?>")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p><!--note--><w:sectPr/></w:body></w:document>"#;

    #[test]
    fn test_parse_structure() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.name, "w:document");
        assert_eq!(doc.root.attribute("xmlns:w"), Some("urn:w"));

        let body = doc.root.elements().next().unwrap();
        let names: Vec<_> = body.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["w:p", "w:sectPr"]);

        let t = body.descendant(&[0, 0, 0]).unwrap();
        assert_eq!(t.name, "w:t");
        assert_eq!(t.text(), " a & b ");
        assert_eq!(t.attribute("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\""));
        assert!(text.contains("a &amp; b"));
        assert!(text.contains("<!--note-->"));
        assert!(text.contains("<w:sectPr/>"));

        let reparsed = XmlDocument::parse(&text).unwrap();
        assert_eq!(reparsed.root, doc.root);
    }

    #[test]
    fn test_rejects_unbalanced() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("").is_err());
    }
}

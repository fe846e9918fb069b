//! A minimal DOM-like tree, built so the XML linker can search for elements by tag name
//! anywhere in the document, the way the original tooling's `ElementTree.iter()` traversal did,
//! rather than depending on a rigid schema.
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use chromres_core::errors::ResError;

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every element named `name` anywhere in this subtree (depth-first, not just direct
    /// children), mirroring the forgiving tag search the source tooling used.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut out = Vec::new();
        self.collect(name, &mut out);
        out
    }

    fn collect<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.collect(name, out);
        }
    }
}

/// Parse a full XML document into a single synthetic root holding the document's top-level
/// elements as children.
pub fn parse(bytes: &[u8]) -> Result<XmlElement, ResError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut open: Vec<XmlElement> = vec![XmlElement {
        name: "#document".to_string(),
        ..Default::default()
    }];

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let mut attrs = Vec::new();
                for a in e.attributes() {
                    let a = a?;
                    let key = String::from_utf8_lossy(a.key.local_name().as_ref()).to_string();
                    let value = a.unescape_value()?.to_string();
                    attrs.push((key, value));
                }
                open.push(XmlElement {
                    name,
                    attrs,
                    text: String::new(),
                    children: vec![],
                });
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let mut attrs = Vec::new();
                for a in e.attributes() {
                    let a = a?;
                    let key = String::from_utf8_lossy(a.key.local_name().as_ref()).to_string();
                    let value = a.unescape_value()?.to_string();
                    attrs.push((key, value));
                }
                let node = XmlElement {
                    name,
                    attrs,
                    text: String::new(),
                    children: vec![],
                };
                if let Some(parent) = open.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                if let Some(finished) = open.pop() {
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(finished);
                    } else {
                        // Closed the synthetic root; should not normally happen.
                        open.push(finished);
                    }
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?.to_string();
                if let Some(parent) = open.last_mut() {
                    parent.text.push_str(&text);
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(t.as_ref()).to_string();
                if let Some(parent) = open.last_mut() {
                    parent.text.push_str(&text);
                }
            }
            _ => {}
        }
        buf.clear();
    }

    open.pop().ok_or_else(|| ResError::MalformedBlock {
        kind: "xml".to_string(),
        address: 0,
        msg: "document produced no root element".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_elements_by_name() {
        let xml = br#"<Root><Curves><Curve><Name>UV</Name></Curve></Curves></Root>"#;
        let root = parse(xml).unwrap();
        let curves = root.find_all("Curve");
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].child("Name").unwrap().text, "UV");
    }

    #[test]
    fn reads_attributes() {
        let xml = br#"<Root><EventCurve IsOriginalData="true"><Name>Fraction</Name></EventCurve></Root>"#;
        let root = parse(xml).unwrap();
        let ec = &root.find_all("EventCurve")[0];
        assert_eq!(ec.attr("IsOriginalData"), Some("true"));
    }
}

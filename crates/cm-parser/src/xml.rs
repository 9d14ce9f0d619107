use cm_core::{CaseModelError, SourceLocation, SourceSpan};
use roxmltree::{Document, Node, NodeType};

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElementNode),
    Text(XmlTextNode),
}

/// An element as written in the source.
///
/// `name` and attribute names keep their namespace prefix. Namespace declarations made on
/// this element are kept as `xmlns` attributes so that writing the element back produces
/// a document that parses to the same names.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElementNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub location: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlTextNode {
    pub value: String,
    pub location: SourceSpan,
}

impl XmlElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            location: SourceSpan::synthetic(),
        }
    }

    /// The element name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Replaces the value in place, or appends the attribute when it is new.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn push_element(&mut self, element: XmlElementNode) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn push_text(&mut self, value: impl Into<String>) {
        self.children.push(XmlNode::Text(XmlTextNode {
            value: value.into(),
            location: SourceSpan::synthetic(),
        }));
    }

    pub fn element_children(&self) -> impl Iterator<Item = &XmlElementNode> {
        self.children.iter().filter_map(|entry| match entry {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn element_children_mut(&mut self) -> impl Iterator<Item = &mut XmlElementNode> {
        self.children.iter_mut().filter_map(|entry| match entry {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element whose local name matches.
    pub fn child(&self, local_name: &str) -> Option<&XmlElementNode> {
        self.element_children()
            .find(|element| element.local_name() == local_name)
    }

    pub fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElementNode> + 'a {
        self.element_children()
            .filter(move |element| element.local_name() == local_name)
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|entry| match entry {
                XmlNode::Text(XmlTextNode { value, .. }) => Some(value.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Name, attributes and location without the children.
    pub fn shallow_clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
            location: self.location.clone(),
        }
    }

    /// Depth-first visit of this element and every descendant element.
    pub fn visit<'a>(&'a self, visitor: &mut impl FnMut(&'a XmlElementNode)) {
        visitor(self);
        for child in self.element_children() {
            child.visit(visitor);
        }
    }
}

pub fn parse_xml_document(source: &str) -> Result<XmlDocument, CaseModelError> {
    let document = Document::parse(source)
        .map_err(|error| CaseModelError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(CaseModelError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(XmlDocument {
        root: parse_element(&document, root),
    })
}

fn parse_element(document: &Document<'_>, node: Node<'_, '_>) -> XmlElementNode {
    let mut attributes = namespace_declarations(node);
    for attribute in node.attributes() {
        attributes.push((
            qualified_name(node, attribute.namespace(), attribute.name()),
            attribute.value().to_string(),
        ));
    }

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(XmlNode::Element(parse_element(document, child))),
            NodeType::Text => {
                let value = child.text().unwrap_or_default();
                if value.trim().is_empty() {
                    continue;
                }
                children.push(XmlNode::Text(XmlTextNode {
                    value: value.to_string(),
                    location: node_span(document, child.range().start, child.range().end),
                }));
            }
            _ => {}
        }
    }

    let tag_name = node.tag_name();
    XmlElementNode {
        name: qualified_name(node, tag_name.namespace(), tag_name.name()),
        attributes,
        children,
        location: node_span(document, node.range().start, node.range().end),
    }
}

fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

fn namespace_declarations(node: Node<'_, '_>) -> Vec<(String, String)> {
    let inherited = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut declarations = Vec::new();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }
        let key = (ns.name().map(str::to_string), ns.uri().to_string());
        if inherited.contains(&key) {
            continue;
        }
        let attribute = match ns.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        declarations.push((attribute, ns.uri().to_string()));
    }
    declarations
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_xml_document_builds_tree_with_attributes_and_text() {
        let source = r#"<case id="c.case" name="c"><caseFileModel/><condition><body>x &gt; 1</body></condition></case>"#;
        let document = parse_xml_document(source).expect("xml should parse");
        assert_eq!(document.root.name, "case");
        assert_eq!(document.root.attribute("id"), Some("c.case"));
        assert_eq!(
            document.root.attributes,
            vec![
                ("id".to_string(), "c.case".to_string()),
                ("name".to_string(), "c".to_string())
            ]
        );
        assert_eq!(document.root.element_children().count(), 2);

        let body = document
            .root
            .child("condition")
            .and_then(|condition| condition.child("body"))
            .expect("body element");
        assert_eq!(body.text(), "x > 1");
        assert!(document.root.location.start.line >= 1);
    }

    #[test]
    fn parse_xml_document_keeps_prefixes_and_local_declarations() {
        let source = r#"<humanTask id="ht"><extensionElements><cafienne:implementation xmlns:cafienne="org.cafienne" humanTaskRef="a.humantask"/></extensionElements></humanTask>"#;
        let document = parse_xml_document(source).expect("xml should parse");
        let implementation = document
            .root
            .child("extensionElements")
            .and_then(|ext| ext.child("implementation"))
            .expect("implementation");
        assert_eq!(implementation.name, "cafienne:implementation");
        assert_eq!(implementation.local_name(), "implementation");
        assert_eq!(implementation.attribute("xmlns:cafienne"), Some("org.cafienne"));
        assert_eq!(implementation.attribute("humanTaskRef"), Some("a.humantask"));
        assert!(!document.root.has_attribute("xmlns:cafienne"));
    }

    #[test]
    fn parse_xml_document_drops_whitespace_only_text() {
        let source = "<case>\n    <caseFileModel/>\n    <casePlanModel/>\n</case>";
        let document = parse_xml_document(source).expect("xml should parse");
        assert_eq!(document.root.children.len(), 2);
    }

    #[test]
    fn parse_xml_document_reads_cdata_as_text() {
        let source = r#"<body><![CDATA[a < b]]></body>"#;
        let document = parse_xml_document(source).expect("xml should parse");
        assert_eq!(document.root.text(), "a < b");
    }

    #[test]
    fn parse_xml_document_returns_parse_error_for_invalid_xml() {
        let error = parse_xml_document("<case>").expect_err("invalid xml should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
    }

    #[test]
    fn parse_xml_document_returns_parse_error_when_root_element_is_missing() {
        let error = parse_xml_document("<?xml version=\"1.0\"?><!---->")
            .expect_err("missing root element should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
    }

    #[test]
    fn attribute_helpers_replace_and_remove() {
        let mut element = XmlElementNode::new("process");
        element.set_attribute("name", "p");
        element.set_attribute("id", "p.process");
        element.set_attribute("name", "renamed");
        assert_eq!(element.attribute("name"), Some("renamed"));
        assert_eq!(element.attributes[0].0, "name");
        assert_eq!(element.remove_attribute("id"), Some("p.process".to_string()));
        assert!(element.remove_attribute("id").is_none());
    }

    #[test]
    fn visit_walks_descendants_depth_first() {
        let document =
            parse_xml_document("<a><b><c/></b><d/></a>").expect("xml should parse");
        let mut names = Vec::new();
        document.root.visit(&mut |element| names.push(element.name.clone()));
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}

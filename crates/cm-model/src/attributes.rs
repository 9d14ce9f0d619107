use cm_core::Diagnostic;
use cm_parser::XmlElementNode;

use crate::definition::{Expression, ParseDefinition};
use crate::document::DefinitionDocument;
use crate::node::NodeRef;
use crate::reference::{Reference, ReferenceList};

/// Reads typed values from the element backing one node and instantiates its children.
///
/// Every child created through the parser is registered in the document's element list
/// and appended to this node's children as a side effect.
pub struct NodeParser<'a> {
    document: &'a mut DefinitionDocument,
    node: NodeRef,
    element: &'a XmlElementNode,
}

impl<'a> NodeParser<'a> {
    pub(crate) fn new(
        document: &'a mut DefinitionDocument,
        node: NodeRef,
        element: &'a XmlElementNode,
    ) -> Self {
        Self {
            document,
            node,
            element,
        }
    }

    pub fn node(&self) -> NodeRef {
        self.node
    }

    pub fn element(&self) -> &'a XmlElementNode {
        self.element
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.element.attribute(name).map(str::to_string)
    }

    pub fn attribute_or(&self, name: &str, default: &str) -> String {
        self.attribute(name).unwrap_or_else(|| default.to_string())
    }

    pub fn number(&mut self, name: &str, default: f64) -> f64 {
        self.optional_number(name).unwrap_or(default)
    }

    pub fn optional_number(&mut self, name: &str) -> Option<f64> {
        let element = self.element;
        self.number_of(element, name)
    }

    /// Reads a number attribute from `element`, which may be a plain child element that is
    /// not a definition of its own (e.g. `<Bounds>`).
    pub fn number_of(&mut self, element: &XmlElementNode, name: &str) -> Option<f64> {
        let raw = element.attribute(name)?;
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                self.warn_at(
                    element,
                    "ATTR_NUMBER_INVALID",
                    format!(
                        "Attribute \"{}\" on <{}> is not a number: \"{}\".",
                        name, element.name, raw
                    ),
                );
                None
            }
        }
    }

    pub fn boolean(&mut self, name: &str, default: bool) -> bool {
        let element = self.element;
        let Some(raw) = element.attribute(name) else {
            return default;
        };
        match raw.trim() {
            "true" => true,
            "false" => false,
            _ => {
                self.warn_at(
                    element,
                    "ATTR_BOOL_INVALID",
                    format!(
                        "Attribute \"{}\" on <{}> must be \"true\" or \"false\".",
                        name, element.name
                    ),
                );
                default
            }
        }
    }

    /// Text of the first child element named `child`.
    pub fn element_text(&self, child: &str, default: &str) -> String {
        self.optional_element_text(child)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn optional_element_text(&self, child: &str) -> Option<String> {
        self.element
            .child(child)
            .map(|element| element.text().trim().to_string())
    }

    pub fn expression(&self, child: &str) -> Option<Expression> {
        self.element.child(child).map(Expression::from_element)
    }

    pub fn reference(&self, name: &str) -> Reference {
        Reference::new(self.attribute(name).unwrap_or_default())
    }

    pub fn references(&self, name: &str) -> ReferenceList {
        ReferenceList::parse(self.element.attribute(name).unwrap_or_default())
    }

    /// A child element kept verbatim, e.g. extension elements.
    pub fn raw_child(&self, child: &str) -> Option<XmlElementNode> {
        self.element.child(child).cloned()
    }

    pub fn parse_element<T: ParseDefinition>(&mut self, tag: &str) -> Option<NodeRef> {
        let element = self.element;
        let child = element.child(tag)?;
        Some(self.parse_child::<T>(child))
    }

    pub fn parse_elements<T: ParseDefinition>(&mut self, tag: &str) -> Vec<NodeRef> {
        let element = self.element;
        let mut nodes = Vec::new();
        for child in element.children_named(tag) {
            nodes.push(self.parse_child::<T>(child));
        }
        nodes
    }

    /// Children found inside `<wrapper>` elements, e.g. `<caseRoles><role/></caseRoles>`.
    pub fn parse_wrapped<T: ParseDefinition>(&mut self, wrapper: &str, tag: &str) -> Vec<NodeRef> {
        let element = self.element;
        let mut nodes = Vec::new();
        for container in element.children_named(wrapper) {
            for child in container.children_named(tag) {
                nodes.push(self.parse_child::<T>(child));
            }
        }
        nodes
    }

    pub fn parse_child<T: ParseDefinition>(&mut self, element: &XmlElementNode) -> NodeRef {
        self.document.parse_node::<T>(Some(self.node), element)
    }

    pub fn warn(&mut self, code: &str, message: impl Into<String>) {
        let element = self.element;
        self.warn_at(element, code, message);
    }

    fn warn_at(&mut self, element: &XmlElementNode, code: &str, message: impl Into<String>) {
        self.document.record(
            Diagnostic::warning(code, message).at(Some(element.location.clone())),
        );
    }
}

use std::collections::HashMap;

use cm_core::CaseModelError;
use cm_parser::{write_xml_document, XmlElementNode};

use crate::definition::{Property, ReferenceSlot};
use crate::document::DefinitionDocument;
use crate::node::NodeRef;

impl DefinitionDocument {
    /// Flattens references and writes the document as pretty printed XML.
    pub fn export(&mut self) -> Result<String, CaseModelError> {
        self.ensure_valid()?;
        let Some(root) = self.root() else {
            return Err(CaseModelError::new(
                "DOCUMENT_EMPTY",
                format!("\"{}\" has no root definition.", self.file_name()),
            ));
        };
        self.flatten();
        Ok(write_xml_document(&self.export_element(root)))
    }

    /// Rewrites every resolved reference to the current id of its target.
    pub fn flatten(&mut self) {
        let ids: HashMap<NodeRef, String> = self
            .elements
            .iter()
            .filter_map(|node| Some((*node, self.node(*node).id()?.to_string())))
            .collect();

        for node in self.elements.clone() {
            let entry = self.node_mut(node);
            for field in entry.data.reference_fields() {
                match field.slot {
                    ReferenceSlot::One(reference) => {
                        if let Some(id) = reference.target().and_then(|target| ids.get(&target)) {
                            reference.sync_id(id);
                        }
                    }
                    ReferenceSlot::Many(list) => {
                        for reference in list.iter_mut() {
                            if let Some(id) =
                                reference.target().and_then(|target| ids.get(&target))
                            {
                                reference.sync_id(id);
                            }
                        }
                    }
                }
            }
        }
    }

    /// The element for `node` and its subtree, as it was last flattened.
    ///
    /// Namespace declarations of the source element come first, attributes that no field
    /// manages are written back after the declared properties.
    pub fn export_element(&self, node: NodeRef) -> XmlElementNode {
        let entry = self.node(node);
        let source = entry.source();
        let mut element = XmlElementNode::new(entry.tag_name());
        for (name, value) in source.into_iter().flat_map(|source| &source.attributes) {
            if is_namespace_declaration(name) {
                element.set_attribute(name.as_str(), value.as_str());
            }
        }
        if let Some(id) = entry.id() {
            element.set_attribute("id", id);
        }
        if let Some(name) = entry.name() {
            element.set_attribute("name", name);
        }
        if let Some(description) = entry.description() {
            element.set_attribute("description", description);
        }

        let properties = entry.data.properties();
        let managed = properties.iter().map(|(name, _)| *name).collect::<Vec<_>>();
        for (name, property) in properties {
            if let Property::Flag { value, default } = property {
                let written = source.is_some_and(|source| source.has_attribute(name));
                if value == default && !written {
                    continue;
                }
            }
            self.export_property(&mut element, name, property);
        }

        let consumed = entry.data.consumed_attributes();
        for (name, value) in source.into_iter().flat_map(|source| &source.attributes) {
            let name = name.as_str();
            if is_namespace_declaration(name)
                || matches!(name, "id" | "name" | "description")
                || managed.contains(&name)
                || consumed.contains(&name)
            {
                continue;
            }
            element.set_attribute(name, value.as_str());
        }
        element
    }

    fn create_export_node(&self, parent: &mut XmlElementNode, node: NodeRef) {
        if self.is_live(node) {
            parent.push_element(self.export_element(node));
        }
    }

    fn export_property(&self, element: &mut XmlElementNode, name: &str, property: Property<'_>) {
        match property {
            Property::Text(Some(value)) if !value.is_empty() => {
                element.set_attribute(name, value);
            }
            Property::Flag { value, .. } => element.set_attribute(name, value.to_string()),
            Property::Number(value) => element.set_attribute(name, value.to_string()),
            Property::Reference(reference) if !reference.id().is_empty() => {
                element.set_attribute(name, reference.id());
            }
            Property::References(list) if !list.is_empty() => {
                element.set_attribute(name, list.to_attribute());
            }
            Property::Child(Some(child)) => self.create_export_node(element, child),
            Property::Children(children) => {
                for child in children {
                    self.create_export_node(element, *child);
                }
            }
            Property::Wrapped(children) if !children.is_empty() => {
                let mut wrapper = XmlElementNode::new(name);
                for child in children {
                    self.create_export_node(&mut wrapper, *child);
                }
                element.push_element(wrapper);
            }
            Property::ElementText(Some(text)) if !text.is_empty() => {
                let mut child = XmlElementNode::new(name);
                child.push_text(text);
                element.push_element(child);
            }
            Property::Expression(Some(expression)) => {
                element.push_element(expression.to_element(name));
            }
            Property::Elements(children) => {
                for child in children {
                    element.push_element(child);
                }
            }
            _ => {}
        }
    }
}

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

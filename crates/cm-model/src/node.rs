use cm_parser::XmlElementNode;

use crate::definition::Definition;

/// Handle of a node inside its owning [`crate::DefinitionDocument`].
///
/// Handles are never reused within a document, so a handle to a removed node stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) usize);

#[derive(Debug)]
pub struct DefinitionNode {
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) children: Vec<NodeRef>,
    pub(crate) source: Option<XmlElementNode>,
    pub(crate) deleting: bool,
    pub(crate) data: Box<dyn Definition>,
}

impl DefinitionNode {
    pub(crate) fn new(
        parent: Option<NodeRef>,
        id: Option<String>,
        name: Option<String>,
        data: Box<dyn Definition>,
    ) -> Self {
        Self {
            id,
            name,
            description: None,
            parent,
            children: Vec::new(),
            source: None,
            deleting: false,
            data,
        }
    }

    pub(crate) fn from_source(parent: Option<NodeRef>, element: &XmlElementNode) -> Self {
        Self {
            id: element.attribute("id").map(str::to_string),
            name: element.attribute("name").map(str::to_string),
            description: element.attribute("description").map(str::to_string),
            parent,
            children: Vec::new(),
            source: Some(element.shallow_clone()),
            deleting: false,
            data: Box::new(crate::definition::Unparsed),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// `None` when never set; `Some("")` when explicitly blank.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    /// Child nodes in creation order.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// The element this node was parsed from, without its children.
    pub fn source(&self) -> Option<&XmlElementNode> {
        self.source.as_ref()
    }

    pub fn data(&self) -> &dyn Definition {
        self.data.as_ref()
    }

    pub fn tag_name(&self) -> &str {
        self.data.tag_name()
    }
}

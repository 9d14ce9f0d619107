use std::collections::BTreeMap;

use cm_core::{CaseModelError, Diagnostic};
use cm_parser::{parse_xml_document, XmlElementNode};

use crate::attributes::NodeParser;
use crate::definition::{Definition, NodeField, ParseDefinition, ReferenceSlot};
use crate::definitions::{
    CaseDefinition, CaseFileItemTypeDefinition, DimensionsDefinition, HumanTaskModelDefinition,
    ProcessDefinition,
};
use crate::node::{DefinitionNode, NodeRef};
use crate::reference::Reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Case,
    Dimensions,
    Process,
    HumanTask,
    CaseFileItemType,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Case,
        DocumentKind::Dimensions,
        DocumentKind::Process,
        DocumentKind::HumanTask,
        DocumentKind::CaseFileItemType,
    ];

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension() == extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Case => "case",
            DocumentKind::Dimensions => "dimensions",
            DocumentKind::Process => "process",
            DocumentKind::HumanTask => "humantask",
            DocumentKind::CaseFileItemType => "cfid",
        }
    }

    pub fn root_tag(&self) -> &'static str {
        match self {
            DocumentKind::Case => "case",
            DocumentKind::Dimensions => "CMMNDI",
            DocumentKind::Process => "process",
            DocumentKind::HumanTask => "humantask",
            DocumentKind::CaseFileItemType => "caseFileItemDefinition",
        }
    }
}

/// Owning context of one file's definition nodes.
#[derive(Debug)]
pub struct DefinitionDocument {
    kind: DocumentKind,
    file_name: String,
    nodes: Vec<Option<DefinitionNode>>,
    pub(crate) elements: Vec<NodeRef>,
    pub(crate) root: Option<NodeRef>,
    counters: BTreeMap<&'static str, usize>,
    diagnostics: Vec<Diagnostic>,
    pub(crate) migrated: bool,
    pub(crate) pending_orphans: Vec<NodeRef>,
}

impl DefinitionDocument {
    pub fn new(kind: DocumentKind, file_name: impl Into<String>) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            nodes: Vec::new(),
            elements: Vec::new(),
            root: None,
            counters: BTreeMap::new(),
            diagnostics: Vec::new(),
            migrated: false,
            pending_orphans: Vec::new(),
        }
    }

    /// Parses a file, picking the document kind from its extension.
    pub fn parse(file_name: &str, source: &str) -> Result<Self, CaseModelError> {
        let kind = DocumentKind::from_file_name(file_name).ok_or_else(|| {
            CaseModelError::new(
                "SOURCE_KIND_UNSUPPORTED",
                format!("Unsupported source extension: {}", file_name),
            )
        })?;
        Ok(Self::parse_as(kind, file_name, source))
    }

    /// Builds the full node tree, then resolves references.
    ///
    /// XML that is not well formed, or a wrong root element, yields an invalid document
    /// carrying the error diagnostic instead of a failure.
    pub fn parse_as(kind: DocumentKind, file_name: &str, source: &str) -> Self {
        let mut document = Self::new(kind, file_name);
        let xml = match parse_xml_document(source) {
            Ok(xml) => xml,
            Err(error) => {
                log::warn!(
                    "event=document_parse status=invalid file={} code={}",
                    file_name,
                    error.code
                );
                document.record(Diagnostic::error(error.code, error.message));
                return document;
            }
        };

        if xml.root.local_name() != kind.root_tag() {
            document.record(
                Diagnostic::error(
                    "XML_ROOT_INVALID",
                    format!(
                        "Expected <{}> root in file \"{}\", got <{}>.",
                        kind.root_tag(),
                        file_name,
                        xml.root.name
                    ),
                )
                .at(Some(xml.root.location.clone())),
            );
            return document;
        }

        let root = match kind {
            DocumentKind::Case => document.parse_node::<CaseDefinition>(None, &xml.root),
            DocumentKind::Dimensions => {
                document.parse_node::<DimensionsDefinition>(None, &xml.root)
            }
            DocumentKind::Process => document.parse_node::<ProcessDefinition>(None, &xml.root),
            DocumentKind::HumanTask => {
                document.parse_node::<HumanTaskModelDefinition>(None, &xml.root)
            }
            DocumentKind::CaseFileItemType => {
                document.parse_node::<CaseFileItemTypeDefinition>(None, &xml.root)
            }
        };
        document.root = Some(root);
        document.resolve_references();

        log::debug!(
            "event=document_parse status=ok file={} nodes={} warnings={} migrated={}",
            file_name,
            document.elements.len(),
            document.diagnostics.len(),
            document.migrated
        );
        document
    }

    pub(crate) fn parse_node<T: ParseDefinition>(
        &mut self,
        parent: Option<NodeRef>,
        element: &XmlElementNode,
    ) -> NodeRef {
        let node = self.register(DefinitionNode::from_source(parent, element));
        let data = T::parse(&mut NodeParser::new(self, node, element));
        self.node_mut(node).data = Box::new(data);
        node
    }

    fn register(&mut self, node: DefinitionNode) -> NodeRef {
        let handle = NodeRef(self.nodes.len());
        let parent = node.parent;
        self.nodes.push(Some(node));
        self.elements.push(handle);
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(handle);
        }
        handle
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    /// Every live node, in registration order.
    pub fn elements(&self) -> &[NodeRef] {
        &self.elements
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| !diagnostic.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error())
    }

    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// `true` when loading rewrote legacy constructs, so the file should be saved even
    /// though nobody edited it.
    pub fn is_migrated(&self) -> bool {
        self.migrated
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub(crate) fn ensure_valid(&self) -> Result<(), CaseModelError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(CaseModelError::new(
            "DOCUMENT_INVALID",
            format!(
                "Document \"{}\" failed to load and cannot be edited.",
                self.file_name
            ),
        ))
    }

    /// Panics when `node` was removed; holding on to a removed node is a caller bug.
    pub fn node(&self, node: NodeRef) -> &DefinitionNode {
        match self.nodes.get(node.0).and_then(Option::as_ref) {
            Some(entry) => entry,
            None => panic!("definition node {:?} was removed", node),
        }
    }

    pub(crate) fn node_mut(&mut self, node: NodeRef) -> &mut DefinitionNode {
        match self.nodes.get_mut(node.0).and_then(Option::as_mut) {
            Some(entry) => entry,
            None => panic!("definition node {:?} was removed", node),
        }
    }

    pub(crate) fn slot_mut(&mut self, node: NodeRef) -> Option<&mut DefinitionNode> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    pub(crate) fn wipe(&mut self, node: NodeRef) {
        if let Some(slot) = self.nodes.get_mut(node.0) {
            *slot = None;
        }
    }

    pub fn try_node(&self, node: NodeRef) -> Option<&DefinitionNode> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    pub fn is_live(&self, node: NodeRef) -> bool {
        self.try_node(node).is_some()
    }

    pub fn get<T: Definition>(&self, node: NodeRef) -> Option<&T> {
        self.try_node(node)?.data.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Definition>(&mut self, node: NodeRef) -> Option<&mut T> {
        self.slot_mut(node)?.data.as_any_mut().downcast_mut::<T>()
    }

    /// Id lookup over the document's element list.
    pub fn get_element(&self, id: &str) -> Option<NodeRef> {
        self.elements
            .iter()
            .copied()
            .find(|node| self.node(*node).id.as_deref() == Some(id))
    }

    pub fn find_element<T: Definition>(&self, id: &str) -> Option<(NodeRef, &T)> {
        let node = self.get_element(id)?;
        self.get::<T>(node).map(|data| (node, data))
    }

    pub fn elements_of<T: Definition>(&self) -> Vec<NodeRef> {
        self.elements
            .iter()
            .copied()
            .filter(|node| self.get::<T>(*node).is_some())
            .collect()
    }

    /// `node` followed by all of its descendants, depth first.
    pub fn descendants(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(entry) = self.try_node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(entry.children.iter().rev().copied());
        }
        out
    }

    /// Creates a definition that is not backed by source XML. A missing id or name is
    /// generated from the document's counter for the definition's type.
    pub fn create_definition<T: Definition + Default>(
        &mut self,
        parent: Option<NodeRef>,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<NodeRef, CaseModelError> {
        self.create_definition_from(parent, T::default(), id, name)
    }

    pub fn create_definition_from<T: Definition>(
        &mut self,
        parent: Option<NodeRef>,
        data: T,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<NodeRef, CaseModelError> {
        self.ensure_valid()?;
        if let Some(id) = id {
            if self.get_element(id).is_some() {
                return Err(CaseModelError::new(
                    "ID_DUPLICATE",
                    format!("Id \"{}\" is already used in \"{}\".", id, self.file_name),
                ));
            }
        }

        let (id, name) = match (id, name) {
            (Some(id), Some(name)) => (id.to_string(), name.to_string()),
            (id, name) => {
                let (generated_id, generated_name) = self.next_identity(data.type_label());
                (
                    id.map(str::to_string).unwrap_or(generated_id),
                    name.map(str::to_string).unwrap_or(generated_name),
                )
            }
        };
        self.insert_definition(parent, Box::new(data), Some(id), Some(name))
    }

    pub(crate) fn insert_definition(
        &mut self,
        parent: Option<NodeRef>,
        data: Box<dyn Definition>,
        id: Option<String>,
        name: Option<String>,
    ) -> Result<NodeRef, CaseModelError> {
        let handle = NodeRef(self.nodes.len());
        match parent {
            Some(parent) => {
                if !self.is_live(parent) {
                    return Err(CaseModelError::new(
                        "NODE_NOT_FOUND",
                        format!("Parent {:?} is not part of \"{}\".", parent, self.file_name),
                    ));
                }
                let tag = data.tag_name().to_string();
                let parent_entry = self.node_mut(parent);
                if !parent_entry.data.adopt(handle, &tag) {
                    return Err(CaseModelError::illegal_mutation(format!(
                        "<{}> cannot contain <{}>.",
                        parent_entry.data.tag_name(),
                        tag
                    )));
                }
            }
            None => {
                if self.root.is_some() {
                    return Err(CaseModelError::illegal_mutation(format!(
                        "\"{}\" already has a root definition.",
                        self.file_name
                    )));
                }
                if data.tag_name() != self.kind.root_tag() {
                    return Err(CaseModelError::illegal_mutation(format!(
                        "<{}> cannot be the root of a .{} document.",
                        data.tag_name(),
                        self.kind.extension()
                    )));
                }
            }
        }

        let node = self.register(DefinitionNode::new(parent, id, name, data));
        debug_assert_eq!(node, handle);
        if parent.is_none() {
            self.root = Some(node);
        }
        Ok(node)
    }

    pub(crate) fn next_identity(&mut self, label: &'static str) -> (String, String) {
        loop {
            let counter = self.counters.entry(label).or_insert(0);
            let sequence = *counter;
            *counter += 1;
            let id = format!("{}_{}", label.to_ascii_lowercase(), sequence);
            if self.get_element(&id).is_none() {
                return (id, format!("{}_{}", label, sequence));
            }
        }
    }

    pub fn set_name(&mut self, node: NodeRef, name: Option<&str>) -> Result<(), CaseModelError> {
        self.ensure_valid()?;
        self.node_mut(node).name = name.map(str::to_string);
        Ok(())
    }

    pub fn set_description(
        &mut self,
        node: NodeRef,
        description: Option<&str>,
    ) -> Result<(), CaseModelError> {
        self.ensure_valid()?;
        self.node_mut(node).description = description.map(str::to_string);
        Ok(())
    }

    /// Gives a node a new id. Resolved references follow the node.
    pub fn change_id(&mut self, node: NodeRef, id: &str) -> Result<(), CaseModelError> {
        self.ensure_valid()?;
        if let Some(existing) = self.get_element(id) {
            if existing != node {
                return Err(CaseModelError::new(
                    "ID_DUPLICATE",
                    format!("Id \"{}\" is already used in \"{}\".", id, self.file_name),
                ));
            }
            return Ok(());
        }
        self.node_mut(node).id = Some(id.to_string());
        self.flatten();
        Ok(())
    }

    /// Moves `node` under `new_parent` without changing its identity.
    pub fn move_definition(
        &mut self,
        node: NodeRef,
        new_parent: NodeRef,
    ) -> Result<(), CaseModelError> {
        self.ensure_valid()?;
        if self.root == Some(node) {
            return Err(CaseModelError::illegal_mutation(
                "The root definition cannot be moved.",
            ));
        }
        if !self.is_live(new_parent) {
            return Err(CaseModelError::new(
                "NODE_NOT_FOUND",
                format!("Target {:?} is not part of \"{}\".", new_parent, self.file_name),
            ));
        }
        if self.descendants(node).contains(&new_parent) {
            return Err(CaseModelError::illegal_mutation(
                "A definition cannot be moved into itself.",
            ));
        }

        let old_parent = self.node(node).parent;
        if old_parent == Some(new_parent) {
            return Ok(());
        }

        let tag = self.node(node).data.tag_name().to_string();
        let target = self.node_mut(new_parent);
        if !target.data.adopt(node, &tag) {
            return Err(CaseModelError::illegal_mutation(format!(
                "<{}> cannot contain <{}>.",
                target.data.tag_name(),
                tag
            )));
        }
        target.children.push(node);

        if let Some(old_parent) = old_parent {
            let previous = self.node_mut(old_parent);
            previous.children.retain(|child| *child != node);
            forget_node(previous.data.node_fields(), node);
        }
        self.node_mut(node).parent = Some(new_parent);
        Ok(())
    }

    /// Points the reference field `field` of `node` at `target`. List fields get the
    /// target appended.
    pub fn link(
        &mut self,
        node: NodeRef,
        field: &str,
        target: NodeRef,
    ) -> Result<(), CaseModelError> {
        self.ensure_valid()?;
        let Some(target_id) = self.node(target).id.clone() else {
            return Err(CaseModelError::new(
                "NODE_ID_MISSING",
                "A reference target must have an id.",
            ));
        };

        let entry = self.node_mut(node);
        let tag = entry.data.tag_name().to_string();
        for reference in entry.data.reference_fields() {
            if reference.name != field {
                continue;
            }
            match reference.slot {
                ReferenceSlot::One(slot) => slot.point_to(target, target_id),
                ReferenceSlot::Many(list) => {
                    if !list.contains_id(&target_id) {
                        list.push(Reference::resolved(target_id, target));
                    }
                }
            }
            return Ok(());
        }

        Err(CaseModelError::new(
            "FIELD_UNKNOWN",
            format!("<{}> has no reference field \"{}\".", tag, field),
        ))
    }
}

pub(crate) fn forget_node(fields: Vec<NodeField<'_>>, node: NodeRef) {
    for field in fields {
        match field {
            NodeField::One(slot) => {
                if *slot == Some(node) {
                    *slot = None;
                }
            }
            NodeField::Many(list) => list.retain(|entry| *entry != node),
        }
    }
}

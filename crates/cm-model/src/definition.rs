use std::any::Any;
use std::fmt;

use cm_parser::XmlElementNode;

use crate::attributes::NodeParser;
use crate::node::NodeRef;
use crate::reference::{Reference, ReferenceList};

/// Behavior every typed definition declares about itself.
///
/// The generic passes (cleanup, resolution, export) never inspect a concrete type. They
/// iterate the manifest returned by `node_fields`, `reference_fields` and `properties`.
pub trait Definition: Any + fmt::Debug {
    /// Element name written on export.
    fn tag_name(&self) -> &str;

    /// Readable type name, used for generated ids and names.
    fn type_label(&self) -> &'static str;

    /// Exported properties in document order, after `id`, `name` and `description`.
    fn properties(&self) -> Vec<(&'static str, Property<'_>)>;

    /// Typed fields holding structural children.
    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        Vec::new()
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        Vec::new()
    }

    /// Source attributes that loading rewrote into other fields. Export never copies them
    /// back.
    fn consumed_attributes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Called after the named reference field was cleared because its target was removed.
    fn reference_removed(&mut self, _field: &'static str) -> RemovalEffect {
        RemovalEffect::Keep
    }

    /// Stores `child` in the matching typed field. Returns `false` when this definition
    /// cannot contain a child with that tag.
    fn adopt(&mut self, _child: NodeRef, _child_tag: &str) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub trait ParseDefinition: Definition + Sized {
    fn parse(parser: &mut NodeParser<'_>) -> Self;
}

macro_rules! any_accessors {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
pub(crate) use any_accessors;

pub enum NodeField<'a> {
    One(&'a mut Option<NodeRef>),
    Many(&'a mut Vec<NodeRef>),
}

pub enum ReferenceSlot<'a> {
    One(&'a mut Reference),
    Many(&'a mut ReferenceList),
}

pub struct ReferenceField<'a> {
    pub name: &'static str,
    pub slot: ReferenceSlot<'a>,
    /// `false` for fields that may point into another document.
    pub warn_if_dangling: bool,
}

impl<'a> ReferenceField<'a> {
    pub fn one(name: &'static str, reference: &'a mut Reference) -> Self {
        Self {
            name,
            slot: ReferenceSlot::One(reference),
            warn_if_dangling: true,
        }
    }

    pub fn many(name: &'static str, references: &'a mut ReferenceList) -> Self {
        Self {
            name,
            slot: ReferenceSlot::Many(references),
            warn_if_dangling: true,
        }
    }

    pub fn may_be_external(mut self) -> Self {
        self.warn_if_dangling = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalEffect {
    Keep,
    /// The definition has no meaning without the removed target and must go as well.
    RemoveSelf,
}

/// Runtime shape of an exported property.
pub enum Property<'a> {
    Text(Option<&'a str>),
    /// Omitted on export when equal to `default` and absent from the source element.
    Flag { value: bool, default: bool },
    Number(f64),
    Reference(&'a Reference),
    References(&'a ReferenceList),
    Child(Option<NodeRef>),
    Children(&'a [NodeRef]),
    /// Children exported inside a wrapper element named after the property.
    Wrapped(&'a [NodeRef]),
    ElementText(Option<&'a str>),
    Expression(Option<&'a Expression>),
    Elements(Vec<XmlElementNode>),
}

/// `<condition language="spel"><body>...</body></condition>` and friends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    pub language: Option<String>,
    pub body: String,
}

impl Expression {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            language: None,
            body: body.into(),
        }
    }

    pub(crate) fn from_element(element: &XmlElementNode) -> Self {
        let body = match element.child("body") {
            Some(body) => body.text(),
            None => element.text(),
        };
        Self {
            language: element.attribute("language").map(str::to_string),
            body,
        }
    }

    pub(crate) fn to_element(&self, tag: &str) -> XmlElementNode {
        let mut element = XmlElementNode::new(tag);
        if let Some(language) = &self.language {
            element.set_attribute("language", language.as_str());
        }
        let mut body = XmlElementNode::new("body");
        if !self.body.trim().is_empty() {
            body.push_text(self.body.as_str());
        }
        element.push_element(body);
        element
    }
}

/// Placeholder held by a node between registration and the end of its own parse.
#[derive(Debug)]
pub(crate) struct Unparsed;

impl Definition for Unparsed {
    fn tag_name(&self) -> &str {
        "unparsed"
    }

    fn type_label(&self) -> &'static str {
        "Unparsed"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        Vec::new()
    }

    any_accessors!();
}

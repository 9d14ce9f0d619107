use cm_parser::XmlElementNode;

use crate::attributes::NodeParser;
use crate::definition::{
    any_accessors, Definition, NodeField, ParseDefinition, Property, ReferenceField,
};
use crate::node::NodeRef;
use crate::reference::Reference;

/// Root of a `.dimensions` document.
#[derive(Debug, Default)]
pub struct DimensionsDefinition {
    pub diagrams: Vec<NodeRef>,
}

impl DimensionsDefinition {
    pub fn diagram(&self) -> Option<NodeRef> {
        self.diagrams.first().copied()
    }
}

impl Definition for DimensionsDefinition {
    fn tag_name(&self) -> &str {
        "CMMNDI"
    }

    fn type_label(&self) -> &'static str {
        "Dimensions"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![("CMMNDiagram", Property::Children(&self.diagrams))]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![NodeField::Many(&mut self.diagrams)]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        if child_tag != "CMMNDiagram" {
            return false;
        }
        self.diagrams.push(child);
        true
    }

    any_accessors!();
}

impl ParseDefinition for DimensionsDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            diagrams: parser.parse_elements::<DiagramDefinition>("CMMNDiagram"),
        }
    }
}

#[derive(Debug, Default)]
pub struct DiagramDefinition {
    pub shapes: Vec<NodeRef>,
    pub edges: Vec<NodeRef>,
}

impl Definition for DiagramDefinition {
    fn tag_name(&self) -> &str {
        "CMMNDiagram"
    }

    fn type_label(&self) -> &'static str {
        "Diagram"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("CMMNShape", Property::Children(&self.shapes)),
            ("CMMNEdge", Property::Children(&self.edges)),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![
            NodeField::Many(&mut self.shapes),
            NodeField::Many(&mut self.edges),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "CMMNShape" => self.shapes.push(child),
            "CMMNEdge" => self.edges.push(child),
            _ => return false,
        }
        true
    }

    any_accessors!();
}

impl ParseDefinition for DiagramDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            shapes: parser.parse_elements::<ShapeDefinition>("CMMNShape"),
            edges: parser.parse_elements::<EdgeDefinition>("CMMNEdge"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    fn to_element(self) -> XmlElementNode {
        let mut element = XmlElementNode::new("Bounds");
        element.set_attribute("x", self.x.to_string());
        element.set_attribute("y", self.y.to_string());
        element.set_attribute("width", self.width.to_string());
        element.set_attribute("height", self.height.to_string());
        element
    }
}

/// Position of one case element in the diagram.
#[derive(Debug, Default)]
pub struct ShapeDefinition {
    /// Id of the element in the companion `.case` document.
    pub cmmn_element_ref: Reference,
    pub bounds: Option<Bounds>,
}

impl Definition for ShapeDefinition {
    fn tag_name(&self) -> &str {
        "CMMNShape"
    }

    fn type_label(&self) -> &'static str {
        "Shape"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("cmmnElementRef", Property::Reference(&self.cmmn_element_ref)),
            (
                "Bounds",
                Property::Elements(self.bounds.iter().map(|bounds| bounds.to_element()).collect()),
            ),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("cmmnElementRef", &mut self.cmmn_element_ref).may_be_external()]
    }

    any_accessors!();
}

impl ParseDefinition for ShapeDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        let cmmn_element_ref = parser.reference("cmmnElementRef");
        if cmmn_element_ref.id().is_empty() {
            parser.warn(
                "SHAPE_REFERENCE_MISSING",
                "<CMMNShape> has no cmmnElementRef.",
            );
        }

        let element = parser.element();
        let bounds = match element.child("Bounds") {
            Some(bounds) => Some(Bounds {
                x: parser.number_of(bounds, "x").unwrap_or_default(),
                y: parser.number_of(bounds, "y").unwrap_or_default(),
                width: parser.number_of(bounds, "width").unwrap_or_default(),
                height: parser.number_of(bounds, "height").unwrap_or_default(),
            }),
            None => {
                parser.warn(
                    "SHAPE_BOUNDS_MISSING",
                    format!(
                        "<CMMNShape cmmnElementRef=\"{}\"> has no <Bounds>.",
                        cmmn_element_ref.id()
                    ),
                );
                None
            }
        };

        Self {
            cmmn_element_ref,
            bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default)]
pub struct EdgeDefinition {
    pub source_ref: Reference,
    pub target_ref: Reference,
    pub waypoints: Vec<Waypoint>,
}

impl Definition for EdgeDefinition {
    fn tag_name(&self) -> &str {
        "CMMNEdge"
    }

    fn type_label(&self) -> &'static str {
        "Edge"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let waypoints = self
            .waypoints
            .iter()
            .map(|waypoint| {
                let mut element = XmlElementNode::new("waypoint");
                element.set_attribute("x", waypoint.x.to_string());
                element.set_attribute("y", waypoint.y.to_string());
                element
            })
            .collect();
        vec![
            ("sourceCMMNElementRef", Property::Reference(&self.source_ref)),
            ("targetCMMNElementRef", Property::Reference(&self.target_ref)),
            ("waypoint", Property::Elements(waypoints)),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![
            ReferenceField::one("sourceCMMNElementRef", &mut self.source_ref).may_be_external(),
            ReferenceField::one("targetCMMNElementRef", &mut self.target_ref).may_be_external(),
        ]
    }

    any_accessors!();
}

impl ParseDefinition for EdgeDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        let element = parser.element();
        let mut waypoints = Vec::new();
        for point in element.children_named("waypoint") {
            waypoints.push(Waypoint {
                x: parser.number_of(point, "x").unwrap_or_default(),
                y: parser.number_of(point, "y").unwrap_or_default(),
            });
        }
        Self {
            source_ref: parser.reference("sourceCMMNElementRef"),
            target_ref: parser.reference("targetCMMNElementRef"),
            waypoints,
        }
    }
}

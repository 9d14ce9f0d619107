use cm_parser::XmlElementNode;

use crate::attributes::NodeParser;
use crate::definition::{any_accessors, Definition, NodeField, ParseDefinition, Property};
use crate::definitions::ParameterDefinition;
use crate::node::NodeRef;

/// Root of a `.process` document.
#[derive(Debug, Default)]
pub struct ProcessDefinition {
    pub implementation_type: Option<String>,
    pub inputs: Vec<NodeRef>,
    pub outputs: Vec<NodeRef>,
    pub extension_elements: Option<XmlElementNode>,
}

impl Definition for ProcessDefinition {
    fn tag_name(&self) -> &str {
        "process"
    }

    fn type_label(&self) -> &'static str {
        "Process"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            (
                "implementationType",
                Property::Text(self.implementation_type.as_deref()),
            ),
            ("input", Property::Children(&self.inputs)),
            ("output", Property::Children(&self.outputs)),
            (
                "extensionElements",
                Property::Elements(self.extension_elements.iter().cloned().collect()),
            ),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![
            NodeField::Many(&mut self.inputs),
            NodeField::Many(&mut self.outputs),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "input" => self.inputs.push(child),
            "output" => self.outputs.push(child),
            _ => return false,
        }
        true
    }

    any_accessors!();
}

impl ParseDefinition for ProcessDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            implementation_type: parser.attribute("implementationType"),
            inputs: parser.parse_elements::<ParameterDefinition>("input"),
            outputs: parser.parse_elements::<ParameterDefinition>("output"),
            extension_elements: parser.raw_child("extensionElements"),
        }
    }
}

/// Root of a `.humantask` document. The task model is opaque to the definition model.
#[derive(Debug, Default)]
pub struct HumanTaskModelDefinition {
    pub implementation: Option<XmlElementNode>,
}

impl Definition for HumanTaskModelDefinition {
    fn tag_name(&self) -> &str {
        "humantask"
    }

    fn type_label(&self) -> &'static str {
        "HumanTaskModel"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![(
            "implementation",
            Property::Elements(self.implementation.iter().cloned().collect()),
        )]
    }

    any_accessors!();
}

impl ParseDefinition for HumanTaskModelDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        let implementation = parser.raw_child("implementation");
        if implementation.is_none() {
            parser.warn(
                "HUMANTASK_IMPLEMENTATION_MISSING",
                "<humantask> has no implementation element.",
            );
        }
        Self { implementation }
    }
}

/// Root of a `.cfid` document.
#[derive(Debug, Default)]
pub struct CaseFileItemTypeDefinition {
    pub definition_type: Option<String>,
    pub structure_ref: Option<String>,
    pub properties: Vec<NodeRef>,
}

impl Definition for CaseFileItemTypeDefinition {
    fn tag_name(&self) -> &str {
        "caseFileItemDefinition"
    }

    fn type_label(&self) -> &'static str {
        "CaseFileItemType"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            (
                "definitionType",
                Property::Text(self.definition_type.as_deref()),
            ),
            ("structureRef", Property::Text(self.structure_ref.as_deref())),
            ("property", Property::Children(&self.properties)),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![NodeField::Many(&mut self.properties)]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        if child_tag != "property" {
            return false;
        }
        self.properties.push(child);
        true
    }

    any_accessors!();
}

impl ParseDefinition for CaseFileItemTypeDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            definition_type: parser.attribute("definitionType"),
            structure_ref: parser.attribute("structureRef"),
            properties: parser.parse_elements::<PropertyDefinition>("property"),
        }
    }
}

#[derive(Debug, Default)]
pub struct PropertyDefinition {
    pub property_type: Option<String>,
}

impl Definition for PropertyDefinition {
    fn tag_name(&self) -> &str {
        "property"
    }

    fn type_label(&self) -> &'static str {
        "Property"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![("type", Property::Text(self.property_type.as_deref()))]
    }

    any_accessors!();
}

impl ParseDefinition for PropertyDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            property_type: parser.attribute("type"),
        }
    }
}

use crate::attributes::NodeParser;
use crate::definition::{
    any_accessors, Definition, Expression, NodeField, ParseDefinition, Property, ReferenceField,
};
use crate::definitions::{CaseFileDefinition, StageDefinition};
use crate::node::NodeRef;
use crate::reference::Reference;
use cm_parser::XmlElementNode;

/// Root of a `.case` document.
#[derive(Debug, Default)]
pub struct CaseDefinition {
    pub case_file_model: Option<NodeRef>,
    pub case_plan_model: Option<NodeRef>,
    pub roles: Vec<NodeRef>,
    pub inputs: Vec<NodeRef>,
    pub outputs: Vec<NodeRef>,
    pub extension_elements: Option<XmlElementNode>,
}

impl Definition for CaseDefinition {
    fn tag_name(&self) -> &str {
        "case"
    }

    fn type_label(&self) -> &'static str {
        "Case"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("caseFileModel", Property::Child(self.case_file_model)),
            ("casePlanModel", Property::Child(self.case_plan_model)),
            ("caseRoles", Property::Wrapped(&self.roles)),
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
            NodeField::One(&mut self.case_file_model),
            NodeField::One(&mut self.case_plan_model),
            NodeField::Many(&mut self.roles),
            NodeField::Many(&mut self.inputs),
            NodeField::Many(&mut self.outputs),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "caseFileModel" if self.case_file_model.is_none() => {
                self.case_file_model = Some(child)
            }
            "casePlanModel" if self.case_plan_model.is_none() => {
                self.case_plan_model = Some(child)
            }
            "role" => self.roles.push(child),
            "input" => self.inputs.push(child),
            "output" => self.outputs.push(child),
            _ => return false,
        }
        true
    }

    any_accessors!();
}

impl ParseDefinition for CaseDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            case_file_model: parser.parse_element::<CaseFileDefinition>("caseFileModel"),
            case_plan_model: parser.parse_element::<StageDefinition>("casePlanModel"),
            roles: parser.parse_wrapped::<CaseRoleDefinition>("caseRoles", "role"),
            inputs: parser.parse_elements::<ParameterDefinition>("input"),
            outputs: parser.parse_elements::<ParameterDefinition>("output"),
            extension_elements: parser.raw_child("extensionElements"),
        }
    }
}

#[derive(Debug, Default)]
pub struct CaseRoleDefinition;

impl Definition for CaseRoleDefinition {
    fn tag_name(&self) -> &str {
        "role"
    }

    fn type_label(&self) -> &'static str {
        "Role"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        Vec::new()
    }

    any_accessors!();
}

impl ParseDefinition for CaseRoleDefinition {
    fn parse(_parser: &mut NodeParser<'_>) -> Self {
        Self
    }
}

/// Case parameters (`input` / `output`) and task parameters (`inputs` / `outputs`).
#[derive(Debug)]
pub struct ParameterDefinition {
    tag: String,
    pub binding_ref: Reference,
    pub binding_refinement: Option<Expression>,
}

impl ParameterDefinition {
    /// `tag` is one of `input`, `output`, `inputs`, `outputs`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            binding_ref: Reference::default(),
            binding_refinement: None,
        }
    }

    pub fn is_input(&self) -> bool {
        self.tag.starts_with("input")
    }
}

impl Default for ParameterDefinition {
    fn default() -> Self {
        Self::new("input")
    }
}

impl Definition for ParameterDefinition {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn type_label(&self) -> &'static str {
        if self.is_input() {
            "InputParameter"
        } else {
            "OutputParameter"
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("bindingRef", Property::Reference(&self.binding_ref)),
            (
                "bindingRefinement",
                Property::Expression(self.binding_refinement.as_ref()),
            ),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("bindingRef", &mut self.binding_ref)]
    }

    any_accessors!();
}

impl ParseDefinition for ParameterDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            tag: parser.element().local_name().to_string(),
            binding_ref: parser.reference("bindingRef"),
            binding_refinement: parser.expression("bindingRefinement"),
        }
    }
}

use cm_parser::XmlElementNode;

use crate::attributes::NodeParser;
use crate::definition::{
    any_accessors, Definition, Expression, NodeField, ParseDefinition, Property, ReferenceField,
    RemovalEffect,
};
use crate::definitions::{ParameterDefinition, PlanningTableDefinition};
use crate::node::NodeRef;
use crate::reference::{Reference, ReferenceList};

const CAFIENNE_NAMESPACE: &str = "org.cafienne";

/// Parameters and mappings every task kind carries.
#[derive(Debug)]
pub struct TaskData {
    pub is_blocking: bool,
    pub inputs: Vec<NodeRef>,
    pub outputs: Vec<NodeRef>,
    pub mappings: Vec<NodeRef>,
}

impl Default for TaskData {
    fn default() -> Self {
        Self {
            is_blocking: true,
            inputs: Vec::new(),
            outputs: Vec::new(),
            mappings: Vec::new(),
        }
    }
}

impl TaskData {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            is_blocking: parser.boolean("isBlocking", true),
            inputs: parser.parse_elements::<ParameterDefinition>("inputs"),
            outputs: parser.parse_elements::<ParameterDefinition>("outputs"),
            mappings: parser.parse_elements::<ParameterMappingDefinition>("parameterMapping"),
        }
    }

    fn flag(&self) -> (&'static str, Property<'_>) {
        (
            "isBlocking",
            Property::Flag {
                value: self.is_blocking,
                default: true,
            },
        )
    }

    fn children(&self) -> [(&'static str, Property<'_>); 3] {
        [
            ("inputs", Property::Children(&self.inputs)),
            ("outputs", Property::Children(&self.outputs)),
            ("parameterMapping", Property::Children(&self.mappings)),
        ]
    }

    fn node_fields(&mut self) -> [NodeField<'_>; 3] {
        [
            NodeField::Many(&mut self.inputs),
            NodeField::Many(&mut self.outputs),
            NodeField::Many(&mut self.mappings),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "inputs" => self.inputs.push(child),
            "outputs" => self.outputs.push(child),
            "parameterMapping" => self.mappings.push(child),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct HumanTaskDefinition {
    pub task: TaskData,
    pub performer_ref: Reference,
    pub planning_table: Option<NodeRef>,
    /// Kept verbatim; holds the `cafienne:implementation` element.
    pub extension_elements: Option<XmlElementNode>,
}

impl HumanTaskDefinition {
    /// File name of the `.humantask` implementation this task points at.
    pub fn human_task_ref(&self) -> Option<&str> {
        self.extension_elements
            .as_ref()?
            .child("implementation")?
            .attribute("humanTaskRef")
    }

    pub fn set_human_task_ref(&mut self, file_name: &str) {
        let extensions = self
            .extension_elements
            .get_or_insert_with(|| XmlElementNode::new("extensionElements"));
        let existing = extensions
            .element_children_mut()
            .find(|element| element.local_name() == "implementation");
        match existing {
            Some(implementation) => implementation.set_attribute("humanTaskRef", file_name),
            None => {
                let mut implementation = XmlElementNode::new("cafienne:implementation");
                implementation.set_attribute("xmlns:cafienne", CAFIENNE_NAMESPACE);
                implementation.set_attribute("humanTaskRef", file_name);
                extensions.push_element(implementation);
            }
        }
    }
}

impl Definition for HumanTaskDefinition {
    fn tag_name(&self) -> &str {
        "humanTask"
    }

    fn type_label(&self) -> &'static str {
        "HumanTask"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let mut properties = vec![
            self.task.flag(),
            ("performerRef", Property::Reference(&self.performer_ref)),
            (
                "extensionElements",
                Property::Elements(self.extension_elements.iter().cloned().collect()),
            ),
        ];
        properties.extend(self.task.children());
        properties.push(("planningTable", Property::Child(self.planning_table)));
        properties
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        let mut fields: Vec<NodeField<'_>> = self.task.node_fields().into();
        fields.push(NodeField::One(&mut self.planning_table));
        fields
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("performerRef", &mut self.performer_ref)]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        if child_tag == "planningTable" {
            if self.planning_table.is_some() {
                return false;
            }
            self.planning_table = Some(child);
            return true;
        }
        self.task.adopt(child, child_tag)
    }

    any_accessors!();
}

impl ParseDefinition for HumanTaskDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            task: TaskData::parse(parser),
            performer_ref: parser.reference("performerRef"),
            planning_table: parser.parse_element::<PlanningTableDefinition>("planningTable"),
            extension_elements: parser.raw_child("extensionElements"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ProcessTaskDefinition {
    pub task: TaskData,
    /// File name of a `.process` document.
    pub process_ref: Option<String>,
}

impl Definition for ProcessTaskDefinition {
    fn tag_name(&self) -> &str {
        "processTask"
    }

    fn type_label(&self) -> &'static str {
        "ProcessTask"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let mut properties = vec![
            self.task.flag(),
            ("processRef", Property::Text(self.process_ref.as_deref())),
        ];
        properties.extend(self.task.children());
        properties
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        self.task.node_fields().into()
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        self.task.adopt(child, child_tag)
    }

    any_accessors!();
}

impl ParseDefinition for ProcessTaskDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            task: TaskData::parse(parser),
            process_ref: parser.attribute("processRef"),
        }
    }
}

#[derive(Debug, Default)]
pub struct CaseTaskDefinition {
    pub task: TaskData,
    /// File name of the sub case.
    pub case_ref: Option<String>,
}

impl Definition for CaseTaskDefinition {
    fn tag_name(&self) -> &str {
        "caseTask"
    }

    fn type_label(&self) -> &'static str {
        "CaseTask"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let mut properties = vec![
            self.task.flag(),
            ("caseRef", Property::Text(self.case_ref.as_deref())),
        ];
        properties.extend(self.task.children());
        properties
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        self.task.node_fields().into()
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        self.task.adopt(child, child_tag)
    }

    any_accessors!();
}

impl ParseDefinition for CaseTaskDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            task: TaskData::parse(parser),
            case_ref: parser.attribute("caseRef"),
        }
    }
}

/// Maps a task parameter onto a parameter of the implementation. Either side may live in
/// the implementation's own document.
#[derive(Debug, Default)]
pub struct ParameterMappingDefinition {
    pub source_ref: Reference,
    pub target_ref: Reference,
    pub transformation: Option<Expression>,
}

impl Definition for ParameterMappingDefinition {
    fn tag_name(&self) -> &str {
        "parameterMapping"
    }

    fn type_label(&self) -> &'static str {
        "ParameterMapping"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("sourceRef", Property::Reference(&self.source_ref)),
            ("targetRef", Property::Reference(&self.target_ref)),
            (
                "transformation",
                Property::Expression(self.transformation.as_ref()),
            ),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![
            ReferenceField::one("sourceRef", &mut self.source_ref).may_be_external(),
            ReferenceField::one("targetRef", &mut self.target_ref).may_be_external(),
        ]
    }

    fn reference_removed(&mut self, _field: &'static str) -> RemovalEffect {
        RemovalEffect::RemoveSelf
    }

    any_accessors!();
}

impl ParseDefinition for ParameterMappingDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            source_ref: parser.reference("sourceRef"),
            target_ref: parser.reference("targetRef"),
            transformation: parser.expression("transformation"),
        }
    }
}

#[derive(Debug, Default)]
pub struct MilestoneDefinition;

impl Definition for MilestoneDefinition {
    fn tag_name(&self) -> &str {
        "milestone"
    }

    fn type_label(&self) -> &'static str {
        "Milestone"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        Vec::new()
    }

    any_accessors!();
}

impl ParseDefinition for MilestoneDefinition {
    fn parse(_parser: &mut NodeParser<'_>) -> Self {
        Self
    }
}

#[derive(Debug, Default)]
pub struct TimerEventDefinition {
    pub timer_expression: Option<Expression>,
}

impl Definition for TimerEventDefinition {
    fn tag_name(&self) -> &str {
        "timerEvent"
    }

    fn type_label(&self) -> &'static str {
        "TimerEvent"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![(
            "timerExpression",
            Property::Expression(self.timer_expression.as_ref()),
        )]
    }

    any_accessors!();
}

impl ParseDefinition for TimerEventDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            timer_expression: parser.expression("timerExpression"),
        }
    }
}

#[derive(Debug, Default)]
pub struct UserEventDefinition {
    pub authorized_role_refs: ReferenceList,
}

impl Definition for UserEventDefinition {
    fn tag_name(&self) -> &str {
        "userEvent"
    }

    fn type_label(&self) -> &'static str {
        "UserEvent"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![(
            "authorizedRoleRefs",
            Property::References(&self.authorized_role_refs),
        )]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::many(
            "authorizedRoleRefs",
            &mut self.authorized_role_refs,
        )]
    }

    any_accessors!();
}

impl ParseDefinition for UserEventDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            authorized_role_refs: parser.references("authorizedRoleRefs"),
        }
    }
}

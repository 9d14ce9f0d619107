use crate::attributes::NodeParser;
use crate::definition::{
    any_accessors, Definition, Expression, NodeField, ParseDefinition, Property, ReferenceField,
    RemovalEffect,
};
use crate::definitions::{
    CaseTaskDefinition, CriterionDefinition, HumanTaskDefinition, MilestoneDefinition,
    ProcessTaskDefinition, SentryDefinition, TimerEventDefinition, UserEventDefinition,
    PLAN_ITEM_DEFINITION_TAGS,
};
use crate::node::NodeRef;
use crate::reference::{Reference, ReferenceList};

/// `casePlanModel` or a nested `stage`.
#[derive(Debug)]
pub struct StageDefinition {
    tag: String,
    pub auto_complete: bool,
    pub planning_table: Option<NodeRef>,
    pub plan_items: Vec<NodeRef>,
    pub sentries: Vec<NodeRef>,
    /// Plan item definitions (tasks, milestones, events, stages) in document order.
    pub definitions: Vec<NodeRef>,
    pub exit_criteria: Vec<NodeRef>,
}

impl StageDefinition {
    pub fn case_plan() -> Self {
        Self::with_tag("casePlanModel")
    }

    fn with_tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            auto_complete: false,
            planning_table: None,
            plan_items: Vec::new(),
            sentries: Vec::new(),
            definitions: Vec::new(),
            exit_criteria: Vec::new(),
        }
    }

    pub fn is_case_plan(&self) -> bool {
        self.tag == "casePlanModel"
    }
}

impl Default for StageDefinition {
    fn default() -> Self {
        Self::with_tag("stage")
    }
}

impl Definition for StageDefinition {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn type_label(&self) -> &'static str {
        if self.is_case_plan() {
            "CasePlan"
        } else {
            "Stage"
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            (
                "autoComplete",
                Property::Flag {
                    value: self.auto_complete,
                    default: false,
                },
            ),
            ("planningTable", Property::Child(self.planning_table)),
            ("planItem", Property::Children(&self.plan_items)),
            ("sentry", Property::Children(&self.sentries)),
            ("planItemDefinition", Property::Children(&self.definitions)),
            ("exitCriterion", Property::Children(&self.exit_criteria)),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![
            NodeField::One(&mut self.planning_table),
            NodeField::Many(&mut self.plan_items),
            NodeField::Many(&mut self.sentries),
            NodeField::Many(&mut self.definitions),
            NodeField::Many(&mut self.exit_criteria),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "planningTable" if self.planning_table.is_none() => self.planning_table = Some(child),
            "planItem" => self.plan_items.push(child),
            "sentry" => self.sentries.push(child),
            "exitCriterion" => self.exit_criteria.push(child),
            tag if PLAN_ITEM_DEFINITION_TAGS.contains(&tag) => self.definitions.push(child),
            _ => return false,
        }
        true
    }

    any_accessors!();
}

impl ParseDefinition for StageDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        let mut stage = Self::with_tag(parser.element().local_name());
        stage.auto_complete = parser.boolean("autoComplete", false);
        stage.planning_table = parser.parse_element::<PlanningTableDefinition>("planningTable");
        stage.plan_items = parser.parse_elements::<PlanItemDefinition>("planItem");
        stage.sentries = parser.parse_elements::<SentryDefinition>("sentry");

        let element = parser.element();
        for child in element.element_children() {
            let node = match child.local_name() {
                "humanTask" => parser.parse_child::<HumanTaskDefinition>(child),
                "processTask" => parser.parse_child::<ProcessTaskDefinition>(child),
                "caseTask" => parser.parse_child::<CaseTaskDefinition>(child),
                "milestone" => parser.parse_child::<MilestoneDefinition>(child),
                "timerEvent" => parser.parse_child::<TimerEventDefinition>(child),
                "userEvent" => parser.parse_child::<UserEventDefinition>(child),
                "stage" => parser.parse_child::<StageDefinition>(child),
                _ => continue,
            };
            stage.definitions.push(node);
        }

        stage.exit_criteria = parser.parse_elements::<CriterionDefinition>("exitCriterion");
        stage
    }
}

/// Entry and exit criteria plus the item control shared by plan items and discretionary
/// items.
#[derive(Debug, Default)]
struct ItemParts {
    entry_criteria: Vec<NodeRef>,
    exit_criteria: Vec<NodeRef>,
    item_control: Option<NodeRef>,
}

impl ItemParts {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            item_control: parser.parse_element::<ItemControlDefinition>("itemControl"),
            entry_criteria: parser.parse_elements::<CriterionDefinition>("entryCriterion"),
            exit_criteria: parser.parse_elements::<CriterionDefinition>("exitCriterion"),
        }
    }

    fn properties(&self) -> [(&'static str, Property<'_>); 3] {
        [
            ("itemControl", Property::Child(self.item_control)),
            ("entryCriterion", Property::Children(&self.entry_criteria)),
            ("exitCriterion", Property::Children(&self.exit_criteria)),
        ]
    }

    fn node_fields(&mut self) -> [NodeField<'_>; 3] {
        [
            NodeField::One(&mut self.item_control),
            NodeField::Many(&mut self.entry_criteria),
            NodeField::Many(&mut self.exit_criteria),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "itemControl" if self.item_control.is_none() => self.item_control = Some(child),
            "entryCriterion" => self.entry_criteria.push(child),
            "exitCriterion" => self.exit_criteria.push(child),
            _ => return false,
        }
        true
    }
}

/// Use of a plan item definition inside a stage.
#[derive(Debug, Default)]
pub struct PlanItemDefinition {
    pub definition_ref: Reference,
    parts: ItemParts,
    pub(crate) legacy_entry_refs: ReferenceList,
    pub(crate) legacy_exit_refs: ReferenceList,
}

impl PlanItemDefinition {
    pub fn entry_criteria(&self) -> &[NodeRef] {
        &self.parts.entry_criteria
    }

    pub fn exit_criteria(&self) -> &[NodeRef] {
        &self.parts.exit_criteria
    }

    pub fn item_control(&self) -> Option<NodeRef> {
        self.parts.item_control
    }
}

impl Definition for PlanItemDefinition {
    fn tag_name(&self) -> &str {
        "planItem"
    }

    fn type_label(&self) -> &'static str {
        "PlanItem"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let mut properties = vec![("definitionRef", Property::Reference(&self.definition_ref))];
        properties.extend(self.parts.properties());
        properties
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        self.parts.node_fields().into()
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("definitionRef", &mut self.definition_ref)]
    }

    fn consumed_attributes(&self) -> &'static [&'static str] {
        &["entryCriteriaRefs", "exitCriteriaRefs"]
    }

    fn reference_removed(&mut self, field: &'static str) -> RemovalEffect {
        match field {
            "definitionRef" => RemovalEffect::RemoveSelf,
            _ => RemovalEffect::Keep,
        }
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        self.parts.adopt(child, child_tag)
    }

    any_accessors!();
}

impl ParseDefinition for PlanItemDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            definition_ref: parser.reference("definitionRef"),
            parts: ItemParts::parse(parser),
            legacy_entry_refs: parser.references("entryCriteriaRefs"),
            legacy_exit_refs: parser.references("exitCriteriaRefs"),
        }
    }
}

/// Plan item that a case worker may add at run time from a planning table.
#[derive(Debug, Default)]
pub struct DiscretionaryItemDefinition {
    pub definition_ref: Reference,
    pub applicability_rule_refs: ReferenceList,
    pub authorized_role_refs: ReferenceList,
    parts: ItemParts,
}

impl DiscretionaryItemDefinition {
    pub fn entry_criteria(&self) -> &[NodeRef] {
        &self.parts.entry_criteria
    }

    pub fn exit_criteria(&self) -> &[NodeRef] {
        &self.parts.exit_criteria
    }
}

impl Definition for DiscretionaryItemDefinition {
    fn tag_name(&self) -> &str {
        "discretionaryItem"
    }

    fn type_label(&self) -> &'static str {
        "DiscretionaryItem"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let mut properties = vec![
            ("definitionRef", Property::Reference(&self.definition_ref)),
            (
                "applicabilityRuleRefs",
                Property::References(&self.applicability_rule_refs),
            ),
            (
                "authorizedRoleRefs",
                Property::References(&self.authorized_role_refs),
            ),
        ];
        properties.extend(self.parts.properties());
        properties
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        self.parts.node_fields().into()
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![
            ReferenceField::one("definitionRef", &mut self.definition_ref),
            ReferenceField::many("applicabilityRuleRefs", &mut self.applicability_rule_refs),
            ReferenceField::many("authorizedRoleRefs", &mut self.authorized_role_refs),
        ]
    }

    fn reference_removed(&mut self, field: &'static str) -> RemovalEffect {
        match field {
            "definitionRef" => RemovalEffect::RemoveSelf,
            _ => RemovalEffect::Keep,
        }
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        self.parts.adopt(child, child_tag)
    }

    any_accessors!();
}

impl ParseDefinition for DiscretionaryItemDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            definition_ref: parser.reference("definitionRef"),
            applicability_rule_refs: parser.references("applicabilityRuleRefs"),
            authorized_role_refs: parser.references("authorizedRoleRefs"),
            parts: ItemParts::parse(parser),
        }
    }
}

#[derive(Debug, Default)]
pub struct PlanningTableDefinition {
    /// Discretionary items and nested planning tables in document order.
    pub table_items: Vec<NodeRef>,
    pub applicability_rules: Vec<NodeRef>,
}

impl Definition for PlanningTableDefinition {
    fn tag_name(&self) -> &str {
        "planningTable"
    }

    fn type_label(&self) -> &'static str {
        "PlanningTable"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("tableItem", Property::Children(&self.table_items)),
            ("applicabilityRule", Property::Children(&self.applicability_rules)),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![
            NodeField::Many(&mut self.table_items),
            NodeField::Many(&mut self.applicability_rules),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "discretionaryItem" | "planningTable" => self.table_items.push(child),
            "applicabilityRule" => self.applicability_rules.push(child),
            _ => return false,
        }
        true
    }

    any_accessors!();
}

impl ParseDefinition for PlanningTableDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        let mut table = Self::default();
        let element = parser.element();
        for child in element.element_children() {
            match child.local_name() {
                "discretionaryItem" => table
                    .table_items
                    .push(parser.parse_child::<DiscretionaryItemDefinition>(child)),
                "planningTable" => table
                    .table_items
                    .push(parser.parse_child::<PlanningTableDefinition>(child)),
                _ => {}
            }
        }
        table.applicability_rules =
            parser.parse_elements::<ApplicabilityRuleDefinition>("applicabilityRule");
        table
    }
}

#[derive(Debug, Default)]
pub struct ApplicabilityRuleDefinition {
    pub context_ref: Reference,
    pub condition: Option<Expression>,
}

impl Definition for ApplicabilityRuleDefinition {
    fn tag_name(&self) -> &str {
        "applicabilityRule"
    }

    fn type_label(&self) -> &'static str {
        "ApplicabilityRule"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("contextRef", Property::Reference(&self.context_ref)),
            ("condition", Property::Expression(self.condition.as_ref())),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("contextRef", &mut self.context_ref)]
    }

    any_accessors!();
}

impl ParseDefinition for ApplicabilityRuleDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            context_ref: parser.reference("contextRef"),
            condition: parser.expression("condition"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ItemControlDefinition {
    pub repetition_rule: Option<NodeRef>,
    pub required_rule: Option<NodeRef>,
    pub manual_activation_rule: Option<NodeRef>,
}

impl Definition for ItemControlDefinition {
    fn tag_name(&self) -> &str {
        "itemControl"
    }

    fn type_label(&self) -> &'static str {
        "ItemControl"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("repetitionRule", Property::Child(self.repetition_rule)),
            ("requiredRule", Property::Child(self.required_rule)),
            (
                "manualActivationRule",
                Property::Child(self.manual_activation_rule),
            ),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![
            NodeField::One(&mut self.repetition_rule),
            NodeField::One(&mut self.required_rule),
            NodeField::One(&mut self.manual_activation_rule),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        let slot = match child_tag {
            "repetitionRule" => &mut self.repetition_rule,
            "requiredRule" => &mut self.required_rule,
            "manualActivationRule" => &mut self.manual_activation_rule,
            _ => return false,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(child);
        true
    }

    any_accessors!();
}

impl ParseDefinition for ItemControlDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            repetition_rule: parser.parse_element::<ConstraintDefinition>("repetitionRule"),
            required_rule: parser.parse_element::<ConstraintDefinition>("requiredRule"),
            manual_activation_rule: parser
                .parse_element::<ConstraintDefinition>("manualActivationRule"),
        }
    }
}

/// Repetition, required or manual activation rule.
#[derive(Debug)]
pub struct ConstraintDefinition {
    tag: String,
    pub context_ref: Reference,
    pub condition: Option<Expression>,
}

impl ConstraintDefinition {
    /// `tag` is one of `repetitionRule`, `requiredRule`, `manualActivationRule`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            context_ref: Reference::default(),
            condition: None,
        }
    }
}

impl Default for ConstraintDefinition {
    fn default() -> Self {
        Self::new("repetitionRule")
    }
}

impl Definition for ConstraintDefinition {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn type_label(&self) -> &'static str {
        match self.tag.as_str() {
            "requiredRule" => "RequiredRule",
            "manualActivationRule" => "ManualActivationRule",
            _ => "RepetitionRule",
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("contextRef", Property::Reference(&self.context_ref)),
            ("condition", Property::Expression(self.condition.as_ref())),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("contextRef", &mut self.context_ref)]
    }

    any_accessors!();
}

impl ParseDefinition for ConstraintDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            tag: parser.element().local_name().to_string(),
            context_ref: parser.reference("contextRef"),
            condition: parser.expression("condition"),
        }
    }
}

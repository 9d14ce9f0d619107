use crate::attributes::NodeParser;
use crate::definition::{
    any_accessors, Definition, Expression, NodeField, ParseDefinition, Property, ReferenceField,
    RemovalEffect,
};
use crate::node::NodeRef;
use crate::reference::Reference;

#[derive(Debug, Default)]
pub struct SentryDefinition {
    /// Plan item and case file item on parts in document order.
    pub on_parts: Vec<NodeRef>,
    pub if_part: Option<NodeRef>,
}

impl Definition for SentryDefinition {
    fn tag_name(&self) -> &str {
        "sentry"
    }

    fn type_label(&self) -> &'static str {
        "Sentry"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("onPart", Property::Children(&self.on_parts)),
            ("ifPart", Property::Child(self.if_part)),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![
            NodeField::Many(&mut self.on_parts),
            NodeField::One(&mut self.if_part),
        ]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        match child_tag {
            "planItemOnPart" | "caseFileItemOnPart" => self.on_parts.push(child),
            "ifPart" if self.if_part.is_none() => self.if_part = Some(child),
            _ => return false,
        }
        true
    }

    any_accessors!();
}

impl ParseDefinition for SentryDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        let mut sentry = Self::default();
        let element = parser.element();
        for child in element.element_children() {
            match child.local_name() {
                "planItemOnPart" => sentry
                    .on_parts
                    .push(parser.parse_child::<PlanItemOnPartDefinition>(child)),
                "caseFileItemOnPart" => sentry
                    .on_parts
                    .push(parser.parse_child::<CaseFileItemOnPartDefinition>(child)),
                _ => {}
            }
        }
        sentry.if_part = parser.parse_element::<IfPartDefinition>("ifPart");
        sentry
    }
}

/// `entryCriterion` or `exitCriterion`.
#[derive(Debug)]
pub struct CriterionDefinition {
    exit: bool,
    pub sentry_ref: Reference,
}

impl CriterionDefinition {
    pub fn entry() -> Self {
        Self {
            exit: false,
            sentry_ref: Reference::default(),
        }
    }

    pub fn exit() -> Self {
        Self {
            exit: true,
            sentry_ref: Reference::default(),
        }
    }

    pub fn with_sentry(mut self, sentry_id: impl Into<String>) -> Self {
        self.sentry_ref = Reference::new(sentry_id);
        self
    }

    pub fn is_exit(&self) -> bool {
        self.exit
    }
}

impl Default for CriterionDefinition {
    fn default() -> Self {
        Self::entry()
    }
}

impl Definition for CriterionDefinition {
    fn tag_name(&self) -> &str {
        if self.exit {
            "exitCriterion"
        } else {
            "entryCriterion"
        }
    }

    fn type_label(&self) -> &'static str {
        if self.exit {
            "ExitCriterion"
        } else {
            "EntryCriterion"
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![("sentryRef", Property::Reference(&self.sentry_ref))]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("sentryRef", &mut self.sentry_ref)]
    }

    fn reference_removed(&mut self, _field: &'static str) -> RemovalEffect {
        RemovalEffect::RemoveSelf
    }

    any_accessors!();
}

impl ParseDefinition for CriterionDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            exit: parser.element().local_name() == "exitCriterion",
            sentry_ref: parser.reference("sentryRef"),
        }
    }
}

#[derive(Debug)]
pub struct PlanItemOnPartDefinition {
    pub source_ref: Reference,
    pub standard_event: String,
    pub exit_criterion_ref: Reference,
    /// CMMN 1.0 form, rewritten to `exitCriterionRef` while loading.
    pub(crate) legacy_sentry_ref: Reference,
}

impl Default for PlanItemOnPartDefinition {
    fn default() -> Self {
        Self {
            source_ref: Reference::default(),
            standard_event: "complete".to_string(),
            exit_criterion_ref: Reference::default(),
            legacy_sentry_ref: Reference::default(),
        }
    }
}

impl PlanItemOnPartDefinition {
    pub fn legacy_sentry_ref(&self) -> &Reference {
        &self.legacy_sentry_ref
    }
}

impl Definition for PlanItemOnPartDefinition {
    fn tag_name(&self) -> &str {
        "planItemOnPart"
    }

    fn type_label(&self) -> &'static str {
        "PlanItemOnPart"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("sourceRef", Property::Reference(&self.source_ref)),
            ("exitCriterionRef", Property::Reference(&self.exit_criterion_ref)),
            ("sentryRef", Property::Reference(&self.legacy_sentry_ref)),
            (
                "standardEvent",
                Property::ElementText(Some(self.standard_event.as_str())),
            ),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![
            ReferenceField::one("sourceRef", &mut self.source_ref),
            ReferenceField::one("exitCriterionRef", &mut self.exit_criterion_ref),
            ReferenceField::one("sentryRef", &mut self.legacy_sentry_ref),
        ]
    }

    fn reference_removed(&mut self, field: &'static str) -> RemovalEffect {
        match field {
            "sourceRef" => RemovalEffect::RemoveSelf,
            _ => RemovalEffect::Keep,
        }
    }

    any_accessors!();
}

impl ParseDefinition for PlanItemOnPartDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            source_ref: parser.reference("sourceRef"),
            standard_event: parser.element_text("standardEvent", "complete"),
            exit_criterion_ref: parser.reference("exitCriterionRef"),
            legacy_sentry_ref: parser.reference("sentryRef"),
        }
    }
}

#[derive(Debug)]
pub struct CaseFileItemOnPartDefinition {
    pub source_ref: Reference,
    pub standard_event: String,
}

impl Default for CaseFileItemOnPartDefinition {
    fn default() -> Self {
        Self {
            source_ref: Reference::default(),
            standard_event: "create".to_string(),
        }
    }
}

impl Definition for CaseFileItemOnPartDefinition {
    fn tag_name(&self) -> &str {
        "caseFileItemOnPart"
    }

    fn type_label(&self) -> &'static str {
        "CaseFileItemOnPart"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("sourceRef", Property::Reference(&self.source_ref)),
            (
                "standardEvent",
                Property::ElementText(Some(self.standard_event.as_str())),
            ),
        ]
    }

    fn reference_fields(&mut self) -> Vec<ReferenceField<'_>> {
        vec![ReferenceField::one("sourceRef", &mut self.source_ref)]
    }

    fn reference_removed(&mut self, _field: &'static str) -> RemovalEffect {
        RemovalEffect::RemoveSelf
    }

    any_accessors!();
}

impl ParseDefinition for CaseFileItemOnPartDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            source_ref: parser.reference("sourceRef"),
            standard_event: parser.element_text("standardEvent", "create"),
        }
    }
}

#[derive(Debug, Default)]
pub struct IfPartDefinition {
    pub context_ref: Reference,
    pub condition: Option<Expression>,
}

impl Definition for IfPartDefinition {
    fn tag_name(&self) -> &str {
        "ifPart"
    }

    fn type_label(&self) -> &'static str {
        "IfPart"
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

impl ParseDefinition for IfPartDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            context_ref: parser.reference("contextRef"),
            condition: parser.expression("condition"),
        }
    }
}

//! Typed definitions, one module per area of the notation.

mod artifact;
mod case;
mod case_file;
mod dimensions;
mod plan;
mod sentry;
mod task;

pub use artifact::{
    CaseFileItemTypeDefinition, HumanTaskModelDefinition, ProcessDefinition, PropertyDefinition,
};
pub use case::{CaseDefinition, CaseRoleDefinition, ParameterDefinition};
pub use case_file::{CaseFileDefinition, CaseFileItemDefinition};
pub use dimensions::{Bounds, DiagramDefinition, DimensionsDefinition, EdgeDefinition, ShapeDefinition, Waypoint};
pub use plan::{
    ApplicabilityRuleDefinition, ConstraintDefinition, DiscretionaryItemDefinition,
    ItemControlDefinition, PlanItemDefinition, PlanningTableDefinition, StageDefinition,
};
pub use sentry::{
    CaseFileItemOnPartDefinition, CriterionDefinition, IfPartDefinition,
    PlanItemOnPartDefinition, SentryDefinition,
};
pub use task::{
    CaseTaskDefinition, HumanTaskDefinition, MilestoneDefinition, ParameterMappingDefinition,
    ProcessTaskDefinition, TaskData, TimerEventDefinition, UserEventDefinition,
};

/// Element names of everything a stage can hold as a plan item definition.
pub const PLAN_ITEM_DEFINITION_TAGS: [&str; 7] = [
    "humanTask",
    "processTask",
    "caseTask",
    "milestone",
    "timerEvent",
    "userEvent",
    "stage",
];

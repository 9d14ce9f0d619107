use crate::definitions::{
    CaseRoleDefinition, CriterionDefinition, HumanTaskDefinition, MilestoneDefinition,
    PlanItemDefinition, PlanItemOnPartDefinition, ShapeDefinition, StageDefinition,
};
use crate::model_test_support::*;
use crate::{CaseModel, DefinitionDocument, DocumentKind};

#[test]
fn export_is_a_fixed_point() {
    let mut document = hello();
    assert!(document.is_valid());
    let first = export(&mut document);
    let mut reparsed = parse_case(&first);
    let second = export(&mut reparsed);
    assert_eq!(first, second);
    assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<case id=\"hello.case\""));
    assert!(first.contains("humanTaskRef=\"approve.humantask\""));
    assert!(first.contains("<standardEvent>complete</standardEvent>"));
}

#[test]
fn small_document_exports_exactly() {
    let mut document = DefinitionDocument::parse_as(
        DocumentKind::Process,
        "callback.process",
        r#"<process id="callback.process" name="callback" implementationType="http">
               <input id="in_payload" name="payload"/>
           </process>"#,
    );
    assert_eq!(
        export(&mut document),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<process id=\"callback.process\" name=\"callback\" implementationType=\"http\">\n\
\x20   <input id=\"in_payload\" name=\"payload\"/>\n\
</process>\n"
    );
}

#[test]
fn root_namespaces_survive_export() {
    let mut document = parse_case(NAMESPACED_CASE);
    assert!(document.is_valid());
    let first = export(&mut document);
    assert!(first.contains(
        "<case xmlns=\"http://www.omg.org/spec/CMMN/20151109/MODEL\" xmlns:cafienne=\"org.cafienne\" id=\"hello.case\""
    ));
    assert!(first.contains("<cafienne:implementation humanTaskRef=\"approve.humantask\"/>"));

    let mut reparsed = parse_case(&first);
    assert!(reparsed.is_valid());
    assert_eq!(export(&mut reparsed), first);
}

#[test]
fn unknown_attributes_are_written_back() {
    let mut document = parse_case(NAMESPACED_CASE);
    let exported = export(&mut document);
    assert!(exported.contains("name=\"hello\" expressionLanguage=\"spel\" guid=\"_3kq\">"));

    let source = HELLO_CASE.replace(
        "<milestone id=\"ms_done\" name=\"Done\"/>",
        "<milestone id=\"ms_done\" name=\"Done\" cafienne:color=\"red\" xmlns:cafienne=\"org.cafienne\"/>",
    );
    let mut document = parse_case(&source);
    assert!(export(&mut document).contains(
        "<milestone xmlns:cafienne=\"org.cafienne\" id=\"ms_done\" name=\"Done\" cafienne:color=\"red\"/>"
    ));
}

#[test]
fn default_flags_are_written_only_when_present_in_source() {
    let mut document = parse_case(NAMESPACED_CASE);
    let plan = element(&document, "cm_hello");
    document
        .create_definition::<HumanTaskDefinition>(Some(plan), Some("ht_new"), Some("New"))
        .expect("create");
    document
        .create_definition::<StageDefinition>(Some(plan), Some("st_new"), Some("Phase"))
        .expect("create");
    let exported = export(&mut document);
    assert!(exported.contains("<humanTask id=\"ht_new\" name=\"New\"/>"));
    assert!(exported.contains("<stage id=\"st_new\" name=\"Phase\"/>"));
    assert!(exported.contains("<humanTask id=\"ht_review\" name=\"Review\" isBlocking=\"true\">"));
    assert!(exported.contains("<casePlanModel id=\"cm_hello\" name=\"hello\">"));

    let source = NAMESPACED_CASE.replace("isBlocking=\"true\"", "isBlocking=\"false\"");
    let mut document = parse_case(&source);
    assert!(export(&mut document).contains("isBlocking=\"false\""));
}

#[test]
fn external_mapping_survives_removal_of_a_local_namesake() {
    let mut document = hello();
    let plan = element(&document, "cm_hello");
    let namesake = document
        .create_definition::<MilestoneDefinition>(Some(plan), Some("out_remote"), None)
        .expect("create");
    document.remove_definition(namesake).expect("remove");

    let mapping = element(&document, "pm_intake");
    assert!(document.is_live(mapping));
    assert!(export(&mut document).contains("targetRef=\"out_remote\""));
}

#[test]
fn forward_references_resolve_after_parse() {
    let document = hello();
    assert!(warning_codes(&document).is_empty());
    let plan_item = element(&document, "pi_review");
    let data = document
        .get::<PlanItemDefinition>(plan_item)
        .expect("plan item");
    assert_eq!(data.definition_ref.target(), Some(element(&document, "ht_review")));

    let criterion = data.entry_criteria()[0];
    let criterion = document
        .get::<CriterionDefinition>(criterion)
        .expect("criterion");
    assert_eq!(
        criterion.sentry_ref.target(),
        Some(element(&document, "s_after_intake"))
    );
}

#[test]
fn dangling_reference_is_kept_and_warned() {
    let source = HELLO_CASE.replace("definitionRef=\"ms_done\"", "definitionRef=\"ms_missing\"");
    let mut document = parse_case(&source);
    assert!(document.is_valid());
    assert_eq!(warning_codes(&document), vec!["REFERENCE_DANGLING".to_string()]);
    let pi_done = element(&document, "pi_done");
    let data = document.get::<PlanItemDefinition>(pi_done).expect("plan item");
    assert!(data.definition_ref.target().is_none());
    assert!(export(&mut document).contains("definitionRef=\"ms_missing\""));
}

#[test]
fn invalid_document_refuses_mutations() {
    let mut document = parse_case("<case><casePlanModel></case>");
    assert!(!document.is_valid());
    let error = document
        .create_definition::<StageDefinition>(None, None, None)
        .expect_err("invalid document");
    assert_eq!(error.code, "DOCUMENT_INVALID");
    assert_eq!(
        document.export().expect_err("invalid document").code,
        "DOCUMENT_INVALID"
    );
}

#[test]
fn created_ids_stay_unique() {
    let source = HELLO_CASE.replace("id=\"ms_done\"", "id=\"milestone_0\"");
    let mut document = parse_case(&source);
    let plan = element(&document, "cm_hello");

    let first = document
        .create_definition::<MilestoneDefinition>(Some(plan), None, None)
        .expect("create");
    assert_eq!(document.node(first).id(), Some("milestone_1"));
    assert_eq!(document.node(first).name(), Some("Milestone_1"));

    document.remove_definition(first).expect("remove");
    let second = document
        .create_definition::<MilestoneDefinition>(Some(plan), None, None)
        .expect("create");
    assert_eq!(document.node(second).id(), Some("milestone_2"));

    let error = document
        .create_definition::<MilestoneDefinition>(Some(plan), Some("ht_review"), None)
        .expect_err("duplicate id");
    assert_eq!(error.code, "ID_DUPLICATE");
}

#[test]
fn create_requires_a_compatible_parent() {
    let mut document = hello();
    let plan = element(&document, "cm_hello");
    let error = document
        .create_definition::<CaseRoleDefinition>(Some(plan), None, None)
        .expect_err("roles do not live in a plan");
    assert_eq!(error.code, "ILLEGAL_MUTATION");

    let error = document
        .create_definition::<StageDefinition>(None, None, None)
        .expect_err("root exists");
    assert_eq!(error.code, "ILLEGAL_MUTATION");

    let root = document.root().expect("root");
    let role = document
        .create_definition::<CaseRoleDefinition>(Some(root), Some("role_clerk"), Some("Clerk"))
        .expect("role");
    let exported = export(&mut document);
    assert!(exported.contains("<role id=\"role_clerk\" name=\"Clerk\"/>"));
    assert_eq!(document.node(role).parent(), Some(root));
}

#[test]
fn removing_a_task_removes_its_plan_item_and_every_mention() {
    let mut document = hello();
    let task = element(&document, "ht_review");
    let plan_item = element(&document, "pi_review");
    let criterion = element(&document, "crit_review");

    let removed = document.remove_definition(task).expect("remove");
    assert!(removed.contains(&"ht_review".to_string()));
    assert!(removed.contains(&"in_customer".to_string()));
    assert!(removed.contains(&"pi_review".to_string()));
    assert!(removed.contains(&"crit_review".to_string()));

    for gone in [task, plan_item, criterion] {
        assert!(!document.is_live(gone));
    }
    assert!(document.get_element("ht_review").is_none());
    let plan = element(&document, "cm_hello");
    let stage = document.get::<StageDefinition>(plan).expect("plan");
    assert!(!stage.plan_items.contains(&plan_item));
    assert!(!stage.definitions.contains(&task));
    assert!(!document.node(plan).children().contains(&task));

    let exported = export(&mut document);
    assert!(!exported.contains("ht_review"));
    assert!(!exported.contains("pi_review"));
}

#[test]
fn removing_a_sentry_drops_the_criteria_using_it() {
    let mut document = hello();
    let sentry = element(&document, "s_after_intake");
    let plan_item = element(&document, "pi_review");

    document.remove_definition(sentry).expect("remove");
    assert!(document.get_element("crit_review").is_none());
    assert!(document.get_element("op_intake").is_none());
    let data = document.get::<PlanItemDefinition>(plan_item).expect("plan item");
    assert!(data.entry_criteria().is_empty());
    assert!(!export(&mut document).contains("s_after_intake"));
}

#[test]
fn removing_a_role_clears_the_performer() {
    let mut document = hello();
    let role = element(&document, "role_manager");
    document.remove_definition(role).expect("remove");

    let task = element(&document, "ht_review");
    let data = document.get::<HumanTaskDefinition>(task).expect("task");
    assert!(data.performer_ref.is_empty());
    let exported = export(&mut document);
    assert!(!exported.contains("performerRef"));
    assert!(!exported.contains("caseRoles"));
}

#[test]
fn removing_the_plan_removes_everything_below_it() {
    let mut document = hello();
    let plan = element(&document, "cm_hello");
    let below = document.descendants(plan);
    assert!(below.len() > 10);

    document.remove_definition(plan).expect("remove");
    assert!(below.iter().all(|node| !document.is_live(*node)));
    let root = document.root().expect("root");
    let live = document.descendants(root);
    assert!(live.iter().all(|node| !below.contains(node)));
    assert_eq!(live.len(), document.elements().len());
}

#[test]
fn removing_the_root_empties_the_document() {
    let mut document = hello();
    let root = document.root().expect("root");
    document.remove_definition(root).expect("remove");
    assert!(document.elements().is_empty());
    assert_eq!(
        document.export().expect_err("empty").code,
        "DOCUMENT_EMPTY"
    );
}

#[test]
#[should_panic(expected = "was removed")]
fn touching_a_removed_node_panics() {
    let mut document = hello();
    let milestone = element(&document, "ms_done");
    document.remove_definition(milestone).expect("remove");
    let _ = document.node(milestone);
}

#[test]
fn move_keeps_identity_and_references() {
    let mut document = hello();
    let plan = element(&document, "cm_hello");
    let stage = document
        .create_definition::<StageDefinition>(Some(plan), Some("stage_review"), None)
        .expect("stage");
    let task = element(&document, "ht_review");

    document.move_definition(task, stage).expect("move");
    assert_eq!(document.node(task).parent(), Some(stage));
    assert!(document
        .get::<StageDefinition>(stage)
        .expect("stage")
        .definitions
        .contains(&task));
    assert!(!document
        .get::<StageDefinition>(plan)
        .expect("plan")
        .definitions
        .contains(&task));

    let plan_item = element(&document, "pi_review");
    let data = document.get::<PlanItemDefinition>(plan_item).expect("plan item");
    assert_eq!(data.definition_ref.target(), Some(task));
    assert!(export(&mut document).contains("definitionRef=\"ht_review\""));
}

#[test]
fn illegal_moves_are_rejected() {
    let mut document = hello();
    let root = document.root().expect("root");
    let plan = element(&document, "cm_hello");
    let stage = document
        .create_definition::<StageDefinition>(Some(plan), None, None)
        .expect("stage");
    let role = element(&document, "role_manager");

    let error = document.move_definition(root, plan).expect_err("root");
    assert_eq!(error.code, "ILLEGAL_MUTATION");
    let error = document.move_definition(plan, stage).expect_err("own subtree");
    assert_eq!(error.code, "ILLEGAL_MUTATION");
    let error = document.move_definition(role, plan).expect_err("incompatible");
    assert_eq!(error.code, "ILLEGAL_MUTATION");
    assert_eq!(document.node(role).parent(), Some(root));
}

#[test]
fn legacy_criteria_and_on_parts_are_migrated() {
    let source = r#"<case id="legacy.case" name="legacy">
        <casePlanModel id="cm_legacy" name="legacy">
            <planItem id="pi_a" definitionRef="ht_a" exitCriteriaRefs="s_stop"/>
            <planItem id="pi_b" definitionRef="ht_b" entryCriteriaRefs="s_start"/>
            <sentry id="s_start">
                <planItemOnPart id="op_a" sourceRef="pi_a" sentryRef="s_stop">
                    <standardEvent>exit</standardEvent>
                </planItemOnPart>
            </sentry>
            <sentry id="s_stop"/>
            <humanTask id="ht_a" name="A"/>
            <humanTask id="ht_b" name="B"/>
        </casePlanModel>
    </case>"#;
    let mut document = parse_case(source);
    assert!(document.is_migrated());
    assert!(warning_codes(&document).is_empty());

    let pi_a = element(&document, "pi_a");
    let exit = document.get::<PlanItemDefinition>(pi_a).expect("pi_a").exit_criteria()[0];
    let pi_b = element(&document, "pi_b");
    assert_eq!(
        document.get::<PlanItemDefinition>(pi_b).expect("pi_b").entry_criteria().len(),
        1
    );

    let on_part = element(&document, "op_a");
    let data = document
        .get::<PlanItemOnPartDefinition>(on_part)
        .expect("on part");
    assert_eq!(data.exit_criterion_ref.target(), Some(exit));
    assert!(data.legacy_sentry_ref().is_empty());

    let exported = export(&mut document);
    assert!(!exported.contains("CriteriaRefs"));
    assert!(exported.contains("<exitCriterion id=\"exitcriterion_0\" sentryRef=\"s_stop\"/>"));
    assert!(exported.contains("<entryCriterion id=\"entrycriterion_0\" sentryRef=\"s_start\"/>"));
    assert!(exported.contains("exitCriterionRef=\"exitcriterion_0\""));

    let reparsed = parse_case(&exported);
    assert!(!reparsed.is_migrated());
}

#[test]
fn change_id_updates_referrers_on_export() {
    let mut document = hello();
    let task = element(&document, "ht_review");
    document.change_id(task, "ht_approve").expect("change id");
    let exported = export(&mut document);
    assert!(exported.contains("definitionRef=\"ht_approve\""));
    assert!(!exported.contains("ht_review"));

    let error = document
        .change_id(task, "pi_done")
        .expect_err("duplicate id");
    assert_eq!(error.code, "ID_DUPLICATE");
}

#[test]
fn link_sets_a_named_reference() {
    let mut document = hello();
    let plan_item = element(&document, "pi_done");
    let task = element(&document, "pt_intake");
    document
        .link(plan_item, "definitionRef", task)
        .expect("link");
    let exported = export(&mut document);
    assert!(exported.contains("<planItem id=\"pi_done\" name=\"Done\" definitionRef=\"pt_intake\"/>"));

    let error = document
        .link(plan_item, "performerRef", task)
        .expect_err("unknown field");
    assert_eq!(error.code, "FIELD_UNKNOWN");
}

#[test]
fn blank_name_differs_from_unset_name() {
    let mut document = hello();
    let milestone = element(&document, "ms_done");
    document.set_name(milestone, Some("")).expect("blank");
    assert!(export(&mut document).contains("<milestone id=\"ms_done\" name=\"\"/>"));
    document.set_name(milestone, None).expect("unset");
    document
        .set_description(milestone, Some("final"))
        .expect("description");
    assert!(export(&mut document).contains("<milestone id=\"ms_done\" description=\"final\"/>"));
}

#[test]
fn invalid_typed_attributes_fall_back_with_warnings() {
    let source = HELLO_CASE.replace("autoComplete=\"true\"", "autoComplete=\"maybe\"");
    let document = parse_case(&source);
    assert_eq!(warning_codes(&document), vec!["ATTR_BOOL_INVALID".to_string()]);
    let plan = element(&document, "cm_hello");
    assert!(!document.get::<StageDefinition>(plan).expect("plan").auto_complete);

    let dimensions = DefinitionDocument::parse_as(
        DocumentKind::Dimensions,
        "hello.dimensions",
        r#"<CMMNDI><CMMNDiagram>
            <CMMNShape cmmnElementRef="cm_hello"><Bounds x="ten" y="20" width="1" height="1"/></CMMNShape>
            <CMMNShape><Bounds x="1" y="1" width="1" height="1"/></CMMNShape>
            <CMMNShape cmmnElementRef="pi_review"/>
        </CMMNDiagram></CMMNDI>"#,
    );
    assert!(dimensions.is_valid());
    assert_eq!(
        warning_codes(&dimensions),
        vec![
            "ATTR_NUMBER_INVALID".to_string(),
            "SHAPE_REFERENCE_MISSING".to_string(),
            "SHAPE_BOUNDS_MISSING".to_string(),
        ]
    );
    let shape = dimensions.elements_of::<ShapeDefinition>()[0];
    let bounds = dimensions
        .get::<ShapeDefinition>(shape)
        .and_then(|shape| shape.bounds)
        .expect("bounds");
    assert_eq!(bounds.x, 0.0);
    assert_eq!(bounds.y, 20.0);
}

#[test]
fn human_task_implementation_reference_can_be_rewritten() {
    let mut document = hello();
    let task = element(&document, "ht_review");
    let data = document.get_mut::<HumanTaskDefinition>(task).expect("task");
    assert_eq!(data.human_task_ref(), Some("approve.humantask"));
    data.set_human_task_ref("review.humantask");
    assert!(export(&mut document).contains("humanTaskRef=\"review.humantask\""));

    let mut fresh = HumanTaskDefinition::default();
    assert!(fresh.human_task_ref().is_none());
    fresh.set_human_task_ref("x.humantask");
    assert_eq!(fresh.human_task_ref(), Some("x.humantask"));
}

#[test]
fn case_model_removes_drawings_of_removed_elements() {
    let mut model =
        CaseModel::parse("hello.case", HELLO_CASE, Some(HELLO_DIMENSIONS)).expect("model");
    let dimensions = model.dimensions.as_ref().expect("dimensions");
    assert_eq!(dimensions.file_name(), "hello.dimensions");
    assert!(warning_codes(dimensions).is_empty());

    let task = element(&model.definition, "ht_review");
    model.remove_definition(task).expect("remove");
    let (case, dimensions) = model.export().expect("export");
    assert!(!case.contains("pi_review"));
    let dimensions = dimensions.expect("dimensions");
    assert!(!dimensions.contains("pi_review"));
    assert!(!dimensions.contains("crit_review"));
    assert!(dimensions.contains("cmmnElementRef=\"pi_intake\""));
}

#[test]
fn case_model_warns_about_shapes_for_unknown_elements() {
    let drawing = HELLO_DIMENSIONS.replace("cmmnElementRef=\"pi_intake\"", "cmmnElementRef=\"pi_gone\"");
    let model = CaseModel::parse("hello.case", HELLO_CASE, Some(&drawing)).expect("model");
    let dimensions = model.dimensions.as_ref().expect("dimensions");
    assert_eq!(
        warning_codes(dimensions),
        vec!["SHAPE_REFERENCE_DANGLING".to_string()]
    );

    let error = CaseModel::parse("hello.process", HELLO_CASE, None).expect_err("not a case");
    assert_eq!(error.code, "SOURCE_KIND_UNSUPPORTED");
}

use std::collections::BTreeMap;
use std::fs;

use cm_model::DefinitionDocument;
use cm_parser::parse_xml_document;

use crate::test_support::{fixture_service, temp_dir};
use crate::{DefinitionAssembler, FileStore, RepositoryError, RepositoryOptions, RepositoryService};

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn cyclic_case_references_terminate_with_one_copy_each() {
    let service = fixture_service("cycle");
    let assembled = DefinitionAssembler::new(service.store()).assemble("hello.case");
    assert!(assembled.is_complete(), "{:?}", assembled.errors);
    assert_eq!(assembled.root_id, "hello.case");
    assert_eq!(count(&assembled.document, "<case id=\"hello.case\""), 1);
    assert_eq!(count(&assembled.document, " id=\"sub.case\" name=\"sub\""), 1);
}

#[test]
fn shared_process_is_included_once() {
    let service = fixture_service("dedup");
    let assembled = DefinitionAssembler::new(service.store()).assemble("hello.case");
    assert_eq!(count(&assembled.document, "<process id=\"callback.process\""), 1);
    assert_eq!(count(&assembled.document, "<process id=\"callback\""), 1);
    assert_eq!(
        count(&assembled.document, "<caseFileItemDefinition id=\"customer.cfid\""),
        1
    );
}

#[test]
fn merged_document_parses_and_carries_both_diagrams() {
    let service = fixture_service("merge");
    let assembled = DefinitionAssembler::new(service.store()).assemble("hello.case");
    let parsed = parse_xml_document(&assembled.document).expect("assembled xml should parse");
    assert_eq!(parsed.root.name, "definitions");

    let diagram = parsed
        .root
        .child("CMMNDI")
        .and_then(|dimensions| dimensions.child("CMMNDiagram"))
        .expect("merged diagram");
    let shapes: Vec<_> = diagram
        .children_named("CMMNShape")
        .filter_map(|shape| shape.attribute("cmmnElementRef"))
        .collect();
    assert!(shapes.contains(&"cm_hello"));
    assert!(shapes.contains(&"cm_sub"));
    assert_eq!(diagram.children_named("CMMNEdge").count(), 1);
    assert!(assembled.document.contains("WorkflowTaskDefinition"));
}

#[test]
fn missing_references_are_all_reported() {
    let mut files = BTreeMap::new();
    files.insert(
        "main.case".to_string(),
        r#"<case id="main.case" name="main">
            <caseFileModel>
                <caseFileItem id="cfi" name="order" definitionRef="order.cfid"/>
            </caseFileModel>
            <casePlanModel id="cm" name="main">
                <processTask id="p1" name="one" processRef="first.process"/>
                <processTask id="p2" name="two" processRef="second.process"/>
                <caseTask id="c1" name="sub" caseRef="sub.case"/>
            </casePlanModel>
        </case>"#
            .to_string(),
    );
    let assembled = DefinitionAssembler::new(&files).assemble("main.case");
    assert_eq!(
        assembled.errors,
        vec![
            "Cannot find process \"first.process\" referenced from \"main.case\".".to_string(),
            "Cannot find process \"second.process\" referenced from \"main.case\".".to_string(),
            "Cannot find case file item definition \"order.cfid\" referenced from \"main.case\"."
                .to_string(),
            "Cannot find case \"sub.case\" referenced from \"main.case\".".to_string(),
        ]
    );
    assert!(assembled.document.contains("<case id=\"main.case\""));
}

#[test]
fn usage_lists_referencing_files() {
    let service = fixture_service("usage");
    assert_eq!(
        service.usage("callback.process").expect("usage"),
        vec!["hello.case", "sub.case"]
    );
    assert_eq!(service.usage("sub.case").expect("usage"), vec!["hello.case"]);
    assert_eq!(service.usage("hello").expect("usage"), vec!["sub.case"]);
    assert!(service.usage("nothing.process").expect("usage").is_empty());
}

#[test]
fn deploy_writes_the_merged_document() {
    let service = fixture_service("deploy");
    let target = service.deploy("hello.case").expect("deploy");
    assert!(target.ends_with("hello.xml"));
    let written = std::fs::read_to_string(&target).expect("deployed file");
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<definitions"));
}

#[test]
fn deploy_refuses_incomplete_models() {
    let root = temp_dir("deploy-missing");
    let service = RepositoryService::new(RepositoryOptions {
        repository_dir: root.join("repository"),
        deploy_dir: root.join("deploy"),
    });
    service
        .save(
            "lonely.case",
            r#"<case id="lonely.case" name="lonely"><casePlanModel id="cm" name="lonely">
                <processTask id="p" name="p" processRef="gone.process"/>
            </casePlanModel></case>"#,
        )
        .expect("save");

    let error = service.deploy("lonely.case").expect_err("missing process");
    match &error {
        RepositoryError::Deploy { errors, .. } => assert_eq!(errors.len(), 1),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(error.code(), "DEPLOY_FAILED");
    assert!(!root.join("deploy").join("lonely.xml").exists());
}

#[test]
fn save_returns_the_refreshed_listing() {
    let service = fixture_service("save");
    let before = service.list().expect("list").len();
    let listed = service
        .save("extra.process", "<process id=\"extra.process\" name=\"extra\"/>")
        .expect("save");
    assert_eq!(listed.len(), before + 1);
    assert!(listed.iter().any(|entry| entry.file_name == "extra.process"));
    assert_eq!(
        service.load("extra.process").expect("load"),
        "<process id=\"extra.process\" name=\"extra\"/>"
    );
}

#[test]
fn format_migrates_legacy_files_once() {
    let service = fixture_service("format");
    let report = service.format("legacy.case").expect("format");
    assert!(report.migrated);
    assert!(report.changed);
    let saved = service.load("legacy.case").expect("load");
    assert!(!saved.contains("exitCriteriaRefs"));

    let again = service.format("legacy.case").expect("format again");
    assert!(!again.migrated);
    assert!(!again.changed);
}

#[test]
fn validate_reports_document_diagnostics() {
    let service = fixture_service("validate");
    let document = service.validate("hello.case").expect("validate");
    assert!(document.is_valid());
    assert_eq!(document.warnings().count(), 0);

    service.save("broken.case", "<case>").expect("save");
    let document = service.validate("broken.case").expect("validate");
    assert!(!document.is_valid());

    let error = service.format("broken.case").expect_err("invalid");
    assert_eq!(error.code(), "DOCUMENT_INVALID");
}

#[test]
fn file_store_is_an_artifact_source() {
    let store = FileStore::new(cm_test_example::repository_root());
    let assembled = DefinitionAssembler::new(&store).assemble("sub.case");
    assert!(assembled.is_complete(), "{:?}", assembled.errors);
    assert_eq!(assembled.root_id, "sub.case");
}

#[test]
fn every_fixture_exports_to_a_fixed_point() {
    let fixtures = [
        "approve.humantask",
        "callback.process",
        "customer.cfid",
        "hello.case",
        "hello.dimensions",
        "legacy.case",
        "sub.case",
        "sub.dimensions",
    ];
    for file_name in fixtures {
        let source = fs::read_to_string(cm_test_example::fixture_path(file_name))
            .expect("fixture should read");
        let mut document = DefinitionDocument::parse(file_name, &source).expect("known kind");
        assert!(document.is_valid(), "{}", file_name);
        assert_eq!(document.is_migrated(), file_name == "legacy.case", "{}", file_name);
        let first = document.export().expect("export");

        let mut reparsed = DefinitionDocument::parse(file_name, &first).expect("known kind");
        assert!(reparsed.is_valid(), "{}", file_name);
        assert!(!reparsed.is_migrated(), "{}", file_name);
        assert_eq!(reparsed.export().expect("export"), first, "{}", file_name);
    }
}

#[test]
fn root_namespaces_and_unknown_attributes_survive_format() {
    let service = fixture_service("format-namespaces");
    let report = service.format("sub.case").expect("format");
    assert!(!report.migrated);
    let saved = service.load("sub.case").expect("load");
    assert!(saved.contains(
        "<case xmlns=\"http://www.omg.org/spec/CMMN/20151109/MODEL\" xmlns:cafienne=\"org.cafienne\" id=\"sub.case\" name=\"sub\" expressionLanguage=\"spel\">"
    ));
}

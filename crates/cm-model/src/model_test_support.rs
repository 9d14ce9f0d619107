use crate::{DefinitionDocument, DocumentKind, NodeRef};

pub(crate) const HELLO_CASE: &str = r#"<case id="hello.case" name="hello">
    <caseFileModel>
        <caseFileItem id="cfi_customer" name="Customer" definitionRef="customer.cfid"/>
    </caseFileModel>
    <casePlanModel id="cm_hello" name="hello" autoComplete="true">
        <planItem id="pi_review" name="Review" definitionRef="ht_review">
            <entryCriterion id="crit_review" sentryRef="s_after_intake"/>
        </planItem>
        <planItem id="pi_intake" name="Intake" definitionRef="pt_intake"/>
        <planItem id="pi_done" name="Done" definitionRef="ms_done"/>
        <sentry id="s_after_intake">
            <planItemOnPart id="op_intake" sourceRef="pi_intake">
                <standardEvent>complete</standardEvent>
            </planItemOnPart>
        </sentry>
        <humanTask id="ht_review" name="Review" performerRef="role_manager">
            <inputs id="in_customer" name="customer" bindingRef="cfi_customer"/>
            <extensionElements>
                <cafienne:implementation xmlns:cafienne="org.cafienne" humanTaskRef="approve.humantask"/>
            </extensionElements>
        </humanTask>
        <processTask id="pt_intake" name="Intake" processRef="callback.process">
            <parameterMapping id="pm_intake" sourceRef="in_payload" targetRef="out_remote"/>
        </processTask>
        <milestone id="ms_done" name="Done"/>
    </casePlanModel>
    <caseRoles>
        <role id="role_manager" name="Manager"/>
    </caseRoles>
</case>
"#;

pub(crate) const NAMESPACED_CASE: &str = r#"<case xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL" xmlns:cafienne="org.cafienne" id="hello.case" name="hello" expressionLanguage="spel" guid="_3kq">
    <casePlanModel id="cm_hello" name="hello">
        <planItem id="pi_review" name="Review" definitionRef="ht_review"/>
        <humanTask id="ht_review" name="Review" isBlocking="true">
            <extensionElements>
                <cafienne:implementation humanTaskRef="approve.humantask"/>
            </extensionElements>
        </humanTask>
    </casePlanModel>
</case>
"#;

pub(crate) const HELLO_DIMENSIONS: &str = r#"<CMMNDI>
    <CMMNDiagram>
        <CMMNShape cmmnElementRef="cm_hello">
            <Bounds x="20" y="20" width="800" height="500"/>
        </CMMNShape>
        <CMMNShape cmmnElementRef="pi_review">
            <Bounds x="100" y="80" width="140" height="80"/>
        </CMMNShape>
        <CMMNShape cmmnElementRef="pi_intake">
            <Bounds x="300" y="80" width="140" height="80"/>
        </CMMNShape>
        <CMMNEdge sourceCMMNElementRef="pi_intake" targetCMMNElementRef="crit_review">
            <waypoint x="300" y="120"/>
            <waypoint x="240" y="120"/>
        </CMMNEdge>
    </CMMNDiagram>
</CMMNDI>
"#;

pub(crate) fn parse_case(source: &str) -> DefinitionDocument {
    DefinitionDocument::parse_as(DocumentKind::Case, "hello.case", source)
}

pub(crate) fn hello() -> DefinitionDocument {
    parse_case(HELLO_CASE)
}

pub(crate) fn element(document: &DefinitionDocument, id: &str) -> NodeRef {
    document
        .get_element(id)
        .unwrap_or_else(|| panic!("element {} should exist", id))
}

pub(crate) fn warning_codes(document: &DefinitionDocument) -> Vec<String> {
    document
        .warnings()
        .map(|warning| warning.code.clone())
        .collect()
}

pub(crate) fn export(document: &mut DefinitionDocument) -> String {
    document.export().expect("document should export")
}

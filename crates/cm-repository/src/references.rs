use cm_model::definitions::{
    CaseFileItemDefinition, CaseTaskDefinition, HumanTaskDefinition, ProcessTaskDefinition,
};
use cm_model::{DefinitionDocument, DocumentKind};

/// A case's pointer at another repository artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArtifactReference {
    pub kind: DocumentKind,
    /// The reference as the case wrote it, e.g. `flow` in `processRef="flow"`.
    pub id: String,
    /// Referenced file name, with the extension of `kind` appended when it was left out.
    pub file_name: String,
}

/// Every artifact a case points at, in document order per kind. Two spellings of the same
/// file are listed separately.
pub(crate) fn collect_references(document: &DefinitionDocument) -> Vec<ArtifactReference> {
    let mut references = Vec::new();
    let mut push = |kind: DocumentKind, raw: Option<&str>| {
        if let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            let reference = ArtifactReference {
                kind,
                id: raw.to_string(),
                file_name: with_extension(raw, kind),
            };
            if !references.contains(&reference) {
                references.push(reference);
            }
        }
    };

    for node in document.elements_of::<ProcessTaskDefinition>() {
        let data = document.get::<ProcessTaskDefinition>(node);
        push(DocumentKind::Process, data.and_then(|task| task.process_ref.as_deref()));
    }
    for node in document.elements_of::<HumanTaskDefinition>() {
        let data = document.get::<HumanTaskDefinition>(node);
        push(DocumentKind::HumanTask, data.and_then(HumanTaskDefinition::human_task_ref));
    }
    for node in document.elements_of::<CaseFileItemDefinition>() {
        let data = document.get::<CaseFileItemDefinition>(node);
        push(
            DocumentKind::CaseFileItemType,
            data.and_then(|item| item.definition_ref.as_deref()),
        );
    }
    for node in document.elements_of::<CaseTaskDefinition>() {
        let data = document.get::<CaseTaskDefinition>(node);
        push(DocumentKind::Case, data.and_then(|task| task.case_ref.as_deref()));
    }
    references
}

pub(crate) fn with_extension(reference: &str, kind: DocumentKind) -> String {
    let suffix = format!(".{}", kind.extension());
    if reference.ends_with(&suffix) {
        reference.to_string()
    } else {
        format!("{}{}", reference, suffix)
    }
}

pub(crate) fn kind_label(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Case => "case",
        DocumentKind::Dimensions => "dimensions",
        DocumentKind::Process => "process",
        DocumentKind::HumanTask => "human task",
        DocumentKind::CaseFileItemType => "case file item definition",
    }
}

#[cfg(test)]
mod references_tests {
    use super::*;

    #[test]
    fn with_extension_appends_only_when_missing() {
        assert_eq!(with_extension("flow", DocumentKind::Process), "flow.process");
        assert_eq!(with_extension("flow.process", DocumentKind::Process), "flow.process");
        assert_eq!(with_extension("sub.case", DocumentKind::Case), "sub.case");
    }

    #[test]
    fn collect_references_covers_four_kinds_once_per_spelling() {
        let document = DefinitionDocument::parse_as(
            DocumentKind::Case,
            "main.case",
            r#"<case id="main.case" name="main">
                <caseFileModel>
                    <caseFileItem id="cfi" name="order" definitionRef="order"/>
                </caseFileModel>
                <casePlanModel id="cm" name="main">
                    <humanTask id="ht" name="approve">
                        <extensionElements>
                            <cafienne:implementation xmlns:cafienne="org.cafienne" humanTaskRef="approve.humantask"/>
                        </extensionElements>
                    </humanTask>
                    <processTask id="pt1" name="a" processRef="flow.process"/>
                    <processTask id="pt2" name="b" processRef="flow"/>
                    <processTask id="pt3" name="c"/>
                    <processTask id="pt4" name="d" processRef="flow"/>
                    <caseTask id="ct" name="sub" caseRef="sub.case"/>
                </casePlanModel>
            </case>"#,
        );
        let references = collect_references(&document);
        let names: Vec<_> = references
            .iter()
            .map(|reference| (reference.id.as_str(), reference.file_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("flow.process", "flow.process"),
                ("flow", "flow.process"),
                ("approve.humantask", "approve.humantask"),
                ("order", "order.cfid"),
                ("sub.case", "sub.case"),
            ]
        );
        assert_eq!(references[4].kind, DocumentKind::Case);
    }
}

use cm_model::definitions::{DiagramDefinition, DimensionsDefinition, HumanTaskModelDefinition};
use cm_model::{CaseModel, DefinitionDocument, DocumentKind};
use cm_parser::{write_xml_document, XmlElementNode};

use crate::references::{collect_references, kind_label, with_extension, ArtifactReference};
use crate::{ArtifactSource, RepositoryError};

const CMMN_NAMESPACE: &str = "http://www.omg.org/spec/CMMN/20151109/MODEL";
const CAFIENNE_NAMESPACE: &str = "org.cafienne";

/// Result of one assembly run. `errors` lists every artifact that could not be included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDefinitions {
    pub root_id: String,
    pub document: String,
    pub errors: Vec<String>,
}

impl AssembledDefinitions {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Insertion ordered artifacts keyed by the name they are referenced by.
#[derive(Debug, Default)]
struct ArtifactCache {
    entries: Vec<(String, XmlElementNode)>,
}

impl ArtifactCache {
    fn contains(&self, file_name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == file_name)
    }

    fn get(&self, file_name: &str) -> Option<&XmlElementNode> {
        self.entries
            .iter()
            .find(|(key, _)| key == file_name)
            .map(|(_, element)| element)
    }

    fn insert(&mut self, file_name: &str, element: XmlElementNode) {
        self.entries.push((file_name.to_string(), element));
    }

    fn placeholder(&mut self, file_name: &str) {
        self.insert(file_name, XmlElementNode::new("case"));
    }

    fn replace(&mut self, file_name: &str, element: XmlElementNode) {
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| key == file_name) {
            entry.1 = element;
        }
    }
}

/// Loads a root case and everything it points at, transitively, and merges it into one
/// deployable `<definitions>` document.
///
/// A case is cached before its own references are followed, so reference cycles between
/// cases end at the first repeated file.
pub struct DefinitionAssembler<'a> {
    source: &'a dyn ArtifactSource,
    cases: ArtifactCache,
    processes: ArtifactCache,
    human_tasks: ArtifactCache,
    case_file_types: ArtifactCache,
    /// Case files that failed to load; kept so they are reported once.
    failed: Vec<String>,
    errors: Vec<String>,
}

impl<'a> DefinitionAssembler<'a> {
    pub fn new(source: &'a dyn ArtifactSource) -> Self {
        Self {
            source,
            cases: ArtifactCache::default(),
            processes: ArtifactCache::default(),
            human_tasks: ArtifactCache::default(),
            case_file_types: ArtifactCache::default(),
            failed: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn assemble(mut self, root_file: &str) -> AssembledDefinitions {
        log::info!("event=assemble status=start root={}", root_file);
        let root_id = self
            .load_case(root_file, None)
            .unwrap_or_else(|| root_file.to_string());
        let document = write_xml_document(&self.compose());

        if self.errors.is_empty() {
            log::info!(
                "event=assemble status=ok root={} cases={} processes={} human_tasks={} case_file_types={}",
                root_file,
                self.cases.entries.len(),
                self.processes.entries.len(),
                self.human_tasks.entries.len(),
                self.case_file_types.entries.len()
            );
        } else {
            log::warn!(
                "event=assemble status=incomplete root={} errors={}",
                root_file,
                self.errors.len()
            );
        }

        AssembledDefinitions {
            root_id,
            document,
            errors: self.errors,
        }
    }

    /// Returns the declared id of the case, or `None` when it could not be loaded.
    fn load_case(&mut self, file_name: &str, referrer: Option<&str>) -> Option<String> {
        if let Some(existing) = self.cases.get(file_name) {
            return existing.attribute("id").map(str::to_string);
        }
        if self.failed.iter().any(|failed| failed == file_name) {
            return None;
        }

        // Registered before anything is read, so a cycle back to this file stops here.
        self.cases.placeholder(file_name);
        let loaded = self
            .load_document(DocumentKind::Case, file_name, referrer)
            .and_then(|document| document.root().map(|root| (document, root)));
        let Some((mut document, root)) = loaded else {
            self.cases.entries.retain(|(key, _)| key != file_name);
            self.failed.push(file_name.to_string());
            return None;
        };
        let id = document
            .node(root)
            .id()
            .unwrap_or(file_name)
            .to_string();
        document.flatten();
        let mut element = document.export_element(root);
        element.set_attribute("id", id.as_str());
        self.cases.replace(file_name, element);

        for reference in collect_references(&document) {
            self.load_reference(&reference, file_name);
        }
        Some(id)
    }

    /// Processes and case file item definitions are keyed by the reference as written, and
    /// carry it as their id, so the referring attribute resolves inside the merged document.
    fn load_reference(&mut self, reference: &ArtifactReference, referrer: &str) {
        let file_name = reference.file_name.as_str();
        let id = reference.id.as_str();
        let cached = match reference.kind {
            DocumentKind::Case => {
                self.load_case(file_name, Some(referrer));
                return;
            }
            DocumentKind::Process => self.processes.contains(id),
            DocumentKind::HumanTask => self.human_tasks.contains(file_name),
            DocumentKind::CaseFileItemType => self.case_file_types.contains(id),
            DocumentKind::Dimensions => return,
        };
        if cached || self.failed.iter().any(|failed| failed == file_name) {
            return;
        }

        let Some(mut document) = self.load_document(reference.kind, file_name, Some(referrer))
        else {
            self.failed.push(file_name.to_string());
            return;
        };
        let Some(root) = document.root() else {
            return;
        };

        if reference.kind == DocumentKind::HumanTask {
            let implementation = document
                .get::<HumanTaskModelDefinition>(root)
                .and_then(|model| model.implementation.clone());
            match implementation {
                Some(implementation) => self.human_tasks.insert(file_name, implementation),
                None => {
                    self.failed.push(file_name.to_string());
                    self.errors.push(format!(
                        "Human task \"{}\" referenced from \"{}\" has no implementation.",
                        file_name, referrer
                    ));
                }
            }
            return;
        }

        document.flatten();
        let mut element = document.export_element(root);
        element.set_attribute("id", id);
        match reference.kind {
            DocumentKind::Process => self.processes.insert(id, element),
            _ => self.case_file_types.insert(id, element),
        }
    }

    fn load_document(
        &mut self,
        kind: DocumentKind,
        file_name: &str,
        referrer: Option<&str>,
    ) -> Option<DefinitionDocument> {
        let source = match self.source.read_artifact(file_name) {
            Ok(source) => source,
            Err(RepositoryError::NotFound { .. }) => {
                self.errors.push(match referrer {
                    Some(referrer) => format!(
                        "Cannot find {} \"{}\" referenced from \"{}\".",
                        kind_label(kind),
                        file_name,
                        referrer
                    ),
                    None => format!("Cannot find {} \"{}\".", kind_label(kind), file_name),
                });
                return None;
            }
            Err(error) => {
                self.errors.push(format!("Cannot read \"{}\": {}", file_name, error));
                return None;
            }
        };

        let document = DefinitionDocument::parse_as(kind, file_name, &source);
        if !document.is_valid() {
            for error in document.errors() {
                self.errors
                    .push(format!("Cannot parse \"{}\": {}", file_name, error));
            }
            return None;
        }
        log::debug!(
            "event=assemble_load status=ok kind={} file={}",
            kind.extension(),
            file_name
        );
        Some(document)
    }

    fn compose(&self) -> XmlElementNode {
        let mut definitions = XmlElementNode::new("definitions");
        definitions.set_attribute("xmlns", CMMN_NAMESPACE);
        definitions.set_attribute("xmlns:cafienne", CAFIENNE_NAMESPACE);

        for (_, element) in &self.case_file_types.entries {
            definitions.push_element(element.clone());
        }
        for (_, element) in &self.cases.entries {
            let mut case = element.clone();
            self.inline_human_tasks(&mut case);
            definitions.push_element(case);
        }
        for (_, element) in &self.processes.entries {
            definitions.push_element(element.clone());
        }

        let mut diagram = XmlElementNode::new("CMMNDiagram");
        for (file_name, _) in &self.cases.entries {
            self.merge_dimensions(file_name, &mut diagram);
        }
        let mut dimensions = XmlElementNode::new("CMMNDI");
        dimensions.push_element(diagram);
        definitions.push_element(dimensions);
        definitions
    }

    /// Replaces every `humanTaskRef` implementation element with the referenced one.
    fn inline_human_tasks(&self, element: &mut XmlElementNode) {
        if element.local_name() == "implementation" {
            let inlined = element
                .attribute("humanTaskRef")
                .and_then(|reference| {
                    let file_name = with_extension(reference, DocumentKind::HumanTask);
                    self.human_tasks
                        .get(&file_name)
                        .map(|implementation| (file_name, implementation))
                });
            if let Some((file_name, implementation)) = inlined {
                let mut replacement = implementation.clone();
                replacement.set_attribute("humanTaskRef", file_name);
                *element = replacement;
                return;
            }
        }
        for child in element.element_children_mut() {
            self.inline_human_tasks(child);
        }
    }

    fn merge_dimensions(&self, case_file: &str, diagram: &mut XmlElementNode) {
        let file_name = CaseModel::dimensions_file_name(case_file);
        let source = match self.source.read_artifact(&file_name) {
            Ok(source) => source,
            Err(error) => {
                log::warn!(
                    "event=assemble_dimensions status=missing file={} reason={}",
                    file_name,
                    error
                );
                return;
            }
        };
        let document = DefinitionDocument::parse_as(DocumentKind::Dimensions, &file_name, &source);
        let Some(root) = document.root().filter(|_| document.is_valid()) else {
            log::warn!(
                "event=assemble_dimensions status=invalid file={}",
                file_name
            );
            return;
        };

        let diagrams = document
            .get::<DimensionsDefinition>(root)
            .map(|dimensions| dimensions.diagrams.clone())
            .unwrap_or_default();
        for node in diagrams {
            let Some(data) = document.get::<DiagramDefinition>(node) else {
                continue;
            };
            for drawing in data.shapes.iter().chain(data.edges.iter()) {
                diagram.push_element(document.export_element(*drawing));
            }
        }
    }
}

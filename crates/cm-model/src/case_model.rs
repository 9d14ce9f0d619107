use std::collections::{BTreeSet, HashSet};

use cm_core::{CaseModelError, Diagnostic};

use crate::definitions::{EdgeDefinition, ShapeDefinition};
use crate::document::{DefinitionDocument, DocumentKind};
use crate::node::NodeRef;

/// A `.case` document together with its `.dimensions` companion.
#[derive(Debug)]
pub struct CaseModel {
    pub definition: DefinitionDocument,
    pub dimensions: Option<DefinitionDocument>,
}

impl CaseModel {
    pub fn parse(
        case_file: &str,
        case_source: &str,
        dimensions_source: Option<&str>,
    ) -> Result<Self, CaseModelError> {
        if DocumentKind::from_file_name(case_file) != Some(DocumentKind::Case) {
            return Err(CaseModelError::new(
                "SOURCE_KIND_UNSUPPORTED",
                format!("\"{}\" is not a .case file.", case_file),
            ));
        }
        let definition = DefinitionDocument::parse_as(DocumentKind::Case, case_file, case_source);
        let dimensions = dimensions_source.map(|source| {
            DefinitionDocument::parse_as(
                DocumentKind::Dimensions,
                &Self::dimensions_file_name(case_file),
                source,
            )
        });

        let mut model = Self {
            definition,
            dimensions,
        };
        model.validate_shapes();
        Ok(model)
    }

    /// `hello.case` is drawn by `hello.dimensions`.
    pub fn dimensions_file_name(case_file: &str) -> String {
        let base = case_file.strip_suffix(".case").unwrap_or(case_file);
        format!("{}.dimensions", base)
    }

    /// Records a warning on the dimensions document for every shape that points at an id
    /// the case does not define.
    pub fn validate_shapes(&mut self) {
        let Some(dimensions) = self.dimensions.as_mut() else {
            return;
        };
        if !dimensions.is_valid() {
            return;
        }
        let known: HashSet<&str> = self
            .definition
            .elements()
            .iter()
            .filter_map(|node| self.definition.node(*node).id())
            .collect();

        let mut warnings = Vec::new();
        for shape in dimensions.elements_of::<ShapeDefinition>() {
            let Some(data) = dimensions.get::<ShapeDefinition>(shape) else {
                continue;
            };
            let id = data.cmmn_element_ref.id();
            if id.is_empty() || known.contains(id) {
                continue;
            }
            let span = dimensions
                .node(shape)
                .source()
                .map(|source| source.location.clone());
            warnings.push(
                Diagnostic::warning(
                    "SHAPE_REFERENCE_DANGLING",
                    format!(
                        "Shape refers to \"{}\", which is not defined in \"{}\".",
                        id,
                        self.definition.file_name()
                    ),
                )
                .at(span),
            );
        }
        for warning in warnings {
            dimensions.record(warning);
        }
    }

    /// Removes a case definition and every shape or edge drawing one of the removed ids.
    pub fn remove_definition(&mut self, node: NodeRef) -> Result<Vec<String>, CaseModelError> {
        let removed = self.definition.remove_definition(node)?;
        let Some(dimensions) = self.dimensions.as_mut() else {
            return Ok(removed);
        };
        if !dimensions.is_valid() {
            log::warn!(
                "event=shape_cleanup status=skipped file={} reason=invalid_dimensions",
                dimensions.file_name()
            );
            return Ok(removed);
        }

        let gone: BTreeSet<&str> = removed.iter().map(String::as_str).collect();
        let mut drawings = Vec::new();
        for shape in dimensions.elements_of::<ShapeDefinition>() {
            if dimensions
                .get::<ShapeDefinition>(shape)
                .is_some_and(|data| gone.contains(data.cmmn_element_ref.id()))
            {
                drawings.push(shape);
            }
        }
        for edge in dimensions.elements_of::<EdgeDefinition>() {
            if dimensions.get::<EdgeDefinition>(edge).is_some_and(|data| {
                gone.contains(data.source_ref.id()) || gone.contains(data.target_ref.id())
            }) {
                drawings.push(edge);
            }
        }
        for drawing in drawings {
            if dimensions.is_live(drawing) {
                dimensions.remove_definition(drawing)?;
            }
        }
        Ok(removed)
    }

    /// Exports the case and, when present, its dimensions.
    pub fn export(&mut self) -> Result<(String, Option<String>), CaseModelError> {
        let definition = self.definition.export()?;
        let dimensions = match self.dimensions.as_mut() {
            Some(dimensions) => Some(dimensions.export()?),
            None => None,
        };
        Ok((definition, dimensions))
    }
}

use crate::attributes::NodeParser;
use crate::definition::{any_accessors, Definition, NodeField, ParseDefinition, Property};
use crate::node::NodeRef;

#[derive(Debug, Default)]
pub struct CaseFileDefinition {
    pub items: Vec<NodeRef>,
}

impl Definition for CaseFileDefinition {
    fn tag_name(&self) -> &str {
        "caseFileModel"
    }

    fn type_label(&self) -> &'static str {
        "CaseFile"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![("caseFileItem", Property::Children(&self.items))]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![NodeField::Many(&mut self.items)]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        if child_tag != "caseFileItem" {
            return false;
        }
        self.items.push(child);
        true
    }

    any_accessors!();
}

impl ParseDefinition for CaseFileDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            items: parser.parse_elements::<CaseFileItemDefinition>("caseFileItem"),
        }
    }
}

/// A case file item. `definitionRef` names a `.cfid` file in the repository.
#[derive(Debug)]
pub struct CaseFileItemDefinition {
    pub multiplicity: String,
    pub definition_ref: Option<String>,
    pub children: Vec<NodeRef>,
}

impl Default for CaseFileItemDefinition {
    fn default() -> Self {
        Self {
            multiplicity: "ExactlyOne".to_string(),
            definition_ref: None,
            children: Vec::new(),
        }
    }
}

impl Definition for CaseFileItemDefinition {
    fn tag_name(&self) -> &str {
        "caseFileItem"
    }

    fn type_label(&self) -> &'static str {
        "CaseFileItem"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("multiplicity", Property::Text(Some(self.multiplicity.as_str()))),
            ("definitionRef", Property::Text(self.definition_ref.as_deref())),
            ("children", Property::Wrapped(&self.children)),
        ]
    }

    fn node_fields(&mut self) -> Vec<NodeField<'_>> {
        vec![NodeField::Many(&mut self.children)]
    }

    fn adopt(&mut self, child: NodeRef, child_tag: &str) -> bool {
        if child_tag != "caseFileItem" {
            return false;
        }
        self.children.push(child);
        true
    }

    any_accessors!();
}

impl ParseDefinition for CaseFileItemDefinition {
    fn parse(parser: &mut NodeParser<'_>) -> Self {
        Self {
            multiplicity: parser.attribute_or("multiplicity", "ExactlyOne"),
            definition_ref: parser.attribute("definitionRef"),
            children: parser.parse_wrapped::<CaseFileItemDefinition>("children", "caseFileItem"),
        }
    }
}

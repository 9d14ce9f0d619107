//! Typed definition model for case models and their companion artifacts.
//!
//! A [`DefinitionDocument`] owns every node of one file. Loading is two-phase: the parse
//! pass builds the whole node tree, then the resolution pass turns string ids into node
//! handles. Mutations (create, move, delete) keep the graph consistent and the export pass
//! writes the tree back as stable, pretty printed XML.

mod attributes;
mod case_model;
mod cleanup;
mod definition;
pub mod definitions;
mod document;
mod export;
mod node;
mod reference;
mod resolve;

pub use attributes::NodeParser;
pub use case_model::CaseModel;
pub use definition::{
    Definition, Expression, NodeField, ParseDefinition, Property, ReferenceField,
    ReferenceSlot, RemovalEffect,
};
pub use document::{DefinitionDocument, DocumentKind};
pub use node::{DefinitionNode, NodeRef};
pub use reference::{Reference, ReferenceList};

#[cfg(test)]
mod model_test_support;
#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use cm_model::DefinitionDocument;

use crate::references::collect_references;
use crate::{FileStore, RepositoryError};

/// Which repository file points at which artifact.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    /// `(referencing file, referenced file)` pairs.
    references: Vec<(String, String)>,
}

impl UsageIndex {
    /// Parses every file in the store. Files that cannot be read or parsed are skipped.
    pub fn build(store: &FileStore) -> Result<Self, RepositoryError> {
        let mut index = Self::default();
        for entry in store.list()? {
            let source = match store.load(&entry.file_name) {
                Ok(source) => source,
                Err(error) => {
                    log::warn!(
                        "event=usage_index status=skipped file={} reason={}",
                        entry.file_name,
                        error
                    );
                    continue;
                }
            };
            index.add_source(&entry.file_name, &source);
        }
        Ok(index)
    }

    pub fn add_source(&mut self, file_name: &str, source: &str) {
        let document = match DefinitionDocument::parse(file_name, source) {
            Ok(document) if document.is_valid() => document,
            Ok(_) => {
                log::warn!(
                    "event=usage_index status=skipped file={} reason=invalid_document",
                    file_name
                );
                return;
            }
            Err(error) => {
                log::warn!(
                    "event=usage_index status=skipped file={} reason={}",
                    file_name,
                    error
                );
                return;
            }
        };
        for reference in collect_references(&document) {
            self.references
                .push((file_name.to_string(), reference.file_name));
        }
    }

    /// Distinct, sorted names of the files referring to `id`. An id without extension
    /// matches any artifact with that base name.
    pub fn usage(&self, id: &str) -> Vec<String> {
        self.references
            .iter()
            .filter(|(_, referenced)| {
                referenced == id
                    || referenced
                        .rsplit_once('.')
                        .is_some_and(|(base, _)| base == id)
            })
            .map(|(referencing, _)| referencing.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

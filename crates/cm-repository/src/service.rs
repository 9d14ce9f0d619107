use std::fs;
use std::path::PathBuf;

use cm_model::DefinitionDocument;

use crate::{
    validate_file_name, DefinitionAssembler, FileStore, RepositoryEntry, RepositoryError,
    UsageIndex,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub repository_dir: PathBuf,
    pub deploy_dir: PathBuf,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            repository_dir: PathBuf::from("repository"),
            deploy_dir: PathBuf::from("deploy"),
        }
    }
}

/// Outcome of rewriting a file in normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub file_name: String,
    pub migrated: bool,
    pub changed: bool,
}

/// Operations behind the repository surface: list, load, save, deploy and usage.
#[derive(Debug, Clone)]
pub struct RepositoryService {
    options: RepositoryOptions,
    store: FileStore,
}

impl RepositoryService {
    pub fn new(options: RepositoryOptions) -> Self {
        let store = FileStore::new(options.repository_dir.clone());
        Self { options, store }
    }

    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn list(&self) -> Result<Vec<RepositoryEntry>, RepositoryError> {
        self.store.list()
    }

    pub fn load(&self, file_name: &str) -> Result<String, RepositoryError> {
        self.store.load(file_name)
    }

    /// Saves the file and returns the refreshed listing.
    pub fn save(
        &self,
        file_name: &str,
        content: &str,
    ) -> Result<Vec<RepositoryEntry>, RepositoryError> {
        self.store.save(file_name, content)?;
        self.store.list()
    }

    /// Assembles `file_name` with everything it references and writes the result to
    /// `<deploy_dir>/<base>.xml`. Nothing is written when any artifact is missing.
    pub fn deploy(&self, file_name: &str) -> Result<PathBuf, RepositoryError> {
        validate_file_name(file_name)?;
        let assembled = DefinitionAssembler::new(&self.store).assemble(file_name);
        if !assembled.errors.is_empty() {
            return Err(RepositoryError::Deploy {
                file_name: file_name.to_string(),
                errors: assembled.errors,
            });
        }

        let base = file_name
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(file_name);
        let target = self.options.deploy_dir.join(format!("{}.xml", base));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| RepositoryError::WriteFile {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, assembled.document).map_err(|source| RepositoryError::WriteFile {
            path: target.clone(),
            source,
        })?;
        log::info!(
            "event=deploy status=ok file={} root_id={} target={}",
            file_name,
            assembled.root_id,
            target.display()
        );
        Ok(target)
    }

    pub fn usage(&self, id: &str) -> Result<Vec<String>, RepositoryError> {
        Ok(UsageIndex::build(&self.store)?.usage(id))
    }

    /// Parses and resolves one file without changing it.
    pub fn validate(&self, file_name: &str) -> Result<DefinitionDocument, RepositoryError> {
        let source = self.store.load(file_name)?;
        Ok(DefinitionDocument::parse(file_name, &source)?)
    }

    /// Rewrites one file in exported form. Legacy constructs are migrated on the way.
    pub fn format(&self, file_name: &str) -> Result<FormatReport, RepositoryError> {
        let source = self.store.load(file_name)?;
        let mut document = DefinitionDocument::parse(file_name, &source)?;
        let exported = document.export()?;
        let changed = exported != source;
        if changed {
            self.store.save(file_name, &exported)?;
        }
        Ok(FormatReport {
            file_name: file_name.to_string(),
            migrated: document.is_migrated(),
            changed,
        })
    }
}

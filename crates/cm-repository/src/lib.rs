//! File backed repository of case model artifacts: storage, deployment assembly and the
//! usage index.

mod assembler;
mod references;
mod service;
mod store;
mod usage;

pub use assembler::{AssembledDefinitions, DefinitionAssembler};
pub use service::{FormatReport, RepositoryOptions, RepositoryService};
pub use store::{validate_file_name, FileStore, RepositoryEntry};
pub use usage::UsageIndex;

use std::collections::BTreeMap;
use std::path::PathBuf;

use cm_core::CaseModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("File \"{file_name}\" does not exist in the repository.")]
    NotFound { file_name: String },
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid file name \"{file_name}\".")]
    InvalidFileName { file_name: String },
    #[error("Deploying \"{file_name}\" failed: {}", .errors.join("; "))]
    Deploy {
        file_name: String,
        errors: Vec<String>,
    },
    #[error("Model error: {0}")]
    Model(#[from] CaseModelError),
}

impl RepositoryError {
    /// Stable code for the CLI output protocol.
    pub fn code(&self) -> &str {
        match self {
            RepositoryError::NotFound { .. } => "REPOSITORY_NOT_FOUND",
            RepositoryError::ReadFile { .. } => "REPOSITORY_READ",
            RepositoryError::WriteFile { .. } => "REPOSITORY_WRITE",
            RepositoryError::InvalidFileName { .. } => "REPOSITORY_FILE_NAME",
            RepositoryError::Deploy { .. } => "DEPLOY_FAILED",
            RepositoryError::Model(error) => &error.code,
        }
    }
}

/// Where the assembler reads artifacts from.
pub trait ArtifactSource {
    fn read_artifact(&self, file_name: &str) -> Result<String, RepositoryError>;
}

impl ArtifactSource for BTreeMap<String, String> {
    fn read_artifact(&self, file_name: &str) -> Result<String, RepositoryError> {
        self.get(file_name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                file_name: file_name.to_string(),
            })
    }
}

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

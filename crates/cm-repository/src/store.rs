use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::UNIX_EPOCH;

use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{ArtifactSource, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    pub file_name: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
}

/// Artifacts stored as plain files below one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every artifact file, sorted by file name. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<RepositoryEntry>, RepositoryError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let file_name = relative.to_string_lossy().replace('\\', "/");
            if validate_file_name(&file_name).is_err() {
                continue;
            }

            let metadata = entry.metadata().map_err(|error| RepositoryError::ReadFile {
                path: entry.path().to_path_buf(),
                source: error.into(),
            })?;
            let last_modified = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .and_then(|duration| u64::try_from(duration.as_millis()).ok())
                .unwrap_or_default();
            entries.push(RepositoryEntry {
                file_name,
                last_modified,
            });
        }
        entries.sort_by(|left, right| left.file_name.cmp(&right.file_name));
        Ok(entries)
    }

    pub fn load(&self, file_name: &str) -> Result<String, RepositoryError> {
        validate_file_name(file_name)?;
        let path = self.root.join(file_name);
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => RepositoryError::NotFound {
                file_name: file_name.to_string(),
            },
            _ => RepositoryError::ReadFile { path, source },
        })
    }

    /// Writes the file, creating directories as needed. The last write wins.
    pub fn save(&self, file_name: &str, content: &str) -> Result<(), RepositoryError> {
        validate_file_name(file_name)?;
        let path = self.root.join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RepositoryError::WriteFile {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content).map_err(|source| RepositoryError::WriteFile { path, source })?;
        log::info!("event=repository_save status=ok file={}", file_name);
        Ok(())
    }
}

impl ArtifactSource for FileStore {
    fn read_artifact(&self, file_name: &str) -> Result<String, RepositoryError> {
        self.load(file_name)
    }
}

fn file_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"^(?:[A-Za-z0-9_-][A-Za-z0-9_.-]*/)*[A-Za-z0-9_-][A-Za-z0-9_.-]*\.(?:case|dimensions|process|humantask|cfid)$",
        )
        .expect("file name regex must compile")
    })
}

/// Accepts relative names with a known artifact extension. Absolute paths and segments
/// starting with a dot (including `..`) are rejected.
pub fn validate_file_name(file_name: &str) -> Result<(), RepositoryError> {
    if file_name_regex().is_match(file_name) {
        return Ok(());
    }
    Err(RepositoryError::InvalidFileName {
        file_name: file_name.to_string(),
    })
}

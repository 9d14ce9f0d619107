use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

pub fn repository_root() -> PathBuf {
    fixtures_root().join("repository")
}

pub fn fixture_path(file_name: &str) -> PathBuf {
    repository_root().join(file_name)
}

/// Copies the fixture repository into `target`, so tests can write without touching it.
pub fn copy_repository_to(target: &Path) -> io::Result<()> {
    let source = repository_root();
    for entry in WalkDir::new(&source).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&source)
            .map_err(io::Error::other)?;
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{RepositoryOptions, RepositoryService};

pub(crate) fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should move forward")
        .as_nanos();
    std::env::temp_dir().join(format!("cm-repository-{}-{}", name, nanos))
}

/// A service over a private copy of the fixture repository.
pub(crate) fn fixture_service(name: &str) -> RepositoryService {
    let root = temp_dir(name);
    let repository_dir = root.join("repository");
    cm_test_example::copy_repository_to(&repository_dir).expect("fixtures should copy");
    RepositoryService::new(RepositoryOptions {
        repository_dir,
        deploy_dir: root.join("deploy"),
    })
}

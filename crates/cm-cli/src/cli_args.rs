use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cm_repository::RepositoryOptions;

pub(crate) const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Parser)]
#[command(name = "cm-cli")]
#[command(about = "Case model repository CLI")]
pub(crate) struct Cli {
    #[arg(long = "repository", global = true, default_value = "repository")]
    pub(crate) repository: String,
    #[arg(long = "deploy-dir", global = true, default_value = "deploy")]
    pub(crate) deploy_dir: String,
    #[arg(
        long = "log-level",
        global = true,
        default_value = "warn",
        value_parser = LOG_LEVELS
    )]
    pub(crate) log_level: String,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the repository files with their modification times.
    List,
    Load(FileArgs),
    /// Store the contents of a local file under a repository file name.
    Save(SaveArgs),
    /// Assemble a case with everything it references into one deployable document.
    Deploy(FileArgs),
    /// Files that reference the given artifact.
    Usage(UsageArgs),
    Validate(FileArgs),
    /// Rewrite a file in normalized form, migrating legacy constructs.
    Format(FileArgs),
}

#[derive(Debug, Args)]
pub(crate) struct FileArgs {
    pub(crate) file: String,
}

#[derive(Debug, Args)]
pub(crate) struct SaveArgs {
    pub(crate) file: String,
    #[arg(long = "from")]
    pub(crate) from: String,
}

#[derive(Debug, Args)]
pub(crate) struct UsageArgs {
    pub(crate) id: String,
}

impl Cli {
    pub(crate) fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            repository_dir: PathBuf::from(&self.repository),
            deploy_dir: PathBuf::from(&self.deploy_dir),
        }
    }
}

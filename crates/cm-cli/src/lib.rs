use std::ffi::OsString;

use clap::Parser;
use cm_core::CaseModelError;
use cm_repository::RepositoryService;

mod cli_args;
mod commands;
mod error_map;
mod logging;

pub(crate) use cli_args::{Cli, Command, FileArgs, SaveArgs, UsageArgs};
pub(crate) use error_map::{
    emit_error, map_cli_input_read, map_cli_logger_init, map_cli_output_json, map_repository,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return error.exit_code(),
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, CaseModelError> {
    logging::init_logging(&cli.log_level)?;
    let service = RepositoryService::new(cli.repository_options());
    match cli.command {
        Command::List => commands::run_list(&service),
        Command::Load(args) => commands::run_load(&service, args),
        Command::Save(args) => commands::run_save(&service, args),
        Command::Deploy(args) => commands::run_deploy(&service, args),
        Command::Usage(args) => commands::run_usage(&service, args),
        Command::Validate(args) => commands::run_validate(&service, args),
        Command::Format(args) => commands::run_format(&service, args),
    }
}

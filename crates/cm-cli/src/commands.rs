use std::fs;

use cm_core::{CaseModelError, Diagnostic};
use cm_repository::RepositoryService;
use serde::Serialize;

use crate::{
    emit_error, map_cli_input_read, map_cli_output_json, map_repository, FileArgs, SaveArgs,
    UsageArgs,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationSummary<'a> {
    file_name: &'a str,
    valid: bool,
    warnings: usize,
    errors: usize,
}

fn to_json(value: &impl Serialize) -> Result<String, CaseModelError> {
    serde_json::to_string(value).map_err(map_cli_output_json)
}

pub(crate) fn run_list(service: &RepositoryService) -> Result<i32, CaseModelError> {
    let entries = service.list().map_err(map_repository)?;
    println!("RESULT:OK");
    println!("ENTRY_COUNT:{}", entries.len());
    println!("ENTRIES_JSON:{}", to_json(&entries)?);
    Ok(0)
}

pub(crate) fn run_load(service: &RepositoryService, args: FileArgs) -> Result<i32, CaseModelError> {
    let content = service.load(&args.file).map_err(map_repository)?;
    println!("RESULT:OK");
    println!("FILE:{}", args.file);
    println!("CONTENT_JSON:{}", to_json(&content)?);
    Ok(0)
}

pub(crate) fn run_save(service: &RepositoryService, args: SaveArgs) -> Result<i32, CaseModelError> {
    let content = fs::read_to_string(&args.from).map_err(map_cli_input_read)?;
    let entries = service.save(&args.file, &content).map_err(map_repository)?;
    println!("RESULT:OK");
    println!("FILE:{}", args.file);
    println!("ENTRIES_JSON:{}", to_json(&entries)?);
    Ok(0)
}

pub(crate) fn run_deploy(
    service: &RepositoryService,
    args: FileArgs,
) -> Result<i32, CaseModelError> {
    let target = service.deploy(&args.file).map_err(map_repository)?;
    println!("RESULT:OK");
    println!("FILE:{}", args.file);
    println!("TARGET:{}", target.display());
    Ok(0)
}

pub(crate) fn run_usage(service: &RepositoryService, args: UsageArgs) -> Result<i32, CaseModelError> {
    let files = service.usage(&args.id).map_err(map_repository)?;
    println!("RESULT:OK");
    println!("ID:{}", args.id);
    println!("USAGE_JSON:{}", to_json(&files)?);
    Ok(0)
}

/// Prints every diagnostic of the file. Exits 1 when the file has parse errors.
pub(crate) fn run_validate(
    service: &RepositoryService,
    args: FileArgs,
) -> Result<i32, CaseModelError> {
    let document = service.validate(&args.file).map_err(map_repository)?;
    let summary = ValidationSummary {
        file_name: &args.file,
        valid: document.is_valid(),
        warnings: document.warnings().count(),
        errors: document.errors().count(),
    };

    let code = if summary.valid {
        println!("RESULT:OK");
        0
    } else {
        let message = document
            .errors()
            .map(Diagnostic::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        emit_error(CaseModelError::new("DOCUMENT_INVALID", message))
    };
    println!("SUMMARY_JSON:{}", to_json(&summary)?);
    for diagnostic in document.diagnostics() {
        println!("DIAGNOSTIC_JSON:{}", to_json(diagnostic)?);
    }
    Ok(code)
}

pub(crate) fn run_format(service: &RepositoryService, args: FileArgs) -> Result<i32, CaseModelError> {
    let report = service.format(&args.file).map_err(map_repository)?;
    println!("RESULT:OK");
    println!("FILE:{}", report.file_name);
    println!("MIGRATED:{}", report.migrated);
    println!("CHANGED:{}", report.changed);
    Ok(0)
}

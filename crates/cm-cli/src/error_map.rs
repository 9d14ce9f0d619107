use cm_core::CaseModelError;
use cm_repository::RepositoryError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> CaseModelError {
    CaseModelError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: CaseModelError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

pub(crate) fn map_repository(error: RepositoryError) -> CaseModelError {
    CaseModelError::new(error.code(), error.to_string())
}

pub(crate) fn map_cli_input_read(error: std::io::Error) -> CaseModelError {
    map_error("CLI_INPUT_READ", error)
}

pub(crate) fn map_cli_output_json(error: serde_json::Error) -> CaseModelError {
    map_error("CLI_OUTPUT_JSON", error)
}

pub(crate) fn map_cli_logger_init(error: impl Display) -> CaseModelError {
    map_error("CLI_LOGGER_INIT", error)
}

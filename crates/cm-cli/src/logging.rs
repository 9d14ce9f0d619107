use std::sync::Mutex;

use cm_core::CaseModelError;
use flexi_logger::{Logger, LoggerHandle};

use crate::map_cli_logger_init;

static LOGGER: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// Starts stderr logging at `level`. Later calls in the same process only swap the level.
pub(crate) fn init_logging(level: &str) -> Result<(), CaseModelError> {
    let mut slot = LOGGER.lock().map_err(map_cli_logger_init)?;
    if let Some(handle) = slot.as_ref() {
        return handle.parse_new_spec(level).map_err(map_cli_logger_init);
    }

    let handle = Logger::try_with_str(level)
        .map_err(map_cli_logger_init)?
        .log_to_stderr()
        .start()
        .map_err(map_cli_logger_init)?;
    log::debug!("event=cli_start status=ok level={}", level);
    *slot = Some(handle);
    Ok(())
}

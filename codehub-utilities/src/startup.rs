use log::info;

use codehub_models::errors::SendableError;

use crate::logger;

/// Shared process bootstrap: logging, panic capture, banner.
pub fn startup(name: &str, log_file: &str) -> Result<(), SendableError> {
    logger::setup_logger(log_file)?;
    log_panics::init();

    info!("--- {} ---", name);
    Ok(())
}

use crate::{config::CalibrationConfigError, host::CalibrationError};

#[derive(thiserror::Error, Debug)]
pub enum CalibrationAppError {
    #[error(transparent)]
    CalibrationConfigError(#[from] CalibrationConfigError),
    #[error(transparent)]
    CalibrationError(#[from] CalibrationError),
    #[error("failure writing '{path}': {message}")]
    OutputError { path: String, message: String },
}

use crate::target::TargetError;
use thiserror::Error;
use xtmf_calibration_core::model::ModelSystemError;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("validation failed for '{module}': {message}")]
    Validation { module: String, message: String },
    #[error(transparent)]
    TargetError(#[from] TargetError),
    #[error("model system run failed during iteration {iteration}, job {job}: {source}")]
    ModelRunFailed {
        iteration: usize,
        job: usize,
        source: ModelSystemError,
    },
    #[error("module '{name}' failed: {source}")]
    ModuleFailed {
        name: String,
        source: ModelSystemError,
    },
    #[error("failure saving parameters for '{module}': {message}")]
    SaveFailed { module: String, message: String },
    #[error("failure writing calibration report '{path}': {message}")]
    ReportFailed { path: String, message: String },
}

impl CalibrationError {
    pub fn validation(module: &str, message: String) -> CalibrationError {
        CalibrationError::Validation {
            module: module.to_string(),
            message,
        }
    }
}

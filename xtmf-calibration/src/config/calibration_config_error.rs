use xtmf_calibration_core::model::ModelSystemError;

#[derive(thiserror::Error, Debug)]
pub enum CalibrationConfigError {
    #[error("{msg}: {source}")]
    ConfigReadError {
        msg: String,
        source: config::ConfigError,
    },
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("invalid configuration for '{module}': {message}")]
    Invalid { module: String, message: String },
    #[error("failed building model system: {0}")]
    ModelSystemError(#[from] ModelSystemError),
}

impl CalibrationConfigError {
    pub fn invalid(module: &str, message: String) -> CalibrationConfigError {
        CalibrationConfigError::Invalid {
            module: module.to_string(),
            message,
        }
    }
}

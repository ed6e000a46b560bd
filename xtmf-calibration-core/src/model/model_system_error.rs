use crate::parameter::ParameterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelSystemError {
    #[error("model system '{name}' failed to run: {message}")]
    RunFailed { name: String, message: String },
    #[error("model system '{name}' failed to save its configuration: {message}")]
    SaveFailed { name: String, message: String },
    #[error("model system i/o failure on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    ParameterError(#[from] ParameterError),
}

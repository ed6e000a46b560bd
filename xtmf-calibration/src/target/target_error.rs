use super::RunKind;
use thiserror::Error;
use xtmf_calibration_core::{
    matrix::MatrixError, model::DataSourceError, parameter::ParameterError,
};

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("target '{name}' is misconfigured: {message}")]
    InvalidConfiguration { name: String, message: String },
    #[error("target '{0}' was used before it was initialized")]
    NotInitialized(String),
    #[error("target '{name}' has no {kind} run stored")]
    MissingRun { name: String, kind: RunKind },
    #[error("target '{name}' parameter failure: {source}")]
    Parameter {
        name: String,
        source: ParameterError,
    },
    #[error("target '{name}' failed reading data: {source}")]
    DataSource {
        name: String,
        source: DataSourceError,
    },
    #[error("target '{name}' matrix failure: {source}")]
    Matrix { name: String, source: MatrixError },
}

impl TargetError {
    pub fn invalid(name: &str, message: String) -> TargetError {
        TargetError::InvalidConfiguration {
            name: name.to_string(),
            message,
        }
    }
}

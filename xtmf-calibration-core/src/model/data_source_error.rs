use crate::matrix::MatrixError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("data source '{0}' was read before it was loaded")]
    NotLoaded(String),
    #[error("data source '{0}' has no data available")]
    NoData(String),
    #[error("failure reading '{path}' for data source '{name}': {message}")]
    ReadFailed {
        name: String,
        path: String,
        message: String,
    },
    #[error("lock on data source '{0}' was poisoned by a panicked thread")]
    Poisoned(String),
    #[error(transparent)]
    MatrixError(#[from] MatrixError),
}

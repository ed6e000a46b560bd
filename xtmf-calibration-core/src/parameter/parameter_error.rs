use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("no parameter found at path '{0}'")]
    UnresolvedPath(String),
    #[error("parameter path '{0}' is registered more than once")]
    DuplicatePath(String),
    #[error("parameter '{path}' has value {value} which is not numeric")]
    NonNumeric { path: String, value: String },
    #[error("failure assigning {value} to parameter '{path}': {message}")]
    AssignmentFailed {
        path: String,
        value: f32,
        message: String,
    },
    #[error("lock on parameter '{0}' was poisoned by a panicked thread")]
    Poisoned(String),
}

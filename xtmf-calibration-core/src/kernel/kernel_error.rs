use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },
}

impl KernelError {
    pub fn length_mismatch(argument: &str, expected: usize, found: usize) -> KernelError {
        KernelError::InvalidArgument {
            argument: argument.to_string(),
            message: format!("expected length {expected}, found {found}"),
        }
    }
}

use crate::kernel::KernelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("zone {0} is not part of the zone system")]
    UnknownZone(i32),
    #[error("zone {0} appears more than once in the zone system")]
    DuplicateZone(i32),
    #[error("matrix zone systems differ: {0}")]
    ZoneSystemMismatch(String),
    #[error(transparent)]
    KernelError(#[from] KernelError),
}

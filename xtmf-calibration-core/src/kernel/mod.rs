//! branch-free elementwise flagging and lane-chunked reductions over `f32` data.
//!
//! every operation comes in a flat form over slices and a row-wise form over
//! jagged matrices (`&[Vec<f32>]` or anything that derefs to `[f32]`). row-wise
//! forms process rows on the rayon pool since each output row is disjoint.
mod comparator;
mod flag_ops;
mod kernel_error;
mod sum_ops;

pub use comparator::{
    And, Comparator, Equal, GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual, NotEqual,
    Or,
};
pub use flag_ops::{
    flag, flag_rows, flag_rows_scalar_lhs, flag_rows_scalar_rhs, flag_scalar_lhs, flag_scalar_rhs,
};
pub use kernel_error::KernelError;
pub use sum_ops::{
    multiply_and_sum, multiply_and_sum_rows, sum, sum_lanes, sum_rows, sum_slice, DEFAULT_LANES,
};

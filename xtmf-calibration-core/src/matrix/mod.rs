mod matrix_error;
mod sparse_zone_matrix;

pub use matrix_error::MatrixError;
pub use sparse_zone_matrix::SparseZoneMatrix;

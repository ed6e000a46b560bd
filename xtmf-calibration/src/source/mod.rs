mod csv_column_source;
mod csv_matrix_source;
mod text_scalar_source;

pub use csv_column_source::CsvColumnSource;
pub use csv_matrix_source::CsvMatrixSource;
pub use text_scalar_source::TextScalarSource;

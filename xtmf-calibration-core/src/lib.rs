pub mod kernel;
pub mod matrix;
pub mod model;
pub mod parameter;

mod data_source;
mod data_source_error;
mod model_system;
mod model_system_error;

pub use data_source::{ConstantSource, DataSource, SharedSource};
pub use data_source_error::DataSourceError;
pub use model_system::{ExitHook, ModelSystem, SelfContainedModule};
pub use model_system_error::ModelSystemError;

mod job;
mod parameter_binding;
mod parameter_cell;
mod parameter_error;
mod parameter_handle;
mod parameter_registry;
mod parameter_setting;

pub use job::{Job, JobStatus};
pub use parameter_binding::{ParameterBinding, ParameterReader, ParameterWriter};
pub use parameter_cell::ParameterCell;
pub use parameter_error::ParameterError;
pub use parameter_handle::ParameterHandle;
pub use parameter_registry::ParameterRegistry;
pub use parameter_setting::ParameterSetting;

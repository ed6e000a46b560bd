mod calibration_config;
mod calibration_config_error;
mod model_system_config;
mod module_config;
mod source_config;
mod target_config;

pub use calibration_config::{CalibrationConfig, ENV_PREFIX};
pub use calibration_config_error::CalibrationConfigError;
pub use model_system_config::ModelSystemConfig;
pub use module_config::ModuleConfig;
pub use source_config::{MatrixSourceConfig, ScalarSourceConfig};
pub use target_config::{MeasureConfig, TargetConfig};

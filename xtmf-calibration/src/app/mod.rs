mod calibration_app;
mod calibration_app_error;

pub use calibration_app::{run, CalibrationApp, CalibrationAppArguments};
pub use calibration_app_error::CalibrationAppError;

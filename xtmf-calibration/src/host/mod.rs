mod calibration_error;
mod calibration_host;
mod calibration_host_config;
mod calibration_report;
mod calibration_summary;
mod host_monitor;
pub mod job_ops;

pub use calibration_error::CalibrationError;
pub use calibration_host::CalibrationHost;
pub use calibration_host_config::CalibrationHostConfig;
pub use calibration_report::CalibrationReport;
pub use calibration_summary::CalibrationSummary;
pub use host_monitor::{HostMonitor, HostState};
pub use job_ops::{JobKind, JobMode, PlannedJob};

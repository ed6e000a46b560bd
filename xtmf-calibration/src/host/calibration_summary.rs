use serde::Serialize;
use xtmf_calibration_core::parameter::ParameterSetting;

/// what a completed calibration did.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CalibrationSummary {
    pub iterations_completed: usize,
    pub jobs_per_iteration: Vec<usize>,
    pub final_position: Vec<ParameterSetting>,
    pub exit_requested: bool,
    pub started_at: String,
    pub finished_at: String,
}

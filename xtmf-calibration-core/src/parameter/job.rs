use super::ParameterSetting;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Done,
}

/// a single evaluation request: a complete parameter vector, in target order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Job {
    pub parameters: Vec<ParameterSetting>,
    pub status: JobStatus,
    /// fitness placeholder, unused by the calibration targets.
    pub value: f32,
}

impl Job {
    pub fn new(parameters: Vec<ParameterSetting>) -> Job {
        Job {
            parameters,
            status: JobStatus::Pending,
            value: 0.0,
        }
    }

    pub fn mark_done(&mut self) {
        self.status = JobStatus::Done;
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Done
    }
}

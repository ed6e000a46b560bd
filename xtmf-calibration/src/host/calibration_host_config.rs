use super::{CalibrationError, JobMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// iteration settings of a [`super::CalibrationHost`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CalibrationHostConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// measure the current position against the targets without moving it.
    #[serde(default)]
    pub just_compute_against_targets: bool,
    /// one perturbed run per target (true), or a single run perturbing every
    /// target at once (false).
    #[serde(default = "default_true")]
    pub compute_each_derivative_separately: bool,
    /// persist the updated position through the model system every iteration.
    #[serde(default = "default_true")]
    pub save_parameters: bool,
    /// csv file receiving one row per iteration, appended.
    #[serde(default)]
    pub calibration_report: Option<PathBuf>,
    #[serde(default)]
    pub show_progress: bool,
}

fn default_max_iterations() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Default for CalibrationHostConfig {
    fn default() -> Self {
        CalibrationHostConfig {
            max_iterations: default_max_iterations(),
            just_compute_against_targets: false,
            compute_each_derivative_separately: true,
            save_parameters: true,
            calibration_report: None,
            show_progress: false,
        }
    }
}

impl CalibrationHostConfig {
    pub fn job_mode(&self) -> JobMode {
        if self.just_compute_against_targets {
            JobMode::JustCompute
        } else if self.compute_each_derivative_separately {
            JobMode::SeparateDerivatives
        } else {
            JobMode::CombinedDerivative
        }
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.max_iterations < 1 {
            return Err(CalibrationError::validation(
                "calibration host",
                format!(
                    "max_iterations must be at least 1, found {}",
                    self.max_iterations
                ),
            ));
        }
        if let Some(report) = &self.calibration_report {
            if report.as_os_str().is_empty() || report.is_dir() {
                return Err(CalibrationError::validation(
                    "calibration host",
                    format!("calibration_report '{}' is not a file path", report.display()),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_iterations_is_invalid() {
        let config = CalibrationHostConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CalibrationError::Validation { .. })
        ));
    }

    #[test]
    fn test_job_mode() {
        let mut config = CalibrationHostConfig::default();
        assert_eq!(config.job_mode(), JobMode::SeparateDerivatives);
        config.compute_each_derivative_separately = false;
        assert_eq!(config.job_mode(), JobMode::CombinedDerivative);
        config.just_compute_against_targets = true;
        assert_eq!(config.job_mode(), JobMode::JustCompute);
    }
}

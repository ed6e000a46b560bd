mod calibration_target;
mod matrix_target;
mod probability_matrix_target;
mod probability_target;
mod run_slots;
mod scalar_target;
mod source_ops;
mod target_error;
mod target_settings;
pub mod update_ops;

pub use calibration_target::{CalibrationTarget, TargetKind, TargetState};
pub use matrix_target::MatrixTarget;
pub use probability_matrix_target::ProbabilityMatrixTarget;
pub use probability_target::ProbabilityTarget;
pub use run_slots::{RunKind, RunSlots};
pub use scalar_target::ScalarTarget;
pub use target_error::TargetError;
pub use target_settings::TargetSettings;

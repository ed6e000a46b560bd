use super::{MatrixSourceConfig, ScalarSourceConfig};
use crate::target::{
    CalibrationTarget, MatrixTarget, ProbabilityMatrixTarget, ProbabilityTarget, ScalarTarget,
    TargetKind, TargetSettings,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// one `[[targets]]` entry: the shared settings plus how the target measures.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TargetConfig {
    #[serde(flatten)]
    pub settings: TargetSettings,
    pub measure: MeasureConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MeasureConfig {
    Scalar {
        target: ScalarSourceConfig,
        observed: ScalarSourceConfig,
    },
    Matrix {
        target: MatrixSourceConfig,
        observed: MatrixSourceConfig,
    },
    Probability {
        #[serde(default)]
        parameter_is_ratio: bool,
        target_selection: ScalarSourceConfig,
        target_total: ScalarSourceConfig,
        observed_selection: ScalarSourceConfig,
        observed_total: ScalarSourceConfig,
    },
    ProbabilityMatrix {
        #[serde(default)]
        parameter_is_ratio: bool,
        target_selection: MatrixSourceConfig,
        target_total: MatrixSourceConfig,
        observed_selection: MatrixSourceConfig,
        observed_total: MatrixSourceConfig,
        #[serde(default)]
        mask: Option<MatrixSourceConfig>,
    },
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.settings.validate()?;
        match &self.measure {
            MeasureConfig::Scalar { target, observed } => {
                target.validate()?;
                observed.validate()
            }
            MeasureConfig::Matrix { target, observed } => {
                target.validate()?;
                observed.validate()
            }
            MeasureConfig::Probability {
                target_selection,
                target_total,
                observed_selection,
                observed_total,
                ..
            } => [target_selection, target_total, observed_selection, observed_total]
                .iter()
                .try_for_each(|s| s.validate()),
            MeasureConfig::ProbabilityMatrix {
                target_selection,
                target_total,
                observed_selection,
                observed_total,
                mask,
                ..
            } => [target_selection, target_total, observed_selection, observed_total]
                .into_iter()
                .chain(mask.as_ref())
                .try_for_each(|s| s.validate()),
        }
    }

    /// builds the target, resolving file paths against `base_directory`.
    pub fn build(&self, base_directory: &Path) -> CalibrationTarget {
        let name = self.settings.name.as_str();
        let role = |r: &str| format!("{name} {r}");
        let kind = match &self.measure {
            MeasureConfig::Scalar { target, observed } => TargetKind::Scalar(ScalarTarget::new(
                target.build(&role("target"), base_directory),
                observed.build(&role("observed"), base_directory),
            )),
            MeasureConfig::Matrix { target, observed } => TargetKind::Matrix(MatrixTarget::new(
                target.build(&role("target"), base_directory),
                observed.build(&role("observed"), base_directory),
            )),
            MeasureConfig::Probability {
                parameter_is_ratio,
                target_selection,
                target_total,
                observed_selection,
                observed_total,
            } => TargetKind::Probability(ProbabilityTarget::new(
                *parameter_is_ratio,
                target_selection.build(&role("target selection"), base_directory),
                target_total.build(&role("target total"), base_directory),
                observed_selection.build(&role("observed selection"), base_directory),
                observed_total.build(&role("observed total"), base_directory),
            )),
            MeasureConfig::ProbabilityMatrix {
                parameter_is_ratio,
                target_selection,
                target_total,
                observed_selection,
                observed_total,
                mask,
            } => TargetKind::ProbabilityMatrix(ProbabilityMatrixTarget::new(
                *parameter_is_ratio,
                target_selection.build(&role("target selection"), base_directory),
                target_total.build(&role("target total"), base_directory),
                observed_selection.build(&role("observed selection"), base_directory),
                observed_total.build(&role("observed total"), base_directory),
                mask.as_ref().map(|m| m.build(&role("mask"), base_directory)),
            )),
        };
        CalibrationTarget::new(self.settings.clone(), kind)
    }
}

use super::{scalar_target::required, source_ops, update_ops, RunKind, RunSlots, TargetError, TargetSettings};
use crate::diagnostics::DiagnosticSink;
use xtmf_calibration_core::{matrix::SparseZoneMatrix, model::DataSource};

/// a [`super::ProbabilityTarget`] over matrix totals, optionally restricted to
/// the cells where a mask matrix is non-zero.
pub struct ProbabilityMatrixTarget {
    parameter_is_ratio: bool,
    target_selection: Box<dyn DataSource<SparseZoneMatrix>>,
    target_total: Box<dyn DataSource<SparseZoneMatrix>>,
    observed_selection: Box<dyn DataSource<SparseZoneMatrix>>,
    observed_total: Box<dyn DataSource<SparseZoneMatrix>>,
    mask_source: Option<Box<dyn DataSource<SparseZoneMatrix>>>,
    mask: Option<Mask>,
    target_probability: Option<f32>,
    runs: RunSlots<f32>,
}

/// the mask matrix with its 0/1 flags computed once at load.
struct Mask {
    matrix: SparseZoneMatrix,
    flags: Vec<Vec<f32>>,
}

impl ProbabilityMatrixTarget {
    pub fn new(
        parameter_is_ratio: bool,
        target_selection: Box<dyn DataSource<SparseZoneMatrix>>,
        target_total: Box<dyn DataSource<SparseZoneMatrix>>,
        observed_selection: Box<dyn DataSource<SparseZoneMatrix>>,
        observed_total: Box<dyn DataSource<SparseZoneMatrix>>,
        mask: Option<Box<dyn DataSource<SparseZoneMatrix>>>,
    ) -> ProbabilityMatrixTarget {
        ProbabilityMatrixTarget {
            parameter_is_ratio,
            target_selection,
            target_total,
            observed_selection,
            observed_total,
            mask_source: mask,
            mask: None,
            target_probability: None,
            runs: RunSlots::new(),
        }
    }

    pub fn load_target(&mut self, settings: &TargetSettings) -> Result<(), TargetError> {
        if let Some(source) = self.mask_source.as_mut() {
            let matrix = source_ops::read_source(&settings.name, source.as_mut())?;
            let flags = matrix.non_zero_flags().map_err(|e| matrix_error(settings, e))?;
            let cells = xtmf_calibration_core::kernel::sum_rows(&flags);
            if cells == 0.0 {
                return Err(TargetError::invalid(
                    &settings.name,
                    format!("mask '{}' has no non-zero cells", source.name()),
                ));
            }
            log::debug!("target '{}' masked to {cells} cells", settings.name);
            self.mask = Some(Mask { matrix, flags });
        }
        let selection = source_ops::read_source(&settings.name, self.target_selection.as_mut())?;
        let total = source_ops::read_source(&settings.name, self.target_total.as_mut())?;
        let probability = source_ops::probability(
            self.masked_sum(settings, &selection)?,
            self.masked_sum(settings, &total)?,
        );
        if !probability.is_finite() {
            return Err(TargetError::invalid(
                &settings.name,
                String::from("target probability is not finite, check the target total matrix"),
            ));
        }
        self.target_probability = Some(probability);
        Ok(())
    }

    pub fn store_run(&mut self, settings: &TargetSettings, kind: RunKind) -> Result<(), TargetError> {
        let selection = source_ops::read_source(&settings.name, self.observed_selection.as_mut())?;
        let total = source_ops::read_source(&settings.name, self.observed_total.as_mut())?;
        let probability = source_ops::probability(
            self.masked_sum(settings, &selection)?,
            self.masked_sum(settings, &total)?,
        );
        self.runs.store(kind, probability);
        Ok(())
    }

    pub fn update_parameter(
        &self,
        settings: &TargetSettings,
        current: f32,
        sink: &dyn DiagnosticSink,
    ) -> Result<f32, TargetError> {
        let target = self
            .target_probability
            .ok_or_else(|| TargetError::NotInitialized(settings.name.clone()))?;
        let base = required(settings, self.runs, RunKind::Base)?;
        Ok(update_ops::odds_ratio_update(
            settings,
            current,
            base,
            target,
            self.parameter_is_ratio,
            sink,
        ))
    }

    pub fn report_target_distance(&self) -> Option<f32> {
        Some(self.runs.base()? - self.target_probability?)
    }

    fn masked_sum(&self, settings: &TargetSettings, matrix: &SparseZoneMatrix) -> Result<f32, TargetError> {
        match &self.mask {
            None => Ok(matrix.sum()),
            Some(mask) => {
                matrix
                    .check_zone_system(&mask.matrix)
                    .map_err(|e| matrix_error(settings, e))?;
                matrix
                    .flagged_sum(&mask.flags)
                    .map_err(|e| matrix_error(settings, e))
            }
        }
    }
}

fn matrix_error(settings: &TargetSettings, source: xtmf_calibration_core::matrix::MatrixError) -> TargetError {
    TargetError::Matrix {
        name: settings.name.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtmf_calibration_core::model::{ConstantSource, SharedSource};

    fn matrix(entries: &[(i32, i32, f32)]) -> SparseZoneMatrix {
        SparseZoneMatrix::from_entries(entries).expect("valid entries")
    }

    fn settings() -> TargetSettings {
        TargetSettings::new("transit to core", "mode.transit.core", 0.1, -10.0, 10.0)
    }

    #[test]
    fn test_mask_restricts_the_probability() {
        let everywhere = matrix(&[(1, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0), (2, 2, 1.0)]);
        let core = matrix(&[(1, 1, 0.0), (1, 2, 1.0), (2, 1, 0.0), (2, 2, 1.0)]);
        let selection = SharedSource::new("model transit");
        let total = SharedSource::new("model trips");
        let mut target = ProbabilityMatrixTarget::new(
            false,
            Box::new(ConstantSource::new("observed transit", everywhere.clone())),
            Box::new(ConstantSource::new("observed trips", matrix(&[(1, 1, 4.0), (1, 2, 4.0), (2, 1, 4.0), (2, 2, 4.0)]))),
            Box::new(selection.clone()),
            Box::new(total.clone()),
            Some(Box::new(ConstantSource::new("core mask", core))),
        );
        target.load_target(&settings()).expect("mask has cells");

        // unmasked cells are large and must not count
        selection
            .publish(matrix(&[(1, 1, 100.0), (1, 2, 2.0), (2, 1, 100.0), (2, 2, 2.0)]))
            .unwrap();
        total.publish(everywhere.clone()).unwrap();
        target.store_run(&settings(), RunKind::Base).unwrap();
        // target 2/8 = 0.25, base 4/2 = 2.0
        let distance = target.report_target_distance().unwrap();
        assert!((distance - 1.75).abs() < 1e-6, "found {distance}");
    }

    #[test]
    fn test_empty_mask_is_configuration_error() {
        let zeros = matrix(&[(1, 1, 0.0), (2, 2, 0.0)]);
        let ones = matrix(&[(1, 1, 1.0), (2, 2, 1.0)]);
        let mut target = ProbabilityMatrixTarget::new(
            false,
            Box::new(ConstantSource::new("a", ones.clone())),
            Box::new(ConstantSource::new("b", ones.clone())),
            Box::new(ConstantSource::new("c", ones.clone())),
            Box::new(ConstantSource::new("d", ones)),
            Some(Box::new(ConstantSource::new("empty mask", zeros))),
        );
        match target.load_target(&settings()) {
            Err(TargetError::InvalidConfiguration { message, .. }) => {
                assert!(message.contains("empty mask"))
            }
            other => panic!("expected a configuration error, found {other:?}"),
        }
    }

    #[test]
    fn test_mask_zone_mismatch_is_error() {
        let two_zones = matrix(&[(1, 1, 1.0), (2, 2, 1.0)]);
        let three_zones = matrix(&[(1, 1, 1.0), (2, 2, 1.0), (3, 3, 1.0)]);
        let mut target = ProbabilityMatrixTarget::new(
            true,
            Box::new(ConstantSource::new("a", three_zones.clone())),
            Box::new(ConstantSource::new("b", three_zones)),
            Box::new(ConstantSource::new("c", two_zones.clone())),
            Box::new(ConstantSource::new("d", two_zones.clone())),
            Some(Box::new(ConstantSource::new("mask", two_zones))),
        );
        assert!(matches!(
            target.load_target(&settings()),
            Err(TargetError::Matrix { .. })
        ));
    }
}

use super::{scalar_target::required, source_ops, update_ops, RunKind, RunSlots, TargetError, TargetSettings};
use crate::diagnostics::DiagnosticSink;
use xtmf_calibration_core::{matrix::SparseZoneMatrix, model::DataSource};

/// calibrates a parameter so that the total of a model output matrix reaches
/// the total of a target matrix.
pub struct MatrixTarget {
    target: Box<dyn DataSource<SparseZoneMatrix>>,
    observed: Box<dyn DataSource<SparseZoneMatrix>>,
    target_total: Option<f32>,
    runs: RunSlots<f32>,
}

impl MatrixTarget {
    pub fn new(
        target: Box<dyn DataSource<SparseZoneMatrix>>,
        observed: Box<dyn DataSource<SparseZoneMatrix>>,
    ) -> MatrixTarget {
        MatrixTarget {
            target,
            observed,
            target_total: None,
            runs: RunSlots::new(),
        }
    }

    pub fn load_target(&mut self, settings: &TargetSettings) -> Result<(), TargetError> {
        let matrix = source_ops::read_source(&settings.name, self.target.as_mut())?;
        let total = matrix.sum();
        if !total.is_finite() {
            return Err(TargetError::invalid(
                &settings.name,
                format!("target matrix '{}' sums to {total}", self.target.name()),
            ));
        }
        log::debug!(
            "target '{}' loaded matrix over {} zones totalling {total}",
            settings.name,
            matrix.len()
        );
        self.target_total = Some(total);
        Ok(())
    }

    pub fn store_run(&mut self, settings: &TargetSettings, kind: RunKind) -> Result<(), TargetError> {
        let matrix = source_ops::read_source(&settings.name, self.observed.as_mut())?;
        self.runs.store(kind, matrix.sum());
        Ok(())
    }

    pub fn update_parameter(
        &self,
        settings: &TargetSettings,
        current: f32,
        sink: &dyn DiagnosticSink,
    ) -> Result<f32, TargetError> {
        let target = self
            .target_total
            .ok_or_else(|| TargetError::NotInitialized(settings.name.clone()))?;
        let base = required(settings, self.runs, RunKind::Base)?;
        let step = required(settings, self.runs, RunKind::Step)?;
        Ok(update_ops::finite_difference_update(
            settings, current, base, step, target, sink,
        ))
    }

    pub fn report_target_distance(&self) -> Option<f32> {
        Some(self.runs.base()? - self.target_total?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use xtmf_calibration_core::model::{ConstantSource, SharedSource};

    fn matrix(scale: f32) -> SparseZoneMatrix {
        SparseZoneMatrix::from_entries(&[(1, 1, scale), (1, 2, 2.0 * scale), (2, 1, 3.0 * scale)])
            .expect("valid entries")
    }

    #[test]
    fn test_matrix_target_compares_totals() {
        let settings = TargetSettings::new("work trips", "generation.work", 0.1, -5.0, 5.0);
        let output = SharedSource::new("work matrix");
        let mut target = MatrixTarget::new(
            Box::new(ConstantSource::new("observed work", matrix(2.0))),
            Box::new(output.clone()),
        );
        target.load_target(&settings).expect("constant target");

        output.publish(matrix(1.0)).unwrap();
        target.store_run(&settings, RunKind::Base).unwrap();
        output.publish(matrix(1.1)).unwrap();
        target.store_run(&settings, RunKind::Step).unwrap();

        // totals: target 12, base 6, step 6.6; derivative 6, step 1.0 >= 0.1
        let sink = MemorySink::new();
        let next = target.update_parameter(&settings, 0.0, &sink).unwrap();
        assert!((next - 1.0).abs() < 1e-4, "found {next}");
        assert_eq!(target.report_target_distance(), Some(-6.0));
    }
}

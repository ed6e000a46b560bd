use super::{scalar_target::required, source_ops, update_ops, RunKind, RunSlots, TargetError, TargetSettings};
use crate::diagnostics::DiagnosticSink;
use xtmf_calibration_core::model::DataSource;

/// calibrates a parameter so that the share `selection / total` of a model
/// output reaches an observed share.
///
/// the update is an odds ratio step and only needs the base run; step runs
/// are stored but do not enter the update.
pub struct ProbabilityTarget {
    parameter_is_ratio: bool,
    target_selection: Box<dyn DataSource<f32>>,
    target_total: Box<dyn DataSource<f32>>,
    observed_selection: Box<dyn DataSource<f32>>,
    observed_total: Box<dyn DataSource<f32>>,
    target_probability: Option<f32>,
    runs: RunSlots<f32>,
}

impl ProbabilityTarget {
    pub fn new(
        parameter_is_ratio: bool,
        target_selection: Box<dyn DataSource<f32>>,
        target_total: Box<dyn DataSource<f32>>,
        observed_selection: Box<dyn DataSource<f32>>,
        observed_total: Box<dyn DataSource<f32>>,
    ) -> ProbabilityTarget {
        ProbabilityTarget {
            parameter_is_ratio,
            target_selection,
            target_total,
            observed_selection,
            observed_total,
            target_probability: None,
            runs: RunSlots::new(),
        }
    }

    pub fn load_target(&mut self, settings: &TargetSettings) -> Result<(), TargetError> {
        let selection = source_ops::read_source(&settings.name, self.target_selection.as_mut())?;
        let total = source_ops::read_source(&settings.name, self.target_total.as_mut())?;
        let probability = source_ops::probability(selection, total);
        if !probability.is_finite() {
            return Err(TargetError::invalid(
                &settings.name,
                format!("target probability {selection} / {total} is not finite"),
            ));
        }
        self.target_probability = Some(probability);
        Ok(())
    }

    pub fn store_run(&mut self, settings: &TargetSettings, kind: RunKind) -> Result<(), TargetError> {
        let selection = source_ops::read_source(&settings.name, self.observed_selection.as_mut())?;
        let total = source_ops::read_source(&settings.name, self.observed_total.as_mut())?;
        self.runs.store(kind, source_ops::probability(selection, total));
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticKind, MemorySink};
    use xtmf_calibration_core::model::{ConstantSource, SharedSource};

    fn target(selection: SharedSource<f32>, total: SharedSource<f32>) -> ProbabilityTarget {
        ProbabilityTarget::new(
            false,
            Box::new(ConstantSource::new("transit share", 30.0)),
            Box::new(ConstantSource::new("all trips", 100.0)),
            Box::new(selection),
            Box::new(total),
        )
    }

    #[test]
    fn test_probability_target_moves_toward_observed_share() {
        let settings = TargetSettings::new("transit", "mode.transit.constant", 0.1, -10.0, 10.0);
        let selection = SharedSource::new("model transit");
        let total = SharedSource::new("model trips");
        let mut target = target(selection.clone(), total.clone());
        target.load_target(&settings).unwrap();

        selection.publish(20.0).unwrap();
        total.publish(100.0).unwrap();
        target.store_run(&settings, RunKind::Base).unwrap();

        let sink = MemorySink::new();
        let next = target.update_parameter(&settings, 0.0, &sink).unwrap();
        let expected = ((0.3f32 / 0.7) / (0.2 / 0.8)).ln();
        assert!((next - expected).abs() < 1e-5);
        assert!(next > 0.0, "under-predicted share raises the constant");
        let distance = target.report_target_distance().unwrap();
        assert!((distance + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_zero_model_total_is_a_no_op() {
        let settings = TargetSettings::new("transit", "mode.transit.constant", 0.1, -10.0, 10.0);
        let selection = SharedSource::new("model transit");
        let total = SharedSource::new("model trips");
        let mut target = target(selection.clone(), total.clone());
        target.load_target(&settings).unwrap();

        selection.publish(0.0).unwrap();
        total.publish(0.0).unwrap();
        target.store_run(&settings, RunKind::Base).unwrap();

        let sink = MemorySink::new();
        assert_eq!(target.update_parameter(&settings, 0.7, &sink).unwrap(), 0.7);
        assert_eq!(sink.count("transit", DiagnosticKind::NonFiniteUpdate), 1);
    }

    #[test]
    fn test_zero_target_total_is_configuration_error() {
        let settings = TargetSettings::new("transit", "mode.transit.constant", 0.1, -10.0, 10.0);
        let mut target = ProbabilityTarget::new(
            false,
            Box::new(ConstantSource::new("transit share", 30.0)),
            Box::new(ConstantSource::new("all trips", 0.0)),
            Box::new(ConstantSource::new("model transit", 1.0)),
            Box::new(ConstantSource::new("model trips", 1.0)),
        );
        assert!(matches!(
            target.load_target(&settings),
            Err(TargetError::InvalidConfiguration { .. })
        ));
    }
}

use super::{source_ops, update_ops, RunKind, RunSlots, TargetError, TargetSettings};
use crate::diagnostics::DiagnosticSink;
use xtmf_calibration_core::model::DataSource;

/// calibrates a parameter so that a single model output reaches a target value.
pub struct ScalarTarget {
    target: Box<dyn DataSource<f32>>,
    observed: Box<dyn DataSource<f32>>,
    target_value: Option<f32>,
    runs: RunSlots<f32>,
}

impl ScalarTarget {
    pub fn new(target: Box<dyn DataSource<f32>>, observed: Box<dyn DataSource<f32>>) -> ScalarTarget {
        ScalarTarget {
            target,
            observed,
            target_value: None,
            runs: RunSlots::new(),
        }
    }

    pub fn load_target(&mut self, settings: &TargetSettings) -> Result<(), TargetError> {
        let value = source_ops::read_source(&settings.name, self.target.as_mut())?;
        if !value.is_finite() {
            return Err(TargetError::invalid(
                &settings.name,
                format!("target value from '{}' is {value}", self.target.name()),
            ));
        }
        self.target_value = Some(value);
        Ok(())
    }

    pub fn store_run(&mut self, settings: &TargetSettings, kind: RunKind) -> Result<(), TargetError> {
        let value = source_ops::read_source(&settings.name, self.observed.as_mut())?;
        self.runs.store(kind, value);
        Ok(())
    }

    pub fn update_parameter(
        &self,
        settings: &TargetSettings,
        current: f32,
        sink: &dyn DiagnosticSink,
    ) -> Result<f32, TargetError> {
        let target = self.target_value(settings)?;
        let base = required(settings, self.runs, RunKind::Base)?;
        let step = required(settings, self.runs, RunKind::Step)?;
        Ok(update_ops::finite_difference_update(
            settings, current, base, step, target, sink,
        ))
    }

    pub fn report_target_distance(&self) -> Option<f32> {
        Some(self.runs.base()? - self.target_value?)
    }

    fn target_value(&self, settings: &TargetSettings) -> Result<f32, TargetError> {
        self.target_value
            .ok_or_else(|| TargetError::NotInitialized(settings.name.clone()))
    }
}

/// the stored measurement of `kind`, or a `MissingRun` error.
pub(super) fn required(
    settings: &TargetSettings,
    runs: RunSlots<f32>,
    kind: RunKind,
) -> Result<f32, TargetError> {
    runs.get(kind).ok_or_else(|| TargetError::MissingRun {
        name: settings.name.clone(),
        kind,
    })
}

use super::{
    MatrixTarget, ProbabilityMatrixTarget, ProbabilityTarget, RunKind, ScalarTarget, TargetError,
    TargetSettings,
};
use crate::diagnostics::DiagnosticSink;
use xtmf_calibration_core::parameter::{
    ParameterError, ParameterHandle, ParameterRegistry, ParameterSetting,
};

/// the closed set of measurement rules a target can use.
pub enum TargetKind {
    Scalar(ScalarTarget),
    Matrix(MatrixTarget),
    Probability(ProbabilityTarget),
    ProbabilityMatrix(ProbabilityMatrixTarget),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    Uninitialized,
    Ready,
}

/// one calibration objective bound to one model parameter (and its aliases).
pub struct CalibrationTarget {
    settings: TargetSettings,
    kind: TargetKind,
    handles: Vec<ParameterHandle>,
    state: TargetState,
}

impl CalibrationTarget {
    pub fn new(settings: TargetSettings, kind: TargetKind) -> CalibrationTarget {
        CalibrationTarget {
            settings,
            kind,
            handles: vec![],
            state: TargetState::Uninitialized,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &TargetSettings {
        &self.settings
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    /// resolves the parameter path and aliases, checks the parameter is
    /// numeric, then loads the target once. calling it again on a ready
    /// target does nothing.
    pub fn initialize(&mut self, registry: &ParameterRegistry) -> Result<(), TargetError> {
        if self.state == TargetState::Ready {
            return Ok(());
        }
        self.settings
            .validate()
            .map_err(|message| TargetError::invalid(&self.settings.name, message))?;
        let handles = self
            .settings
            .parameter_paths()
            .iter()
            .map(|path| registry.find_parameter(path))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.parameter_error(e))?;
        for handle in handles.iter() {
            handle.read_f32().map_err(|e| self.parameter_error(e))?;
        }
        self.handles = handles;

        let settings = &self.settings;
        match &mut self.kind {
            TargetKind::Scalar(t) => t.load_target(settings)?,
            TargetKind::Matrix(t) => t.load_target(settings)?,
            TargetKind::Probability(t) => t.load_target(settings)?,
            TargetKind::ProbabilityMatrix(t) => t.load_target(settings)?,
        }
        self.state = TargetState::Ready;
        log::debug!(
            "target '{}' bound to {}",
            self.settings.name,
            self.settings.parameter_paths().join(", ")
        );
        Ok(())
    }

    /// reads the live value of the primary parameter.
    pub fn get_parameter_value(&self) -> Result<f32, TargetError> {
        let handle = self.primary_handle()?;
        handle.read_f32().map_err(|e| self.parameter_error(e))
    }

    /// writes `value` to every bound parameter for the next run only.
    pub fn set_parameter_value(&self, value: f32) -> Result<(), TargetError> {
        self.ready()?;
        for handle in self.handles.iter() {
            handle
                .assign_value_run_only(value)
                .map_err(|e| self.parameter_error(e))?;
        }
        Ok(())
    }

    /// writes `value` to every bound parameter and marks it for saving.
    pub fn set_parameter_and_save(&self, value: f32) -> Result<(), TargetError> {
        self.ready()?;
        for handle in self.handles.iter() {
            handle.assign_value(value).map_err(|e| self.parameter_error(e))?;
        }
        Ok(())
    }

    /// the starting point of this target in the calibration position.
    pub fn parameter_setting(&self) -> Result<ParameterSetting, TargetError> {
        Ok(ParameterSetting::new(
            self.settings.parameter_paths(),
            self.get_parameter_value()?,
            self.settings.minimum_value,
            self.settings.maximum_value,
        ))
    }

    /// measures the model output of the run that just finished.
    pub fn store_run(&mut self, kind: RunKind) -> Result<(), TargetError> {
        self.ready()?;
        let settings = &self.settings;
        match &mut self.kind {
            TargetKind::Scalar(t) => t.store_run(settings, kind),
            TargetKind::Matrix(t) => t.store_run(settings, kind),
            TargetKind::Probability(t) => t.store_run(settings, kind),
            TargetKind::ProbabilityMatrix(t) => t.store_run(settings, kind),
        }
    }

    /// the next value of this target's parameter given its stored runs.
    pub fn update_parameter(&self, current: f32, sink: &dyn DiagnosticSink) -> Result<f32, TargetError> {
        self.ready()?;
        let settings = &self.settings;
        match &self.kind {
            TargetKind::Scalar(t) => t.update_parameter(settings, current, sink),
            TargetKind::Matrix(t) => t.update_parameter(settings, current, sink),
            TargetKind::Probability(t) => t.update_parameter(settings, current, sink),
            TargetKind::ProbabilityMatrix(t) => t.update_parameter(settings, current, sink),
        }
    }

    /// base measurement minus target, once a base run is stored.
    pub fn report_target_distance(&self) -> Option<f32> {
        match &self.kind {
            TargetKind::Scalar(t) => t.report_target_distance(),
            TargetKind::Matrix(t) => t.report_target_distance(),
            TargetKind::Probability(t) => t.report_target_distance(),
            TargetKind::ProbabilityMatrix(t) => t.report_target_distance(),
        }
    }

    fn ready(&self) -> Result<(), TargetError> {
        match self.state {
            TargetState::Ready => Ok(()),
            TargetState::Uninitialized => Err(TargetError::NotInitialized(self.settings.name.clone())),
        }
    }

    fn primary_handle(&self) -> Result<&ParameterHandle, TargetError> {
        self.ready()?;
        self.handles
            .first()
            .ok_or_else(|| TargetError::NotInitialized(self.settings.name.clone()))
    }

    fn parameter_error(&self, source: ParameterError) -> TargetError {
        TargetError::Parameter {
            name: self.settings.name.clone(),
            source,
        }
    }
}

use super::ModelSystemError;
use crate::parameter::ParameterRegistry;
use std::sync::Arc;

/// asks a model to stop from any thread, including while it is running.
/// returns true if the request was accepted.
pub type ExitHook = Arc<dyn Fn() -> bool + Send + Sync>;

/// the expensive external model being calibrated.
///
/// parameters are written through the handles in [`ModelSystem::parameters`]
/// before each call to [`ModelSystem::run`]; results are read afterwards by
/// data sources, not returned from the run.
pub trait ModelSystem: Send {
    fn name(&self) -> &str;

    fn parameters(&self) -> &ParameterRegistry;

    /// runs the model to completion with the currently assigned parameters.
    fn run(&mut self) -> Result<(), ModelSystemError>;

    /// persists every value assigned through a saving assignment.
    fn save_configuration(&mut self) -> Result<(), ModelSystemError>;

    /// asks a running model to stop early. returns true if the request was
    /// accepted; the default implementation has nothing to interrupt.
    fn exit_request(&self) -> bool {
        true
    }

    /// a hook that reaches this model while [`ModelSystem::run`] holds it
    /// mutably borrowed. models without one only see requests made between
    /// runs.
    fn exit_hook(&self) -> Option<ExitHook> {
        None
    }
}

/// a unit of work run once before or after calibration.
pub trait SelfContainedModule: Send {
    fn name(&self) -> &str;

    fn start(&mut self) -> Result<(), ModelSystemError>;
}

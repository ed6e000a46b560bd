use super::ParameterError;
use std::sync::{Arc, RwLock};

/// a numeric model parameter holding the value used by the next run and the
/// value that would be written out when the configuration is saved.
#[derive(Debug)]
pub struct ParameterCell {
    run_value: RwLock<f32>,
    saved_value: RwLock<f32>,
}

impl ParameterCell {
    pub fn new(value: f32) -> Arc<ParameterCell> {
        Arc::new(ParameterCell {
            run_value: RwLock::new(value),
            saved_value: RwLock::new(value),
        })
    }

    pub fn run_value(&self, path: &str) -> Result<f32, ParameterError> {
        self.run_value
            .read()
            .map(|v| *v)
            .map_err(|_| ParameterError::Poisoned(path.to_string()))
    }

    pub fn saved_value(&self, path: &str) -> Result<f32, ParameterError> {
        self.saved_value
            .read()
            .map(|v| *v)
            .map_err(|_| ParameterError::Poisoned(path.to_string()))
    }

    pub fn assign_run_only(&self, path: &str, value: f32) -> Result<(), ParameterError> {
        let mut run = self
            .run_value
            .write()
            .map_err(|_| ParameterError::Poisoned(path.to_string()))?;
        *run = value;
        Ok(())
    }

    pub fn assign(&self, path: &str, value: f32) -> Result<(), ParameterError> {
        self.assign_run_only(path, value)?;
        let mut saved = self
            .saved_value
            .write()
            .map_err(|_| ParameterError::Poisoned(path.to_string()))?;
        *saved = value;
        Ok(())
    }
}

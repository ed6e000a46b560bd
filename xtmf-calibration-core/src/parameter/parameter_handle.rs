use super::{ParameterBinding, ParameterError};

/// a resolved parameter path.
#[derive(Clone)]
pub struct ParameterHandle {
    path: String,
    binding: ParameterBinding,
}

impl std::fmt::Debug for ParameterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterHandle")
            .field("path", &self.path)
            .finish()
    }
}

impl ParameterHandle {
    pub fn new(path: &str, binding: ParameterBinding) -> ParameterHandle {
        ParameterHandle {
            path: path.to_string(),
            binding,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn read_value(&self) -> Result<serde_json::Value, ParameterError> {
        (self.binding.read)()
    }

    /// reads the value as an `f32`. numbers and numeric strings convert,
    /// anything else is a [`ParameterError::NonNumeric`].
    pub fn read_f32(&self) -> Result<f32, ParameterError> {
        let value = self.read_value()?;
        let parsed = match &value {
            serde_json::Value::Number(n) => n.as_f64().map(|v| v as f32),
            serde_json::Value::String(s) => s.trim().parse::<f32>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ParameterError::NonNumeric {
            path: self.path.clone(),
            value: value.to_string(),
        })
    }

    pub fn assign_value_run_only(&self, value: f32) -> Result<(), ParameterError> {
        (self.binding.assign_run_only)(value)
    }

    pub fn assign_value(&self, value: f32) -> Result<(), ParameterError> {
        (self.binding.assign)(value)
    }
}

use serde::{Deserialize, Serialize};

/// the knobs shared by every target kind.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TargetSettings {
    /// used in the report header and to tag diagnostics.
    pub name: String,
    /// dot-delimited path of the calibrated parameter.
    pub parameter_path: String,
    /// additional parameter paths that receive every write.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    pub explore_size: f32,
    pub minimum_value: f32,
    pub maximum_value: f32,
    #[serde(default = "default_maximum_change")]
    pub maximum_change: f32,
    #[serde(default = "default_minimum_absolute_derivative")]
    pub minimum_absolute_derivative: f32,
}

fn default_learning_rate() -> f32 {
    1.0
}

fn default_maximum_change() -> f32 {
    f32::MAX
}

fn default_minimum_absolute_derivative() -> f32 {
    0.0001
}

impl TargetSettings {
    pub fn new(
        name: &str,
        parameter_path: &str,
        explore_size: f32,
        minimum_value: f32,
        maximum_value: f32,
    ) -> TargetSettings {
        TargetSettings {
            name: name.to_string(),
            parameter_path: parameter_path.to_string(),
            aliases: vec![],
            learning_rate: default_learning_rate(),
            explore_size,
            minimum_value,
            maximum_value,
            maximum_change: default_maximum_change(),
            minimum_absolute_derivative: default_minimum_absolute_derivative(),
        }
    }

    /// every parameter path written by this target, primary path first.
    pub fn parameter_paths(&self) -> Vec<String> {
        std::iter::once(self.parameter_path.clone())
            .chain(self.aliases.iter().cloned())
            .collect()
    }

    /// checks the settings before any model run. returns a message naming the
    /// offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.parameter_path.trim().is_empty() {
            return Err(String::from("parameter_path must not be empty"));
        }
        if !self.minimum_value.is_finite() || !self.maximum_value.is_finite() {
            return Err(String::from("minimum_value and maximum_value must be finite"));
        }
        if self.maximum_value < self.minimum_value {
            return Err(format!(
                "maximum_value {} is less than minimum_value {}",
                self.maximum_value, self.minimum_value
            ));
        }
        if self.maximum_change.is_nan() || self.maximum_change <= 0.0 {
            return Err(format!(
                "maximum_change must be positive, found {}",
                self.maximum_change
            ));
        }
        if !self.explore_size.is_finite() || self.explore_size == 0.0 {
            return Err(format!(
                "explore_size must be finite and non-zero, found {}",
                self.explore_size
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, found {}",
                self.learning_rate
            ));
        }
        if self.minimum_absolute_derivative.is_nan() || self.minimum_absolute_derivative < 0.0 {
            return Err(format!(
                "minimum_absolute_derivative must not be negative, found {}",
                self.minimum_absolute_derivative
            ));
        }
        Ok(())
    }
}

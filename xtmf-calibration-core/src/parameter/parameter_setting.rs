use serde::{Deserialize, Serialize};

/// one calibratable scalar: its current value, bounds, and the parameter
/// names (aliases) that receive it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ParameterSetting {
    pub current: f32,
    pub minimum: f32,
    pub maximum: f32,
    pub names: Vec<String>,
    /// the value the parameter held before calibration began.
    pub null_hypothesis: f32,
}

impl ParameterSetting {
    pub fn new(names: Vec<String>, current: f32, minimum: f32, maximum: f32) -> ParameterSetting {
        ParameterSetting {
            current,
            minimum,
            maximum,
            names,
            null_hypothesis: current,
        }
    }

    /// a full copy of this setting with `offset` added to the current value.
    pub fn with_offset(&self, offset: f32) -> ParameterSetting {
        ParameterSetting {
            current: self.current + offset,
            ..self.clone()
        }
    }

    /// the primary parameter name, or an empty string when unnamed.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// distance moved from the pre-calibration value.
    pub fn change_from_null_hypothesis(&self) -> f32 {
        self.current - self.null_hypothesis
    }
}

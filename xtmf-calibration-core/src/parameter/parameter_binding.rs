use super::{ParameterCell, ParameterError};
use std::sync::Arc;

pub type ParameterReader = Arc<dyn Fn() -> Result<serde_json::Value, ParameterError> + Send + Sync>;
pub type ParameterWriter = Arc<dyn Fn(f32) -> Result<(), ParameterError> + Send + Sync>;

/// getter and setters wiring one parameter path to a live model value.
/// `assign_run_only` affects the next model run; `assign` also persists.
#[derive(Clone)]
pub struct ParameterBinding {
    pub read: ParameterReader,
    pub assign_run_only: ParameterWriter,
    pub assign: ParameterWriter,
}

impl ParameterBinding {
    pub fn new(
        read: ParameterReader,
        assign_run_only: ParameterWriter,
        assign: ParameterWriter,
    ) -> ParameterBinding {
        ParameterBinding {
            read,
            assign_run_only,
            assign,
        }
    }

    /// binds to a numeric [`ParameterCell`].
    pub fn from_cell(path: &str, cell: Arc<ParameterCell>) -> ParameterBinding {
        let (reader, run_cell, save_cell) = (cell.clone(), cell.clone(), cell);
        let (read_path, run_path, save_path) = (path.to_string(), path.to_string(), path.to_string());
        ParameterBinding {
            read: Arc::new(move || -> Result<serde_json::Value, ParameterError> {
                let value = reader.run_value(&read_path)?;
                Ok(serde_json::json![value])
            }),
            assign_run_only: Arc::new(move |v: f32| run_cell.assign_run_only(&run_path, v)),
            assign: Arc::new(move |v: f32| save_cell.assign(&save_path, v)),
        }
    }
}

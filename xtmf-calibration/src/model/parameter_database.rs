use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use xtmf_calibration_core::{
    model::ModelSystemError,
    parameter::{ParameterBinding, ParameterCell, ParameterError, ParameterRegistry},
};

#[derive(Serialize, Deserialize, Debug)]
struct ParameterRow {
    name: String,
    value: String,
}

/// one row of a parameter database. values that do not parse as numbers are
/// carried through unchanged and cannot be calibrated.
#[derive(Clone, Debug)]
pub enum ParameterEntry {
    Numeric(Arc<ParameterCell>),
    Text(String),
}

/// model parameters kept in a `name,value` csv file.
///
/// run-only writes are exported to a run file before each model run; saving
/// writes the saved values back to the database file.
#[derive(Clone, Debug)]
pub struct ParameterDatabase {
    path: PathBuf,
    entries: Vec<(String, ParameterEntry)>,
}

impl ParameterDatabase {
    pub fn read(path: &Path) -> Result<ParameterDatabase, ModelSystemError> {
        let io_error = |e: csv::Error| ModelSystemError::Io {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(io_error)?;
        let mut entries = vec![];
        for row in reader.deserialize::<ParameterRow>() {
            let row = row.map_err(io_error)?;
            let entry = match row.value.parse::<f32>() {
                Ok(value) => ParameterEntry::Numeric(ParameterCell::new(value)),
                Err(_) => ParameterEntry::Text(row.value),
            };
            entries.push((row.name, entry));
        }
        log::info!(
            "read {} parameters from {}",
            entries.len(),
            path.display()
        );
        Ok(ParameterDatabase {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[(String, ParameterEntry)] {
        &self.entries
    }

    /// a registry binding every entry under its name.
    pub fn registry(&self) -> Result<ParameterRegistry, ParameterError> {
        let mut registry = ParameterRegistry::new();
        for (name, entry) in self.entries.iter() {
            match entry {
                ParameterEntry::Numeric(cell) => registry.register_cell(name, cell.clone())?,
                ParameterEntry::Text(text) => registry.register(name, text_binding(name, text))?,
            }
        }
        Ok(registry)
    }

    /// writes the values the next run should use.
    pub fn write_run_values(&self, path: &Path) -> Result<(), ModelSystemError> {
        self.write(path, |name, cell| cell.run_value(name))
    }

    /// writes the saved values back to the database file.
    pub fn save(&self) -> Result<(), ModelSystemError> {
        self.write(&self.path, |name, cell| cell.saved_value(name))
    }

    fn write<F>(&self, path: &Path, value_of: F) -> Result<(), ModelSystemError>
    where
        F: Fn(&str, &ParameterCell) -> Result<f32, ParameterError>,
    {
        let io_error = |e: csv::Error| ModelSystemError::Io {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        };
        let mut writer = csv::Writer::from_path(path).map_err(io_error)?;
        for (name, entry) in self.entries.iter() {
            let value = match entry {
                ParameterEntry::Numeric(cell) => value_of(name.as_str(), cell.as_ref())?.to_string(),
                ParameterEntry::Text(text) => text.clone(),
            };
            writer
                .serialize(ParameterRow {
                    name: name.clone(),
                    value,
                })
                .map_err(io_error)?;
        }
        writer.flush().map_err(|e| ModelSystemError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// a read-only binding for a non-numeric value.
fn text_binding(name: &str, text: &str) -> ParameterBinding {
    let value = text.to_string();
    let refuse = |path: String| {
        Arc::new(move |v: f32| -> Result<(), ParameterError> {
            Err(ParameterError::AssignmentFailed {
                path: path.clone(),
                value: v,
                message: String::from("parameter is not numeric"),
            })
        })
    };
    ParameterBinding::new(
        Arc::new(move || -> Result<serde_json::Value, ParameterError> {
            Ok(serde_json::Value::String(value.clone()))
        }),
        refuse(name.to_string()),
        refuse(name.to_string()),
    )
}

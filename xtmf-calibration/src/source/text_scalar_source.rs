use std::path::{Path, PathBuf};
use xtmf_calibration_core::model::{DataSource, DataSourceError};

/// a single number written to a text file by the model.
#[derive(Clone, Debug)]
pub struct TextScalarSource {
    name: String,
    path: PathBuf,
    value: Option<f32>,
}

impl TextScalarSource {
    pub fn new(name: &str, path: &Path) -> TextScalarSource {
        TextScalarSource {
            name: name.to_string(),
            path: path.to_path_buf(),
            value: None,
        }
    }

    fn read_failed(&self, message: String) -> DataSourceError {
        DataSourceError::ReadFailed {
            name: self.name.clone(),
            path: self.path.display().to_string(),
            message,
        }
    }
}

impl DataSource<f32> for TextScalarSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_data(&mut self) -> Result<(), DataSourceError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| self.read_failed(e.to_string()))?;
        let value = contents
            .trim()
            .parse::<f32>()
            .map_err(|e| self.read_failed(format!("'{}' is not a number: {e}", contents.trim())))?;
        self.value = Some(value);
        Ok(())
    }

    fn give_data(&self) -> Result<f32, DataSourceError> {
        self.value
            .ok_or_else(|| DataSourceError::NotLoaded(self.name.clone()))
    }

    fn unload_data(&mut self) {
        self.value = None;
    }

    fn loaded(&self) -> bool {
        self.value.is_some()
    }
}

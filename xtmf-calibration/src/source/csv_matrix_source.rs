use itertools::Itertools;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use xtmf_calibration_core::{
    matrix::SparseZoneMatrix,
    model::{DataSource, DataSourceError},
};

#[derive(Deserialize, Debug)]
struct MatrixRow {
    origin: i32,
    destination: i32,
    value: f32,
}

/// a zone matrix stored as `origin,destination,value` rows. cells not listed
/// are zero; the zone system is every zone that appears.
#[derive(Clone, Debug)]
pub struct CsvMatrixSource {
    name: String,
    path: PathBuf,
    matrix: Option<SparseZoneMatrix>,
}

impl CsvMatrixSource {
    pub fn new(name: &str, path: &Path) -> CsvMatrixSource {
        CsvMatrixSource {
            name: name.to_string(),
            path: path.to_path_buf(),
            matrix: None,
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

impl DataSource<SparseZoneMatrix> for CsvMatrixSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_data(&mut self) -> Result<(), DataSourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.read_failed(e.to_string()))?;
        let entries = reader
            .deserialize::<MatrixRow>()
            .map_ok(|row| (row.origin, row.destination, row.value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.read_failed(e.to_string()))?;
        let matrix = SparseZoneMatrix::from_entries(&entries)?;
        log::debug!(
            "read matrix '{}' with {} zones from {}",
            self.name,
            matrix.len(),
            self.path.display()
        );
        self.matrix = Some(matrix);
        Ok(())
    }

    fn give_data(&self) -> Result<SparseZoneMatrix, DataSourceError> {
        self.matrix
            .clone()
            .ok_or_else(|| DataSourceError::NotLoaded(self.name.clone()))
    }

    fn unload_data(&mut self) {
        self.matrix = None;
    }

    fn loaded(&self) -> bool {
        self.matrix.is_some()
    }
}

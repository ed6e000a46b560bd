use std::path::{Path, PathBuf};
use xtmf_calibration_core::{
    kernel,
    model::{DataSource, DataSourceError},
};

/// the total of one named column of a csv file with a header row.
#[derive(Clone, Debug)]
pub struct CsvColumnSource {
    name: String,
    path: PathBuf,
    column: String,
    value: Option<f32>,
}

impl CsvColumnSource {
    pub fn new(name: &str, path: &Path, column: &str) -> CsvColumnSource {
        CsvColumnSource {
            name: name.to_string(),
            path: path.to_path_buf(),
            column: column.to_string(),
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

    fn read_column(&self) -> Result<Vec<f32>, DataSourceError> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| self.read_failed(e.to_string()))?;
        let headers = reader
            .headers()
            .map_err(|e| self.read_failed(e.to_string()))?;
        let index = headers
            .iter()
            .position(|h| h.trim() == self.column)
            .ok_or_else(|| self.read_failed(format!("no column '{}'", self.column)))?;
        let mut values = vec![];
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| self.read_failed(e.to_string()))?;
            let cell = record.get(index).unwrap_or_default().trim();
            let value = cell.parse::<f32>().map_err(|e| {
                self.read_failed(format!("row {row}: '{cell}' is not a number: {e}"))
            })?;
            values.push(value);
        }
        Ok(values)
    }
}

impl DataSource<f32> for CsvColumnSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_data(&mut self) -> Result<(), DataSourceError> {
        let values = self.read_column()?;
        self.value = Some(kernel::sum_slice(&values));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_named_column() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("trips.csv");
        std::fs::write(&path, "zone,auto,transit\n1,10,2.5\n2,20,0.5\n").unwrap();
        let mut source = CsvColumnSource::new("transit trips", &path, "transit");
        source.load_data().expect("valid file");
        assert_eq!(source.give_data().unwrap(), 3.0);
        source.unload_data();
        assert!(!source.loaded());

        let mut missing = CsvColumnSource::new("walk trips", &path, "walk");
        assert!(matches!(
            missing.load_data(),
            Err(DataSourceError::ReadFailed { .. })
        ));
    }
}

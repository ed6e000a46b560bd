use super::CalibrationError;
use itertools::Itertools;
use std::{fs::OpenOptions, path::{Path, PathBuf}};

/// the per-iteration csv report. rows are only ever appended; the header is
/// written with iteration 0.
#[derive(Clone, Debug)]
pub struct CalibrationReport {
    path: PathBuf,
}

impl CalibrationReport {
    pub fn new(path: &Path) -> CalibrationReport {
        CalibrationReport {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Iteration,TargetDistance-<name>...,Value-<name>...`
    pub fn header(target_names: &[&str]) -> Vec<String> {
        std::iter::once(String::from("Iteration"))
            .chain(target_names.iter().map(|n| format!("TargetDistance-{n}")))
            .chain(target_names.iter().map(|n| format!("Value-{n}")))
            .collect_vec()
    }

    /// appends the row of `iteration`, preceded by the header when `iteration` is 0.
    /// a target without a base run yet has an empty distance cell.
    pub fn append(
        &self,
        iteration: usize,
        target_names: &[&str],
        distances: &[Option<f32>],
        values: &[f32],
    ) -> Result<(), CalibrationError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.error(e.to_string()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if iteration == 0 {
            writer
                .write_record(CalibrationReport::header(target_names))
                .map_err(|e| self.error(e.to_string()))?;
        }
        let row = std::iter::once(iteration.to_string())
            .chain(
                distances
                    .iter()
                    .map(|d| d.map(|v| v.to_string()).unwrap_or_default()),
            )
            .chain(values.iter().map(|v| v.to_string()))
            .collect_vec();
        writer
            .write_record(row)
            .map_err(|e| self.error(e.to_string()))?;
        writer.flush().map_err(|e| self.error(e.to_string()))?;
        Ok(())
    }

    fn error(&self, message: String) -> CalibrationError {
        CalibrationError::ReportFailed {
            path: self.path.display().to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = CalibrationReport::new(&dir.path().join("calibration.csv"));
        let names = ["auto", "transit"];
        report
            .append(0, &names, &[Some(-1.5), Some(0.25)], &[0.5, -1.0])
            .expect("report is writable");
        report
            .append(1, &names, &[Some(-0.5), None], &[0.75, -1.0])
            .expect("report is writable");
        let contents = std::fs::read_to_string(report.path()).expect("report exists");
        let lines = contents.lines().collect_vec();
        assert_eq!(
            lines,
            vec![
                "Iteration,TargetDistance-auto,TargetDistance-transit,Value-auto,Value-transit",
                "0,-1.5,0.25,0.5,-1",
                "1,-0.5,,0.75,-1",
            ]
        );
    }

    #[test]
    fn test_unwritable_report_is_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = CalibrationReport::new(&dir.path().join("missing").join("calibration.csv"));
        assert!(matches!(
            report.append(0, &["auto"], &[None], &[0.0]),
            Err(CalibrationError::ReportFailed { .. })
        ));
    }
}

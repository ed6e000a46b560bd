use crate::source::{CsvColumnSource, CsvMatrixSource, TextScalarSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use xtmf_calibration_core::{
    matrix::SparseZoneMatrix,
    model::{ConstantSource, DataSource},
};

/// where a target reads a single number from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ScalarSourceConfig {
    Constant { value: f32 },
    /// a text file holding one number.
    Text { file: String },
    /// the total of one column of a csv file.
    CsvColumn { file: String, column: String },
}

/// where a target reads a zone matrix from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MatrixSourceConfig {
    /// `origin,destination,value` rows.
    Csv { file: String },
}

impl ScalarSourceConfig {
    pub fn build(&self, name: &str, base_directory: &Path) -> Box<dyn DataSource<f32>> {
        match self {
            ScalarSourceConfig::Constant { value } => Box::new(ConstantSource::new(name, *value)),
            ScalarSourceConfig::Text { file } => {
                Box::new(TextScalarSource::new(name, &base_directory.join(file)))
            }
            ScalarSourceConfig::CsvColumn { file, column } => Box::new(CsvColumnSource::new(
                name,
                &base_directory.join(file),
                column,
            )),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ScalarSourceConfig::Constant { value } if !value.is_finite() => {
                Err(format!("constant value {value} is not finite"))
            }
            ScalarSourceConfig::Text { file } | ScalarSourceConfig::CsvColumn { file, .. }
                if file.trim().is_empty() =>
            {
                Err(String::from("source file must not be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl MatrixSourceConfig {
    pub fn build(&self, name: &str, base_directory: &Path) -> Box<dyn DataSource<SparseZoneMatrix>> {
        match self {
            MatrixSourceConfig::Csv { file } => {
                Box::new(CsvMatrixSource::new(name, &base_directory.join(file)))
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            MatrixSourceConfig::Csv { file } if file.trim().is_empty() => {
                Err(String::from("matrix file must not be empty"))
            }
            _ => Ok(()),
        }
    }
}

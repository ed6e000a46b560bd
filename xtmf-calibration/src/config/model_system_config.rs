use crate::model::{CommandModelSystem, ParameterDatabase};
use serde::{Deserialize, Serialize};
use std::path::Path;
use xtmf_calibration_core::model::ModelSystemError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ModelSystemConfig {
    /// an external program reading its parameters from a csv run file.
    Command {
        #[serde(default = "default_model_name")]
        name: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_directory: Option<String>,
        /// `name,value` csv of every model parameter. saved values are written back here.
        parameter_database: String,
        /// file written with the run values before each run.
        run_parameter_file: String,
    },
}

fn default_model_name() -> String {
    String::from("model system")
}

impl ModelSystemConfig {
    pub fn name(&self) -> &str {
        match self {
            ModelSystemConfig::Command { name, .. } => name,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ModelSystemConfig::Command {
                program,
                parameter_database,
                run_parameter_file,
                ..
            } => {
                if program.trim().is_empty() {
                    Err(String::from("program must not be empty"))
                } else if parameter_database.trim().is_empty() {
                    Err(String::from("parameter_database must not be empty"))
                } else if run_parameter_file.trim().is_empty() {
                    Err(String::from("run_parameter_file must not be empty"))
                } else if parameter_database == run_parameter_file {
                    Err(String::from(
                        "run_parameter_file must differ from parameter_database",
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// reads the parameter database and builds the model system.
    pub fn build(&self, base_directory: &Path) -> Result<CommandModelSystem, ModelSystemError> {
        match self {
            ModelSystemConfig::Command {
                name,
                program,
                args,
                working_directory,
                parameter_database,
                run_parameter_file,
            } => {
                let database = ParameterDatabase::read(&base_directory.join(parameter_database))?;
                CommandModelSystem::new(
                    name,
                    program,
                    args.clone(),
                    working_directory.as_ref().map(|d| base_directory.join(d)),
                    database,
                    &base_directory.join(run_parameter_file),
                )
            }
        }
    }
}

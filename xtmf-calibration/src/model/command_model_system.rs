use super::{command_ops, ParameterDatabase};
use std::path::{Path, PathBuf};
use xtmf_calibration_core::{
    model::{ModelSystem, ModelSystemError},
    parameter::ParameterRegistry,
};

/// environment variable holding the run parameter file passed to the model.
pub const PARAMETER_FILE_ENV: &str = "XTMF_PARAMETER_FILE";
/// environment variable holding the zero-based run counter.
pub const RUN_INDEX_ENV: &str = "XTMF_RUN_INDEX";

/// a model system run as an external program.
///
/// before every run the current run-only parameter values are written to
/// `run_parameter_file`, whose path is also passed in [`PARAMETER_FILE_ENV`].
/// outputs are read back by file data sources.
pub struct CommandModelSystem {
    name: String,
    program: String,
    args: Vec<String>,
    working_directory: Option<PathBuf>,
    run_parameter_file: PathBuf,
    database: ParameterDatabase,
    registry: ParameterRegistry,
    runs: usize,
}

impl CommandModelSystem {
    pub fn new(
        name: &str,
        program: &str,
        args: Vec<String>,
        working_directory: Option<PathBuf>,
        database: ParameterDatabase,
        run_parameter_file: &Path,
    ) -> Result<CommandModelSystem, ModelSystemError> {
        let registry = database.registry()?;
        // the program may run in another directory
        let run_parameter_file =
            std::path::absolute(run_parameter_file).map_err(|e| ModelSystemError::Io {
                path: run_parameter_file.display().to_string(),
                source: e,
            })?;
        Ok(CommandModelSystem {
            name: name.to_string(),
            program: program.to_string(),
            args,
            working_directory,
            run_parameter_file,
            database,
            registry,
            runs: 0,
        })
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn database(&self) -> &ParameterDatabase {
        &self.database
    }
}

impl ModelSystem for CommandModelSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.registry
    }

    fn run(&mut self) -> Result<(), ModelSystemError> {
        self.database.write_run_values(&self.run_parameter_file)?;
        command_ops::run_command(
            &self.name,
            &self.program,
            &self.args,
            self.working_directory.as_deref(),
            &[
                (
                    PARAMETER_FILE_ENV,
                    self.run_parameter_file.display().to_string(),
                ),
                (RUN_INDEX_ENV, self.runs.to_string()),
            ],
        )?;
        self.runs += 1;
        Ok(())
    }

    fn save_configuration(&mut self) -> Result<(), ModelSystemError> {
        self.database.save().map_err(|e| ModelSystemError::SaveFailed {
            name: self.name.clone(),
            message: e.to_string(),
        })?;
        log::info!("saved parameters to {}", self.database.path().display());
        Ok(())
    }

    fn exit_request(&self) -> bool {
        log::warn!(
            "model system '{}' cannot interrupt a running program, stopping after the current run",
            self.name
        );
        false
    }
}

use super::command_ops;
use std::path::PathBuf;
use xtmf_calibration_core::model::{ModelSystemError, SelfContainedModule};

/// an external program run once before or after calibration.
pub struct CommandModule {
    name: String,
    program: String,
    args: Vec<String>,
    working_directory: Option<PathBuf>,
}

impl CommandModule {
    pub fn new(name: &str, program: &str, args: Vec<String>, working_directory: Option<PathBuf>) -> CommandModule {
        CommandModule {
            name: name.to_string(),
            program: program.to_string(),
            args,
            working_directory,
        }
    }
}

impl SelfContainedModule for CommandModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<(), ModelSystemError> {
        command_ops::run_command(
            &self.name,
            &self.program,
            &self.args,
            self.working_directory.as_deref(),
            &[],
        )
    }
}

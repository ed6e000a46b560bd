use std::{path::Path, process::Command};
use xtmf_calibration_core::model::ModelSystemError;

/// runs `program` to completion, failing on a non-zero exit status.
///
/// # Arguments
///
/// * `name` - the model or module name used in errors
/// * `program` - executable, resolved through `PATH` when not a path
/// * `args` - arguments passed as-is
/// * `working_directory` - directory the program runs in, if not the current one
/// * `envs` - additional environment variables
pub fn run_command(
    name: &str,
    program: &str,
    args: &[String],
    working_directory: Option<&Path>,
    envs: &[(&str, String)],
) -> Result<(), ModelSystemError> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = working_directory {
        command.current_dir(dir);
    }
    for (key, value) in envs.iter() {
        command.env(key, value);
    }
    log::debug!("{name}: running {program} {}", args.join(" "));
    let status = command.status().map_err(|e| ModelSystemError::RunFailed {
        name: name.to_string(),
        message: format!("could not start '{program}': {e}"),
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(ModelSystemError::RunFailed {
            name: name.to_string(),
            message: format!("'{program}' exited with {status}"),
        })
    }
}

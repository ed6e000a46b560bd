use super::{CalibrationConfigError, ModelSystemConfig, ModuleConfig, TargetConfig};
use crate::{host::{CalibrationHost, CalibrationHostConfig}, model::CommandModelSystem};
use config::{Config, Environment, FileFormat};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// prefix of environment variables overriding file settings, e.g.
/// `XTMF_CALIBRATION__CALIBRATION__MAX_ITERATIONS=5`.
pub const ENV_PREFIX: &str = "XTMF_CALIBRATION";

/// a complete calibration run: host settings, the model system, and the
/// ordered targets.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CalibrationConfig {
    /// directory relative file paths are resolved against. a relative value is
    /// itself resolved against the directory of the configuration file.
    #[serde(default = "default_input_base_directory")]
    pub input_base_directory: PathBuf,
    #[serde(default)]
    pub calibration: CalibrationHostConfig,
    pub model: ModelSystemConfig,
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub pre_run: Vec<ModuleConfig>,
    #[serde(default)]
    pub post_run: Vec<ModuleConfig>,
}

fn default_input_base_directory() -> PathBuf {
    PathBuf::from(".")
}

impl TryFrom<&String> for CalibrationConfig {
    type Error = CalibrationConfigError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let format = if f.ends_with(".toml") {
            FileFormat::Toml
        } else if f.ends_with(".json") {
            FileFormat::Json
        } else {
            return Err(CalibrationConfigError::UnsupportedFileType(f.clone()));
        };
        let config = Config::builder()
            .add_source(config::File::new(f, format))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CalibrationConfigError::ConfigReadError {
                msg: format!("failed reading '{f}'"),
                source: e,
            })?;
        let mut calibration = config
            .try_deserialize::<CalibrationConfig>()
            .map_err(|e| CalibrationConfigError::ConfigReadError {
                msg: format!("failed decoding '{f}'"),
                source: e,
            })?;
        if calibration.input_base_directory.is_relative() {
            let file_directory = Path::new(f).parent().unwrap_or(Path::new(""));
            calibration.input_base_directory = file_directory.join(&calibration.input_base_directory);
        }
        Ok(calibration)
    }
}

impl CalibrationConfig {
    /// `path` resolved against the input base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.input_base_directory.join(path)
    }

    /// checks every section without touching the file system.
    pub fn validate(&self) -> Result<(), CalibrationConfigError> {
        if self.calibration.max_iterations < 1 {
            return Err(CalibrationConfigError::invalid(
                "calibration",
                format!(
                    "max_iterations must be at least 1, found {}",
                    self.calibration.max_iterations
                ),
            ));
        }
        self.model
            .validate()
            .map_err(|message| CalibrationConfigError::invalid(self.model.name(), message))?;
        if self.targets.is_empty() {
            return Err(CalibrationConfigError::invalid(
                "targets",
                String::from("at least one target is required"),
            ));
        }
        for target in self.targets.iter() {
            target
                .validate()
                .map_err(|message| CalibrationConfigError::invalid(&target.settings.name, message))?;
        }
        if let Some(name) = self
            .targets
            .iter()
            .map(|t| t.settings.name.as_str())
            .duplicates()
            .next()
        {
            return Err(CalibrationConfigError::invalid(
                name,
                String::from("target names must be unique"),
            ));
        }
        Ok(())
    }

    /// builds the model system, targets and modules into a host ready to run.
    pub fn build_host(&self) -> Result<CalibrationHost<CommandModelSystem>, CalibrationConfigError> {
        self.validate()?;
        let base = self.input_base_directory.as_path();
        let model = self.model.build(base)?;
        let targets = self.targets.iter().map(|t| t.build(base)).collect_vec();
        let mut host_config = self.calibration.clone();
        host_config.calibration_report = host_config
            .calibration_report
            .as_ref()
            .map(|report| self.resolve(report));
        let host = CalibrationHost::new(host_config, model, targets);
        let host = self
            .pre_run
            .iter()
            .fold(host, |host, m| host.with_pre_run(m.build(base)));
        let host = self
            .post_run
            .iter()
            .fold(host, |host, m| host.with_post_run(m.build(base)));
        Ok(host)
    }
}

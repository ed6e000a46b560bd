use crate::model::CommandModule;
use serde::{Deserialize, Serialize};
use std::path::Path;
use xtmf_calibration_core::model::SelfContainedModule;

/// a module run once before or after calibration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ModuleConfig {
    Command {
        name: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_directory: Option<String>,
    },
}

impl ModuleConfig {
    pub fn name(&self) -> &str {
        match self {
            ModuleConfig::Command { name, .. } => name,
        }
    }

    pub fn build(&self, base_directory: &Path) -> Box<dyn SelfContainedModule> {
        match self {
            ModuleConfig::Command {
                name,
                program,
                args,
                working_directory,
            } => Box::new(CommandModule::new(
                name,
                program,
                args.clone(),
                working_directory.as_ref().map(|d| base_directory.join(d)),
            )),
        }
    }
}

mod command_model_system;
mod command_module;
mod command_ops;
mod parameter_database;

pub use command_model_system::CommandModelSystem;
pub use command_module::CommandModule;
pub use parameter_database::{ParameterDatabase, ParameterEntry};

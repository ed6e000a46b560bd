pub mod app;
pub mod config;
pub mod diagnostics;
pub mod host;
pub mod model;
pub mod source;
pub mod target;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// derivative magnitude below the target's minimum, parameter held.
    FlatGradient,
    /// the computed update was NaN or infinite, parameter held.
    NonFiniteUpdate,
    /// the update was limited by the maximum change or the parameter bounds.
    Clamped,
}

impl DiagnosticKind {
    pub fn level(&self) -> log::Level {
        match self {
            DiagnosticKind::FlatGradient => log::Level::Info,
            DiagnosticKind::NonFiniteUpdate => log::Level::Warn,
            DiagnosticKind::Clamped => log::Level::Debug,
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::FlatGradient => write!(f, "flat gradient"),
            DiagnosticKind::NonFiniteUpdate => write!(f, "non-finite update"),
            DiagnosticKind::Clamped => write!(f, "clamped"),
        }
    }
}

/// a non-fatal event raised while calibrating, tagged with the module (target
/// name) that raised it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub module: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(module: &str, kind: DiagnosticKind, message: String) -> Diagnostic {
        Diagnostic {
            module: module.to_string(),
            kind,
            message,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.module, self.kind, self.message)
    }
}

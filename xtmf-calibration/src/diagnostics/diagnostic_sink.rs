use super::{Diagnostic, DiagnosticKind};
use std::sync::Mutex;

/// receives calibration diagnostics. injected into the host, which passes it
/// to each target when updating.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// forwards diagnostics to the `log` facade at the level of their kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::log!(diagnostic.kind.level(), "{diagnostic}");
    }
}

/// keeps every diagnostic in memory, and also logs it.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, module: &str, kind: DiagnosticKind) -> usize {
        self.diagnostics()
            .iter()
            .filter(|d| d.module == module && d.kind == kind)
            .count()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        LogSink.emit(diagnostic.clone());
        match self.records.lock() {
            Ok(mut records) => records.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

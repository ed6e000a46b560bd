mod diagnostic;
mod diagnostic_sink;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use diagnostic_sink::{DiagnosticSink, LogSink, MemorySink};

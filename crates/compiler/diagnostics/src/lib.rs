//! # fixbuf diagnostics
//!
//! Diagnostic values shared by every compiler phase, plus ariadne-based
//! rendering for terminals and test snapshots.

pub mod diagnostics;
pub mod reporting;

pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticCollection, DiagnosticSeverity,
    DiagnosticSink,
};
pub use reporting::build_diagnostic_message;

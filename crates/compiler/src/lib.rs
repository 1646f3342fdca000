//! # fixbuf compiler
//!
//! Driver for the inline array checker: load a scenario, validate every
//! method, lower the methods without errors to MIR and, when asked, interpret
//! the entry method.

pub mod config;
pub mod report;
pub mod scenario;
pub mod vm;

use std::path::{Path, PathBuf};

use fixbuf_compiler_diagnostics::{build_diagnostic_message, Diagnostic};
use fixbuf_compiler_mir::{lower_program, LoweringError, MirFunction, PrettyPrint};
use fixbuf_compiler_semantic::{validate_program, MethodReport, Program, UnknownMember};
use thiserror::Error;
use tracing::{debug, info, info_span};

pub use config::CompilerOptions;
pub use report::Report;
pub use scenario::{Expectations, InputValue, Scenario, ScenarioError};
pub use vm::{Execution, RtValue, RuntimeError, Vm};

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Errors that prevent a scenario from being compiled at all
///
/// Diagnostics, lowering failures and runtime errors are part of a
/// successful [`CompilerOutput`].
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    UnknownMember(#[from] UnknownMember),
}

/// One interpretation of the entry method
#[derive(Debug)]
pub struct Run {
    pub entry: String,
    pub outcome: std::result::Result<Execution, RuntimeError>,
}

#[derive(Debug)]
pub struct CompilerOutput {
    pub program: Program,
    /// Diagnostics of every method, in declaration order
    pub reports: Vec<MethodReport>,
    /// Lowered methods, in declaration order
    pub functions: Vec<MirFunction>,
    /// Methods without errors that could still not be lowered
    pub failures: Vec<(String, LoweringError)>,
    pub execution: Option<Run>,
}

impl CompilerOutput {
    pub fn function(&self, name: &str) -> Option<&MirFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn error_count(&self) -> usize {
        self.reports
            .iter()
            .map(|r| r.diagnostics.errors().len())
            .sum()
    }

    /// Whether anything went wrong: error diagnostics, lowering failures or a
    /// failed run
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
            || !self.failures.is_empty()
            || self
                .execution
                .as_ref()
                .is_some_and(|run| run.outcome.is_err())
    }

    /// Codes of every diagnostic, in report order
    pub fn codes(&self) -> Vec<&'static str> {
        self.reports
            .iter()
            .flat_map(|r| r.diagnostics.iter().map(|d| d.code.name()))
            .collect()
    }

    /// Names of the lowered methods
    pub fn lowered(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} error(s) in {} method(s), {} lowered",
            self.error_count(),
            self.reports.len(),
            self.functions.len()
        )
    }

    /// Render every diagnostic against the source of its method
    pub fn format_diagnostics(&self, use_color: bool) -> String {
        self.reports
            .iter()
            .filter(|r| !r.diagnostics.is_empty())
            .filter_map(|r| {
                let method = self.program.method(&r.method)?;
                Some(format!(
                    "method '{}':\n{}",
                    r.method,
                    format_diagnostics(&method.source, r.diagnostics.all(), use_color)
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn pretty_mir(&self) -> String {
        self.functions
            .iter()
            .map(|f| f.pretty_print(0))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Read and parse a scenario file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path).map_err(|source| CompilerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Scenario::parse(&text)?)
}

/// Compile a scenario with the given options
///
/// # Errors
///
/// Returns `CompilerError` if the scenario does not describe a well-formed
/// program or names an unknown well-known member. Everything found while
/// checking the program is reported through the returned [`CompilerOutput`].
pub fn compile_scenario(scenario: &Scenario, options: &CompilerOptions) -> Result<CompilerOutput> {
    let _span = info_span!("compile").entered();
    let members = options.member_table()?;
    let program = scenario.build_program()?;

    let reports = validate_program(&program, &members);
    let mut functions = Vec::new();
    let mut failures = Vec::new();
    for (method, lowered) in program.methods.iter().zip(lower_program(&program, &members)) {
        match lowered {
            Ok(function) => functions.push(function),
            Err(LoweringError::HasErrors { .. }) => {}
            Err(error) => {
                debug!(method = %method.name, %error, "lowering failed");
                failures.push((method.name.clone(), error));
            }
        }
    }

    let execution = options.run.then(|| {
        let entry = options.entry().to_string();
        let outcome = Vm::new(&program, &functions).run(&entry, &scenario.inputs);
        Run { entry, outcome }
    });

    let output = CompilerOutput {
        program,
        reports,
        functions,
        failures,
        execution,
    };
    info!(summary = %output.summary(), "compiled");
    Ok(output)
}

/// Load a scenario and compile it with its own options
pub fn compile_file(path: &Path) -> Result<CompilerOutput> {
    let scenario = load_scenario(path)?;
    compile_scenario(&scenario, &scenario.options)
}

/// Formats diagnostics for display
///
/// # Arguments
/// * `source_text` - The source code text
/// * `diagnostics` - The diagnostics to format
/// * `use_color` - Whether to use color in the output
pub fn format_diagnostics(
    source_text: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    diagnostics
        .iter()
        .map(|d| build_diagnostic_message(source_text, d, use_color))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Machine-readable summary of a compilation, and the comparison of a
//! compilation against a scenario's `[expect]` table.

use std::fmt::Debug;

use serde::Serialize;

use crate::scenario::Expectations;
use crate::CompilerOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub methods: Vec<MethodSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionSummary>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSummary {
    pub name: String,
    pub diagnostics: Vec<DiagnosticSummary>,
    pub lowered: bool,
    /// Span operations of the lowered body, in call order
    pub operations: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mir: Option<String>,
    /// Why a method without errors could not be lowered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticSummary {
    pub code: &'static str,
    pub number: u32,
    pub category: String,
    pub severity: String,
    pub message: String,
    pub args: Vec<String>,
    pub span: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub output: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompilerOutput {
    /// Summarize the compilation; `with_mir` includes the pretty-printed MIR
    pub fn report(&self, with_mir: bool) -> Report {
        use fixbuf_compiler_mir::PrettyPrint;

        let methods = self
            .reports
            .iter()
            .map(|report| {
                let function = self.function(&report.method);
                MethodSummary {
                    name: report.method.clone(),
                    diagnostics: report
                        .diagnostics
                        .iter()
                        .map(|d| DiagnosticSummary {
                            code: d.code.name(),
                            number: d.code.into(),
                            category: d.code.category().to_string(),
                            severity: d.severity.to_string(),
                            message: d.message.clone(),
                            args: d.args.clone(),
                            span: [d.span.start, d.span.end],
                        })
                        .collect(),
                    lowered: function.is_some(),
                    operations: function.map(|f| f.span_operations()).unwrap_or_default(),
                    mir: function
                        .filter(|_| with_mir)
                        .map(|f| f.pretty_print(0)),
                    failure: self
                        .failures
                        .iter()
                        .find(|(method, _)| *method == report.method)
                        .map(|(_, error)| error.to_string()),
                }
            })
            .collect();

        let execution = self.execution.as_ref().map(|run| match &run.outcome {
            Ok(execution) => ExecutionSummary {
                entry: run.entry.clone(),
                result: execution.result.as_ref().map(ToString::to_string),
                output: execution.output.clone(),
                error: None,
            },
            Err(error) => ExecutionSummary {
                entry: run.entry.clone(),
                result: None,
                output: Vec::new(),
                error: Some(error.name().to_string()),
            },
        });

        Report {
            methods,
            execution,
            summary: self.summary(),
        }
    }

    /// Differences between this output and `expect`, one line each
    pub fn check(&self, expect: &Expectations) -> Vec<String> {
        let mut mismatches = Vec::new();
        let mut compare = |what: &str, expected: &dyn Debug, actual: &dyn Debug, equal: bool| {
            if !equal {
                mismatches.push(format!("{what}: expected {expected:?}, got {actual:?}"));
            }
        };

        if let Some(codes) = &expect.codes {
            let actual = self.codes();
            compare("codes", codes, &actual, *codes == actual);
        }
        if let Some(lowered) = &expect.lowered {
            let actual = self.lowered();
            compare("lowered", lowered, &actual, *lowered == actual);
        }
        for (method, operations) in &expect.operations {
            let actual = self
                .function(method)
                .map(|f| f.span_operations())
                .unwrap_or_default();
            compare(
                &format!("operations of '{method}'"),
                operations,
                &actual,
                *operations == actual,
            );
        }

        let outcome = self.execution.as_ref().map(|run| &run.outcome);
        if let Some(result) = &expect.result {
            let actual = outcome.and_then(|o| o.as_ref().ok()).and_then(|e| e.result.as_ref());
            let equal = actual.is_some_and(|value| value.matches(result));
            compare("result", result, &actual.map(ToString::to_string), equal);
        }
        if let Some(output) = &expect.output {
            let actual = outcome
                .and_then(|o| o.as_ref().ok())
                .map(|e| e.output.clone())
                .unwrap_or_default();
            compare("output", output, &actual, *output == actual);
        }
        if let Some(error) = &expect.runtime_error {
            let actual = outcome.and_then(|o| o.as_ref().err()).map(|e| e.name());
            compare("runtime error", error, &actual, actual == Some(error.as_str()));
        }
        mismatches
    }
}

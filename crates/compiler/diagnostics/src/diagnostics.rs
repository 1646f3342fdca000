//! # Diagnostic System for Inline-Array Checking
//!
//! This module provides the diagnostic infrastructure for reporting errors found
//! while binding, ref-safety checking and flow-checking inline array accesses.
//!
//! Every [`DiagnosticCode`] belongs to exactly one [`DiagnosticCategory`]. A
//! diagnostic carries its formatted message together with the raw argument list
//! used to build it, so hosts can re-render it in their own words.

use ariadne::ReportKind;
use chumsky::span::SimpleSpan;
use std::fmt;

/// A diagnostic message produced by the checker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Arguments substituted into the message, in order
    pub args: Vec<String>,
    /// Source span where this diagnostic applies
    pub span: SimpleSpan<usize>,
}

/// Every rule violation is a hard error; there are no advisory diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
}

impl From<DiagnosticSeverity> for ReportKind<'static> {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => ReportKind::Error,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
        }
    }
}

/// The error taxonomy every diagnostic code falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCategory {
    /// Wrong argument count, type or modifier on an element access
    InvalidIndexing,
    /// Mutable operation on a readonly-derived span or ref
    ReadonlyViolation,
    /// A ref or span outlives its backing storage
    RefEscapeViolation,
    /// The host type system lacks a member the lowering needs
    MissingRequiredMember,
    /// Definite assignment failures
    UnassignedField,
    /// The target of an assignment or ref argument is not addressable
    LValueExpected,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidIndexing => "invalid-indexing",
            Self::ReadonlyViolation => "readonly-violation",
            Self::RefEscapeViolation => "ref-escape-violation",
            Self::MissingRequiredMember => "missing-required-member",
            Self::UnassignedField => "unassigned-field",
            Self::LValueExpected => "lvalue-expected",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCode {
    // Indexing errors (1000-1999)
    IndexArgumentCount,
    IndexArgumentType,
    NamedIndexArgument,
    IndexArgumentModifier,
    NotIndexable,
    IndexOutOfBounds,

    // Readonly errors (2000-2999)
    ReadonlyRefUse,
    ReadonlyAssignment,

    // Escape errors (3000-3999)
    ReturnParameterMember,
    ReturnStructMember,
    ReturnLocalMember,
    ReturnScopedParameter,
    ReturnRefLocal,
    SpanMayEscape,
    NonReferenceable,

    // Host type system (4000-4999)
    MissingRequiredMember,

    // Flow analysis (5000-5999)
    UnassignedField,
    UnassignedVariable,

    // Addressability (6000-6999)
    LValueExpected,
    RefArgumentNotAssignable,
}

impl DiagnosticCode {
    pub const fn category(self) -> DiagnosticCategory {
        match self {
            Self::IndexArgumentCount
            | Self::IndexArgumentType
            | Self::NamedIndexArgument
            | Self::IndexArgumentModifier
            | Self::NotIndexable
            | Self::IndexOutOfBounds => DiagnosticCategory::InvalidIndexing,
            Self::ReadonlyRefUse | Self::ReadonlyAssignment => {
                DiagnosticCategory::ReadonlyViolation
            }
            Self::ReturnParameterMember
            | Self::ReturnStructMember
            | Self::ReturnLocalMember
            | Self::ReturnScopedParameter
            | Self::ReturnRefLocal
            | Self::SpanMayEscape
            | Self::NonReferenceable => DiagnosticCategory::RefEscapeViolation,
            Self::MissingRequiredMember => DiagnosticCategory::MissingRequiredMember,
            Self::UnassignedField | Self::UnassignedVariable => {
                DiagnosticCategory::UnassignedField
            }
            Self::LValueExpected | Self::RefArgumentNotAssignable => {
                DiagnosticCategory::LValueExpected
            }
        }
    }

    /// Stable kebab-case name, used by scenario expectations and JSON output
    pub const fn name(self) -> &'static str {
        match self {
            Self::IndexArgumentCount => "index-argument-count",
            Self::IndexArgumentType => "index-argument-type",
            Self::NamedIndexArgument => "named-index-argument",
            Self::IndexArgumentModifier => "index-argument-modifier",
            Self::NotIndexable => "not-indexable",
            Self::IndexOutOfBounds => "index-out-of-bounds",
            Self::ReadonlyRefUse => "readonly-ref-use",
            Self::ReadonlyAssignment => "readonly-assignment",
            Self::ReturnParameterMember => "return-parameter-member",
            Self::ReturnStructMember => "return-struct-member",
            Self::ReturnLocalMember => "return-local-member",
            Self::ReturnScopedParameter => "return-scoped-parameter",
            Self::ReturnRefLocal => "return-ref-local",
            Self::SpanMayEscape => "span-may-escape",
            Self::NonReferenceable => "non-referenceable",
            Self::MissingRequiredMember => "missing-required-member",
            Self::UnassignedField => "unassigned-field",
            Self::UnassignedVariable => "unassigned-variable",
            Self::LValueExpected => "lvalue-expected",
            Self::RefArgumentNotAssignable => "ref-argument-not-assignable",
        }
    }
}

impl From<DiagnosticCode> for u32 {
    fn from(code: DiagnosticCode) -> Self {
        match code {
            DiagnosticCode::IndexArgumentCount => 1001,
            DiagnosticCode::IndexArgumentType => 1002,
            DiagnosticCode::NamedIndexArgument => 1003,
            DiagnosticCode::IndexArgumentModifier => 1004,
            DiagnosticCode::NotIndexable => 1005,
            DiagnosticCode::IndexOutOfBounds => 1006,
            DiagnosticCode::ReadonlyRefUse => 2001,
            DiagnosticCode::ReadonlyAssignment => 2002,
            DiagnosticCode::ReturnParameterMember => 3001,
            DiagnosticCode::ReturnStructMember => 3002,
            DiagnosticCode::ReturnLocalMember => 3003,
            DiagnosticCode::ReturnScopedParameter => 3004,
            DiagnosticCode::ReturnRefLocal => 3005,
            DiagnosticCode::SpanMayEscape => 3006,
            DiagnosticCode::NonReferenceable => 3007,
            DiagnosticCode::MissingRequiredMember => 4001,
            DiagnosticCode::UnassignedField => 5001,
            DiagnosticCode::UnassignedVariable => 5002,
            DiagnosticCode::LValueExpected => 6001,
            DiagnosticCode::RefArgumentNotAssignable => 6002,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message,
            args: Vec::new(),
            span: SimpleSpan::from(0..0),
        }
    }

    /// Add location information to this diagnostic
    pub const fn with_location(mut self, span: SimpleSpan<usize>) -> Self {
        self.span = span;
        self
    }

    /// Record the arguments the message was formatted with
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub const fn category(&self) -> DiagnosticCategory {
        self.code.category()
    }

    pub fn index_argument_count(count: usize, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::IndexArgumentCount,
            format!("Wrong number of indices inside []; expected 1, found {count}"),
        )
        .with_args([count.to_string()])
        .with_location(span)
    }

    pub fn index_argument_type(type_name: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::IndexArgumentType,
            format!("Cannot index an inline array with an argument of type '{type_name}'"),
        )
        .with_args([type_name])
        .with_location(span)
    }

    pub fn named_index_argument(name: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::NamedIndexArgument,
            format!("Inline array element access cannot use the named argument '{name}'"),
        )
        .with_args([name])
        .with_location(span)
    }

    pub fn index_argument_modifier(modifier: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::IndexArgumentModifier,
            format!(
                "Argument of an inline array element access may not be passed with the '{modifier}' keyword"
            ),
        )
        .with_args([modifier])
        .with_location(span)
    }

    pub fn not_indexable(type_name: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::NotIndexable,
            format!("Cannot apply indexing with [] to an expression of type '{type_name}'"),
        )
        .with_args([type_name])
        .with_location(span)
    }

    /// `index` is the index as written, `^n` for from-end indices
    pub fn index_out_of_bounds(index: &str, length: usize, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::IndexOutOfBounds,
            format!("Index {index} is outside the bounds of the inline array of length {length}"),
        )
        .with_args([index.to_string(), length.to_string()])
        .with_location(span)
    }

    pub fn readonly_ref_use(place: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReadonlyRefUse,
            format!("Cannot use '{place}' as a ref or out value because it is a readonly variable"),
        )
        .with_args([place])
        .with_location(span)
    }

    pub fn readonly_assignment(place: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReadonlyAssignment,
            format!("Cannot assign to '{place}' because it is a readonly variable"),
        )
        .with_args([place])
        .with_location(span)
    }

    pub fn return_parameter_member(parameter: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReturnParameterMember,
            format!(
                "Cannot return by reference a member of parameter '{parameter}' because it is not a ref or out parameter"
            ),
        )
        .with_args([parameter])
        .with_location(span)
    }

    pub fn return_struct_member(span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReturnStructMember,
            "Struct members cannot return 'this' or other instance members by reference"
                .to_string(),
        )
        .with_location(span)
    }

    pub fn return_local_member(local: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReturnLocalMember,
            format!(
                "Cannot return a member of local '{local}' by reference because it is not a ref local"
            ),
        )
        .with_args([local])
        .with_location(span)
    }

    pub fn return_scoped_parameter(parameter: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReturnScopedParameter,
            format!(
                "Cannot return a parameter by reference '{parameter}' because it is scoped to the current method"
            ),
        )
        .with_args([parameter])
        .with_location(span)
    }

    pub fn return_ref_local(local: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::ReturnRefLocal,
            format!(
                "Cannot return '{local}' by reference because it was initialized to a value that cannot be returned by reference"
            ),
        )
        .with_args([local])
        .with_location(span)
    }

    pub fn span_may_escape(variable: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::SpanMayEscape,
            format!(
                "Cannot use variable '{variable}' in this context because it may expose referenced variables outside of their declaration scope"
            ),
        )
        .with_args([variable])
        .with_location(span)
    }

    pub fn non_referenceable(span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::NonReferenceable,
            "An expression cannot be used in this context because it may not be passed or returned by reference"
                .to_string(),
        )
        .with_location(span)
    }

    pub fn missing_required_member(member: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::MissingRequiredMember,
            format!("Missing compiler required member '{member}'"),
        )
        .with_args([member])
        .with_location(span)
    }

    pub fn unassigned_field(field: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::UnassignedField,
            format!("Use of possibly unassigned field '{field}'"),
        )
        .with_args([field])
        .with_location(span)
    }

    pub fn unassigned_variable(name: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::UnassignedVariable,
            format!("Use of unassigned local variable '{name}'"),
        )
        .with_args([name])
        .with_location(span)
    }

    pub fn lvalue_expected(span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::LValueExpected,
            "The left-hand side of an assignment must be a variable, property or indexer"
                .to_string(),
        )
        .with_location(span)
    }

    pub fn ref_argument_not_assignable(span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::RefArgumentNotAssignable,
            "A ref or out value must be an assignable variable".to_string(),
        )
        .with_location(span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        write!(f, " (at {}:{})", self.span.start, self.span.end)
    }
}

/// Receiver of diagnostics produced by a checking pass
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Collection of diagnostics from one or more checking passes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add multiple diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get only error diagnostics
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Codes of all diagnostics, in report order
    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    pub const fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sort diagnostics by source position, then severity
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(a.code.cmp(&b.code))
        });
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        match self.errors().len() {
            0 => "No issues found".to_string(),
            errors => format!("{errors} error(s)"),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl DiagnosticSink for DiagnosticCollection {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

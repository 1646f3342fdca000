//! Common test utilities for semantic analysis tests
//!
//! This module contains all shared test infrastructure including:
//! - A type environment with the inline arrays and holders used across tests
//! - Validation entry points with and without well-known members removed
//! - Diagnostic formatting and assertion helpers

use fixbuf_compiler_diagnostics::{build_diagnostic_message, DiagnosticCode, DiagnosticCollection};
use fixbuf_compiler_semantic::{
    validate_method, FieldDef, MemberTable, MethodBody, StructKind, TypeId, TypeTable,
    WellKnownMember,
};

// ===== Type Environment =====

/// Types shared by the semantic tests
///
/// - `Buffer10`: 10 `int`s
/// - `Buffer2x10`: 2 `Buffer10`s
/// - `Holder { F: Buffer10, G: int }` (struct)
/// - `Nested { F: Buffer2x10 }` (struct)
/// - `ReadonlyHolder { F: Buffer10 }` (readonly struct)
/// - `FieldReadonlyHolder { readonly F: Buffer10 }` (struct)
/// - `ClassHolder { F: Buffer10 }` (class)
pub struct Env {
    pub types: TypeTable,
    pub int: TypeId,
    pub buffer: TypeId,
    pub nested_buffer: TypeId,
    pub holder: TypeId,
    pub nested: TypeId,
    pub readonly_holder: TypeId,
    pub field_readonly_holder: TypeId,
    pub class_holder: TypeId,
    pub span: TypeId,
    pub readonly_span: TypeId,
}

fn field(name: &str, ty: TypeId, readonly: bool) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        ty,
        readonly,
    }
}

pub fn env() -> Env {
    let mut types = TypeTable::new();
    let int = types.int();
    let buffer = types.add_inline_array("Buffer10", int, 10).unwrap();
    let nested_buffer = types.add_inline_array("Buffer2x10", buffer, 2).unwrap();

    let holder = types.declare_struct("Holder", StructKind::Struct).unwrap();
    types
        .define_fields(holder, vec![field("F", buffer, false), field("G", int, false)])
        .unwrap();
    let nested = types.declare_struct("Nested", StructKind::Struct).unwrap();
    types
        .define_fields(nested, vec![field("F", nested_buffer, false)])
        .unwrap();
    let readonly_holder = types
        .declare_struct("ReadonlyHolder", StructKind::ReadonlyStruct)
        .unwrap();
    types
        .define_fields(readonly_holder, vec![field("F", buffer, true)])
        .unwrap();
    let field_readonly_holder = types
        .declare_struct("FieldReadonlyHolder", StructKind::Struct)
        .unwrap();
    types
        .define_fields(field_readonly_holder, vec![field("F", buffer, true)])
        .unwrap();
    let class_holder = types.declare_struct("ClassHolder", StructKind::Class).unwrap();
    types
        .define_fields(class_holder, vec![field("F", buffer, false)])
        .unwrap();

    let span = types.span(int, false);
    let readonly_span = types.span(int, true);

    Env {
        types,
        int,
        buffer,
        nested_buffer,
        holder,
        nested,
        readonly_holder,
        field_readonly_holder,
        class_holder,
        span,
        readonly_span,
    }
}

// ===== Validation Utilities =====

/// Run every validator on a method body with all well-known members present
pub fn run_validation(env: &Env, body: &MethodBody) -> DiagnosticCollection {
    validate_method(&env.types, &MemberTable::default(), body)
}

/// Run every validator with some well-known members removed
pub fn run_validation_without(
    env: &Env,
    body: &MethodBody,
    missing: &[WellKnownMember],
) -> DiagnosticCollection {
    let members = MemberTable::with_missing(missing.iter().copied());
    validate_method(&env.types, &members, body)
}

/// Format diagnostics the way a failing assertion reports them
pub fn format_diagnostics(diagnostics: &DiagnosticCollection, body: &MethodBody) -> String {
    let mut result = String::new();
    result.push_str(&format!("Method: {}\n", body.name));
    result.push_str(&"=".repeat(60));
    result.push('\n');
    result.push_str(&body.source);
    result.push_str(&"=".repeat(60));
    result.push('\n');

    if diagnostics.is_empty() {
        result.push_str("No diagnostics found.\n");
        return result;
    }

    result.push_str(&format!("Found {} diagnostic(s):\n\n", diagnostics.len()));
    for (i, diagnostic) in diagnostics.all().iter().enumerate() {
        result.push_str(&format!("--- Diagnostic {} ---\n", i + 1));
        result.push_str(&build_diagnostic_message(&body.source, diagnostic, false));
    }
    result
}

/// One line per diagnostic, in `Display` form
pub fn diagnostic_lines(diagnostics: &DiagnosticCollection) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Assertion Implementation Functions =====

#[track_caller]
pub fn assert_valid_impl(env: &Env, body: &MethodBody) {
    let diagnostics = run_validation(env, body);
    if !diagnostics.is_empty() {
        let report = format_diagnostics(&diagnostics, body);
        panic!("Expected successful validation, but got diagnostics:\n{report}");
    }
}

#[track_caller]
pub fn assert_codes_impl(diagnostics: &DiagnosticCollection, body: &MethodBody, expected: &[DiagnosticCode]) {
    if diagnostics.codes() != expected {
        let report = format_diagnostics(diagnostics, body);
        panic!("Expected diagnostics {expected:?}, got:\n{report}");
    }
}

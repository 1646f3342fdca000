//! # Semantic Validation Tests
//!
//! Tests for inline array semantic validation, organized by concern.
//!
//! ## Test Organization
//!
//! - `indexing/` - Binding of element accesses, operand kinds, bounds and required members
//! - `ref_safety/` - Escape of references and spans, readonly violations, addressability
//! - `definite_assignment/` - Reads of inline arrays held by unassigned locals and `out` parameters
//!
//! ## Test Utilities
//!
//! - `assert_valid!(env, body)` - Assert a method body validates without diagnostics
//! - `assert_codes!(env, body, [Code, ...])` - Assert the exact diagnostic codes, in report order

pub mod common;
pub use common::*;

/// Macro to assert that a method body validates successfully
#[macro_export]
macro_rules! assert_valid {
    ($env:expr, $body:expr) => {{
        $crate::assert_valid_impl(&$env, &$body)
    }};
}

/// Macro to assert the diagnostic codes a method body produces; evaluates to
/// the diagnostics for further inspection
#[macro_export]
macro_rules! assert_codes {
    ($env:expr, $body:expr, [$($code:ident),* $(,)?]) => {{
        let body = &$body;
        let diagnostics = $crate::run_validation(&$env, body);
        $crate::assert_codes_impl(
            &diagnostics,
            body,
            &[$(fixbuf_compiler_diagnostics::DiagnosticCode::$code),*],
        );
        diagnostics
    }};
}

pub mod definite_assignment;
pub mod indexing;
pub mod ref_safety;

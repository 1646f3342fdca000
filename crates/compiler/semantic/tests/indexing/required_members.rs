//! Tests for the runtime members an element access depends on
use fixbuf_compiler_diagnostics::DiagnosticCode;
use fixbuf_compiler_semantic::{MethodBuilder, MethodBody, ParameterKind, WellKnownMember};

use crate::common::{diagnostic_lines, env, run_validation_without, Env};

fn slice_of_field(env: &Env) -> MethodBody {
    let mut b = MethodBuilder::new("Slice");
    let x = b.initialized_local("x", env.holder);
    let array = b.path(x, &["F"]);
    let three = b.int(3);
    let prefix = b.range(None, Some(three));
    let slice = b.index(array, prefix);
    b.expr_stmt(slice);
    b.finish()
}

#[test]
fn test_missing_slice_is_reported_once() {
    let env = env();
    let body = slice_of_field(&env);
    assert_eq!(body.source, "x.F[..3];\n");

    let diagnostics = run_validation_without(&env, &body, &[WellKnownMember::SpanSlice]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[missing-required-member]: Missing compiler required member 'System.Span<T>.Slice' (at 0:8)");
}

#[test]
fn test_slice_does_not_need_get_item() {
    let env = env();
    let body = slice_of_field(&env);
    let diagnostics = run_validation_without(
        &env,
        &body,
        &[WellKnownMember::SpanGetItem, WellKnownMember::SpanLength],
    );
    assert!(diagnostics.is_empty(), "{}", diagnostic_lines(&diagnostics));
}

#[test]
fn test_readonly_receiver_uses_readonly_members() {
    let env = env();
    let mut b = MethodBuilder::new("ReadIn");
    let x = b.parameter("x", ParameterKind::In, env.holder);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let body = b.finish();

    // An `in` parameter is projected to a ReadOnlySpan; the mutable members are unused
    let diagnostics = run_validation_without(
        &env,
        &body,
        &[WellKnownMember::InlineArrayAsSpan, WellKnownMember::SpanGetItem],
    );
    assert!(diagnostics.is_empty(), "{}", diagnostic_lines(&diagnostics));

    let diagnostics = run_validation_without(
        &env,
        &body,
        &[
            WellKnownMember::InlineArrayAsReadOnlySpan,
            WellKnownMember::ReadOnlySpanGetItem,
        ],
    );
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Missing compiler required member '<PrivateImplementationDetails>.InlineArrayAsReadOnlySpan'",
            "Missing compiler required member 'System.ReadOnlySpan<T>.get_Item'",
        ]
    );
}

#[test]
fn test_readonly_instance_method_projects_readonly() {
    let env = env();
    let mut b = MethodBuilder::new("Peek");
    let this = b.instance(env.holder, true, false);
    let array = b.path(this, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics =
        run_validation_without(&env, &body, &[WellKnownMember::ReadOnlySpanGetItem]);
    assert_eq!(diagnostics.codes(), vec![DiagnosticCode::MissingRequiredMember]);
}

#[test]
fn test_range_value_requires_offset_members() {
    let env = env();
    let mut b = MethodBuilder::new("RangeValue");
    let x = b.initialized_local("x", env.holder);
    let r = b.parameter("r", ParameterKind::Value, env.types.range());
    let array = b.path(x, &["F"]);
    let r = b.var(r);
    let slice = b.index(array, r);
    b.expr_stmt(slice);
    let body = b.finish();

    let diagnostics = run_validation_without(
        &env,
        &body,
        &[WellKnownMember::RangeEnd, WellKnownMember::IndexGetOffset],
    );
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Missing compiler required member 'System.Index.GetOffset'",
            "Missing compiler required member 'System.Range.get_End'",
        ]
    );
}

#[test]
fn test_from_end_requires_length() {
    let env = env();
    let mut b = MethodBuilder::new("Last");
    let x = b.initialized_local("x", env.holder);
    let array = b.path(x, &["F"]);
    let one = b.int(1);
    let last = b.from_end(one);
    let access = b.index(array, last);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics = run_validation_without(&env, &body, &[WellKnownMember::SpanLength]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[missing-required-member]: Missing compiler required member 'System.Span<T>.get_Length' (at 0:7)");
}

#[test]
fn test_span_receiver_needs_no_accessor() {
    let env = env();
    let mut b = MethodBuilder::new("SpanRead");
    let s = b.parameter("s", ParameterKind::Value, env.readonly_span);
    let span = b.var(s);
    let zero = b.int(0);
    let access = b.index(span, zero);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics = run_validation_without(
        &env,
        &body,
        &[
            WellKnownMember::InlineArrayAsSpan,
            WellKnownMember::InlineArrayAsReadOnlySpan,
        ],
    );
    assert!(diagnostics.is_empty(), "{}", diagnostic_lines(&diagnostics));
}

//! Tests for element accesses on inline arrays that have no address
use fixbuf_compiler_semantic::{
    ArgModifier, ExprId, MethodBody, MethodBuilder, ParameterKind, ReturnKind,
};

use crate::common::{diagnostic_lines, Env};
use crate::{assert_codes, assert_valid, env};

/// A method whose single statement is built on top of `Make()`, a call
/// returning an inline array by value
fn on_temporary(env: &Env, statement: impl FnOnce(&mut MethodBuilder, ExprId)) -> MethodBody {
    let mut b = MethodBuilder::new("Temporary");
    let array = b.call("Make", ReturnKind::Value, env.buffer);
    statement(&mut b, array);
    b.finish()
}

#[test]
fn test_reading_an_element_of_a_temporary() {
    let env = env();
    let body = on_temporary(&env, |b, array| {
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.expr_stmt(access);
    });
    assert_valid!(env, body);

    // `in` arguments accept values without an address
    let body = on_temporary(&env, |b, array| {
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.pass("Use", ArgModifier::In, access);
    });
    assert_valid!(env, body);
}

#[test]
fn test_assigning_an_element_of_a_temporary() {
    let env = env();
    let body = on_temporary(&env, |b, array| {
        let zero = b.int(0);
        let access = b.index(array, zero);
        let one = b.int(1);
        b.assign(access, one);
    });
    assert_eq!(body.source, "Make()[0] = 1;\n");

    let diagnostics = assert_codes!(env, body, [LValueExpected]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[lvalue-expected]: The left-hand side of an assignment must be a variable, property or indexer (at 0:9)");
}

#[test]
fn test_referencing_an_element_of_a_temporary() {
    let env = env();
    let by_ref = on_temporary(&env, |b, array| {
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.pass("Use", ArgModifier::Ref, access);
    });
    let diagnostics = assert_codes!(env, by_ref, [RefArgumentNotAssignable]);
    assert_eq!(
        diagnostics.all()[0].message,
        "A ref or out value must be an assignable variable"
    );

    let ref_local = on_temporary(&env, |b, array| {
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.ref_local("r", false, env.int, access);
    });
    assert_codes!(env, ref_local, [NonReferenceable]);
}

#[test]
fn test_slicing_a_temporary() {
    let env = env();
    let body = on_temporary(&env, |b, array| {
        let two = b.int(2);
        let prefix = b.range(None, Some(two));
        let slice = b.index(array, prefix);
        b.expr_stmt(slice);
    });
    let diagnostics = assert_codes!(env, body, [NonReferenceable]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[non-referenceable]: An expression cannot be used in this context because it may not be passed or returned by reference (at 0:11)");
}

#[test]
fn test_span_conversion_of_a_temporary() {
    let env = env();
    let mutable = on_temporary(&env, |b, array| {
        let span = b.span_of(array, false);
        b.expr_stmt(span);
    });
    assert_codes!(env, mutable, [NonReferenceable]);
}

#[test]
fn test_slice_is_not_assignable() {
    let env = env();
    let mut b = MethodBuilder::new("AssignSlice");
    let x = b.initialized_local("x", env.holder);
    let array = b.path(x, &["F"]);
    let all = b.range(None, None);
    let slice = b.index(array, all);
    let value = b.default_of(env.span);
    b.assign(slice, value);
    let body = b.finish();
    assert_codes!(env, body, [LValueExpected]);
}

#[test]
fn test_span_variables_are_assignable() {
    let env = env();
    let mut b = MethodBuilder::new("Reslice");
    let x = b.parameter("x", ParameterKind::Ref, env.holder);
    let s = b.local("s", env.span);
    let target = b.var(s);
    let array = b.path(x, &["F"]);
    let all = b.range(None, None);
    let slice = b.index(array, all);
    b.assign(target, slice);
    let span = b.var(s);
    b.pass("Fill", ArgModifier::Ref, span);
    let body = b.finish();
    assert_valid!(env, body);
}

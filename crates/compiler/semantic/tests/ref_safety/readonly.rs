//! Tests for writes and `ref` uses through read-only storage
use fixbuf_compiler_semantic::{
    ArgModifier, BinaryOp, MethodBuilder, ParameterKind, ReturnKind, TypeId,
};

use crate::common::diagnostic_lines;
use crate::{assert_codes, assert_valid, env};

#[test]
fn test_assignment_through_readonly_struct() {
    let env = env();
    for holder in [env.readonly_holder, env.field_readonly_holder] {
        let mut b = MethodBuilder::new("Write");
        let x = b.parameter("x", ParameterKind::Ref, holder);
        let array = b.path(x, &["F"]);
        let zero = b.int(0);
        let access = b.index(array, zero);
        let value = b.int(1);
        b.assign(access, value);
        let body = b.finish();

        let diagnostics = assert_codes!(env, body, [ReadonlyAssignment]);
        assert_eq!(
            diagnostic_lines(&diagnostics),
            "error[readonly-assignment]: Cannot assign to 'x.F[0]' because it is a readonly variable (at 0:6)"
        );
    }
}

#[test]
fn test_compound_assignment_through_in_parameter() {
    let env = env();
    let mut b = MethodBuilder::new("Add");
    let x = b.parameter("x", ParameterKind::In, env.holder);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    let one = b.int(1);
    b.compound_assign(access, BinaryOp::Add, one);
    let body = b.finish();
    assert_eq!(body.source, "x.F[0] += 1;\n");
    assert_codes!(env, body, [ReadonlyAssignment]);
}

#[test]
fn test_readonly_instance_method_cannot_write_elements() {
    let env = env();
    let mut b = MethodBuilder::new("Reset");
    let this = b.instance(env.holder, true, false);
    let array = b.path(this, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    let value = b.int(0);
    b.assign(access, value);
    let body = b.finish();
    assert_codes!(env, body, [ReadonlyAssignment]);
}

#[test]
fn test_passing_readonly_elements() {
    let env = env();
    let pass = |modifier: ArgModifier| {
        let mut b = MethodBuilder::new("Pass");
        let x = b.parameter("x", ParameterKind::In, env.holder);
        let array = b.path(x, &["F"]);
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.pass("Use", modifier, access);
        b.finish()
    };

    let by_ref = pass(ArgModifier::Ref);
    assert_eq!(by_ref.source, "Use(ref x.F[0]);\n");
    let diagnostics = assert_codes!(env, by_ref, [ReadonlyRefUse]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[readonly-ref-use]: Cannot use 'x.F[0]' as a ref or out value because it is a readonly variable (at 8:14)");

    assert_codes!(env, pass(ArgModifier::Out), [ReadonlyRefUse]);
    assert_valid!(env, pass(ArgModifier::In));
    assert_valid!(env, pass(ArgModifier::None));
}

#[test]
fn test_returning_readonly_elements() {
    let env = env();
    let ret = |returns: ReturnKind| {
        let mut b = MethodBuilder::new("Get");
        let x = b.parameter("x", ParameterKind::In, env.holder);
        let array = b.path(x, &["F"]);
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.returns(returns, Some(env.int)).ret(Some(access));
        b.finish()
    };

    assert_codes!(env, ret(ReturnKind::Ref), [ReadonlyRefUse]);
    assert_valid!(env, ret(ReturnKind::RefReadonly));
    assert_valid!(env, ret(ReturnKind::Value));
}

#[test]
fn test_mutable_span_conversion_of_readonly_storage() {
    let env = env();
    let convert = |readonly: bool| {
        let mut b = MethodBuilder::new("Convert");
        let x = b.parameter("x", ParameterKind::In, env.holder);
        let array = b.path(x, &["F"]);
        let span = b.span_of(array, readonly);
        b.expr_stmt(span);
        b.finish()
    };

    let mutable = convert(false);
    assert_eq!(mutable.source, "(Span)x.F;\n");
    let diagnostics = assert_codes!(env, mutable, [ReadonlyRefUse]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[readonly-ref-use]: Cannot use 'x.F' as a ref or out value because it is a readonly variable (at 6:9)");

    assert_valid!(env, convert(true));
}

#[test]
fn test_readonly_ref_locals() {
    let env = env();

    // A readonly ref local may bind anything, but cannot be written through
    let mut b = MethodBuilder::new("ReadonlyLocal");
    let x = b.parameter("x", ParameterKind::Ref, env.holder);
    let init = b.path(x, &["F"]);
    let r = b.ref_local("r", true, env.buffer, init);
    let r = b.var(r);
    let zero = b.int(0);
    let access = b.index(r, zero);
    let value = b.int(1);
    b.assign(access, value);
    let body = b.finish();
    assert_eq!(body.source, "ref readonly r = ref x.F;\nr[0] = 1;\n");
    let diagnostics = assert_codes!(env, body, [ReadonlyAssignment]);
    assert_eq!(
        diagnostics.all()[0].message,
        "Cannot assign to 'r[0]' because it is a readonly variable"
    );

    // A mutable ref local cannot bind read-only storage
    let mut b = MethodBuilder::new("MutableLocal");
    let x = b.parameter("x", ParameterKind::In, env.holder);
    let init = b.path(x, &["F"]);
    b.ref_local("r", false, env.buffer, init);
    let body = b.finish();
    assert_codes!(env, body, [ReadonlyRefUse]);
}

#[test]
fn test_span_receivers() {
    let env = env();
    let write = |span_type: TypeId| {
        let mut b = MethodBuilder::new("Write");
        let s = b.parameter("s", ParameterKind::Value, span_type);
        let s = b.var(s);
        let zero = b.int(0);
        let access = b.index(s, zero);
        let value = b.int(1);
        b.assign(access, value);
        b.finish()
    };

    assert_valid!(env, write(env.span));
    assert_codes!(env, write(env.readonly_span), [ReadonlyAssignment]);
}

#[test]
fn test_class_fields_are_writable() {
    let env = env();
    let mut b = MethodBuilder::new("Write");
    let c = b.parameter("c", ParameterKind::Value, env.class_holder);
    let array = b.path(c, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    let value = b.int(1);
    b.assign(access, value);
    let array = b.path(c, &["F"]);
    let one = b.int(1);
    let access = b.index(array, one);
    b.pass("Use", ArgModifier::Ref, access);
    let body = b.finish();
    assert_valid!(env, body);
}

//! Tests for references and spans escaping the method that created them
use fixbuf_compiler_semantic::{
    MethodBody, MethodBuilder, ParameterKind, ReturnKind, TypeId, VariableId,
};

use crate::common::{diagnostic_lines, Env};
use crate::{assert_codes, assert_valid, env};

/// `return ref <root>.F[0];` for a root produced by `declare`
fn return_first_element(
    env: &Env,
    returns: ReturnKind,
    declare: impl FnOnce(&mut MethodBuilder) -> VariableId,
) -> MethodBody {
    let mut b = MethodBuilder::new("First");
    let root = declare(&mut b);
    let array = b.path(root, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.returns(returns, Some(env.int)).ret(Some(access));
    b.finish()
}

fn parameter(kind: ParameterKind, ty: TypeId) -> impl FnOnce(&mut MethodBuilder) -> VariableId {
    move |b: &mut MethodBuilder| b.parameter("x", kind, ty)
}

#[test]
fn test_value_parameter_element_cannot_be_returned() {
    let env = env();
    let body = return_first_element(
        &env,
        ReturnKind::Ref,
        parameter(ParameterKind::Value, env.holder),
    );
    assert_eq!(body.source, "return ref x.F[0];\n");

    let diagnostics = assert_codes!(env, body, [ReturnParameterMember]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[return-parameter-member]: Cannot return by reference a member of parameter 'x' because it is not a ref or out parameter (at 11:17)");
}

#[test]
fn test_ref_and_in_parameter_elements_can_be_returned() {
    let env = env();
    let by_ref = return_first_element(
        &env,
        ReturnKind::Ref,
        parameter(ParameterKind::Ref, env.holder),
    );
    assert_valid!(env, by_ref);

    let by_in = return_first_element(
        &env,
        ReturnKind::RefReadonly,
        parameter(ParameterKind::In, env.holder),
    );
    assert_valid!(env, by_in);

    let by_ref_readonly = return_first_element(
        &env,
        ReturnKind::RefReadonly,
        parameter(ParameterKind::RefReadonly, env.holder),
    );
    assert_valid!(env, by_ref_readonly);
}

#[test]
fn test_struct_receiver() {
    let env = env();
    let scoped = return_first_element(&env, ReturnKind::Ref, |b| {
        b.instance(env.holder, false, false)
    });
    let diagnostics = assert_codes!(env, scoped, [ReturnStructMember]);
    assert_eq!(
        diagnostics.all()[0].message,
        "Struct members cannot return 'this' or other instance members by reference"
    );

    let unscoped = return_first_element(&env, ReturnKind::Ref, |b| {
        b.instance(env.holder, false, true)
    });
    assert_valid!(env, unscoped);
}

#[test]
fn test_class_receiver_elements_live_on_the_heap() {
    let env = env();
    let from_this = return_first_element(&env, ReturnKind::Ref, |b| {
        b.instance(env.class_holder, false, false)
    });
    assert_valid!(env, from_this);

    let from_parameter = return_first_element(
        &env,
        ReturnKind::Ref,
        parameter(ParameterKind::Value, env.class_holder),
    );
    assert_valid!(env, from_parameter);
}

#[test]
fn test_local_element_cannot_be_returned() {
    let env = env();
    let body = return_first_element(&env, ReturnKind::Ref, |b| {
        b.initialized_local("x", env.holder)
    });
    let diagnostics = assert_codes!(env, body, [ReturnLocalMember]);
    assert_eq!(
        diagnostics.all()[0].message,
        "Cannot return a member of local 'x' by reference because it is not a ref local"
    );
}

#[test]
fn test_scoped_and_out_parameters_cannot_be_returned() {
    let env = env();
    let scoped = return_first_element(&env, ReturnKind::Ref, |b| {
        b.scoped_parameter("x", ParameterKind::Ref, env.holder)
    });
    assert_codes!(env, scoped, [ReturnScopedParameter]);

    let mut b = MethodBuilder::new("FillAndReturn");
    let o = b.parameter("o", ParameterKind::Out, env.holder);
    let target = b.var(o);
    let value = b.default_of(env.holder);
    b.assign(target, value);
    let array = b.path(o, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.returns(ReturnKind::Ref, Some(env.int)).ret(Some(access));
    let out = b.finish();
    let diagnostics = assert_codes!(env, out, [ReturnScopedParameter]);
    assert_eq!(
        diagnostics.all()[0].message,
        "Cannot return a parameter by reference 'o' because it is scoped to the current method"
    );
}

#[test]
fn test_ref_local_takes_scope_of_its_initializer() {
    let env = env();

    let mut b = MethodBuilder::new("ViaLocal");
    let x = b.initialized_local("x", env.holder);
    let init = b.path(x, &["F"]);
    let r = b.ref_local("r", false, env.buffer, init);
    let r = b.var(r);
    let zero = b.int(0);
    let access = b.index(r, zero);
    b.returns(ReturnKind::Ref, Some(env.int)).ret(Some(access));
    let via_local = b.finish();
    assert_eq!(via_local.source, "ref r = ref x.F;\nreturn ref r[0];\n");
    let diagnostics = assert_codes!(env, via_local, [ReturnRefLocal]);
    assert_eq!(
        diagnostics.all()[0].message,
        "Cannot return 'r' by reference because it was initialized to a value that cannot be returned by reference"
    );

    let mut b = MethodBuilder::new("ViaParameter");
    let x = b.parameter("x", ParameterKind::Ref, env.holder);
    let init = b.path(x, &["F"]);
    let r = b.ref_local("r", false, env.buffer, init);
    let r = b.var(r);
    let zero = b.int(0);
    let access = b.index(r, zero);
    b.returns(ReturnKind::Ref, Some(env.int)).ret(Some(access));
    let via_parameter = b.finish();
    assert_valid!(env, via_parameter);
}

#[test]
fn test_ref_returning_call_outlives_the_caller() {
    let env = env();
    let mut b = MethodBuilder::new("Forward");
    let array = b.call("Get", ReturnKind::Ref, env.buffer);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.returns(ReturnKind::Ref, Some(env.int)).ret(Some(access));
    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_returned_slices_follow_their_receiver() {
    let env = env();
    let slice_of = |kind: ParameterKind| {
        let mut b = MethodBuilder::new("Slice");
        let x = b.parameter("x", kind, env.holder);
        let array = b.path(x, &["F"]);
        let all = b.range(None, None);
        let slice = b.index(array, all);
        b.returns(ReturnKind::Value, Some(env.span)).ret(Some(slice));
        b.finish()
    };

    assert_codes!(env, slice_of(ParameterKind::Value), [ReturnParameterMember]);
    assert_valid!(env, slice_of(ParameterKind::Ref));

    let mut b = MethodBuilder::new("Convert");
    let x = b.parameter("x", ParameterKind::Ref, env.holder);
    let array = b.path(x, &["F"]);
    let span = b.span_of(array, false);
    b.returns(ReturnKind::Value, Some(env.span)).ret(Some(span));
    let conversion = b.finish();
    assert_eq!(conversion.source, "return (Span)x.F;\n");
    assert_valid!(env, conversion);
}

#[test]
fn test_span_local_cannot_be_narrowed() {
    let env = env();
    let mut b = MethodBuilder::new("Narrow");
    let x = b.parameter("x", ParameterKind::Ref, env.holder);
    let y = b.initialized_local("y", env.holder);
    let s = b.local("s", env.span);
    for root in [x, y] {
        let target = b.var(s);
        let array = b.path(root, &["F"]);
        let all = b.range(None, None);
        let slice = b.index(array, all);
        b.assign(target, slice);
    }
    let s = b.var(s);
    b.returns(ReturnKind::Value, Some(env.span)).ret(Some(s));
    let body = b.finish();
    assert_eq!(body.source, "s = x.F[..];\ns = y.F[..];\nreturn s;\n");

    let diagnostics = assert_codes!(env, body, [SpanMayEscape]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[span-may-escape]: Cannot use variable 's' in this context because it may expose referenced variables outside of their declaration scope (at 17:24)");
}

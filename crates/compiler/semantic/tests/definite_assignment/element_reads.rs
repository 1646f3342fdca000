//! Tests for reading inline array elements before their storage is assigned
use fixbuf_compiler_semantic::{ArgModifier, MethodBuilder, ParameterKind};

use crate::common::diagnostic_lines;
use crate::{assert_codes, assert_valid, env};

#[test]
fn test_reading_element_of_unassigned_local() {
    let env = env();
    let mut b = MethodBuilder::new("Read");
    let x = b.local("x", env.holder);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics = assert_codes!(env, body, [UnassignedField]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[unassigned-field]: Use of possibly unassigned field 'F' (at 0:3)");
}

#[test]
fn test_each_place_is_reported_once() {
    let env = env();
    let mut b = MethodBuilder::new("ReadTwice");
    let x = b.local("x", env.holder);
    for i in 0..2 {
        let array = b.path(x, &["F"]);
        let i = b.int(i);
        let access = b.index(array, i);
        b.pass("Use", ArgModifier::None, access);
    }
    let body = b.finish();
    assert_codes!(env, body, [UnassignedField]);
}

#[test]
fn test_element_writes_do_not_assign_the_array() {
    let env = env();
    let mut b = MethodBuilder::new("WriteThenRead");
    let x = b.local("x", env.holder);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    let one = b.int(1);
    b.assign(access, one);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let body = b.finish();
    assert_eq!(body.source, "x.F[0] = 1;\nx.F[0];\n");

    let diagnostics = assert_codes!(env, body, [UnassignedField]);
    assert_eq!(diagnostics.all()[0].span.start, 12);
}

#[test]
fn test_assigning_the_field_or_the_variable() {
    let env = env();

    let mut b = MethodBuilder::new("AssignField");
    let x = b.local("x", env.holder);
    let field = b.path(x, &["F"]);
    let value = b.default_of(env.buffer);
    b.assign(field, value);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let body = b.finish();
    assert_valid!(env, body);

    let mut b = MethodBuilder::new("AssignVariable");
    let x = b.local("x", env.holder);
    let target = b.var(x);
    let value = b.default_of(env.holder);
    b.assign(target, value);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_struct_is_assigned_once_every_field_is() {
    let env = env();
    let mut b = MethodBuilder::new("FieldByField");
    let x = b.local("x", env.holder);
    let field = b.path(x, &["F"]);
    let value = b.default_of(env.buffer);
    b.assign(field, value);
    let field = b.path(x, &["G"]);
    let value = b.int(7);
    b.assign(field, value);
    let whole = b.var(x);
    b.pass("Use", ArgModifier::None, whole);
    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_out_parameter_must_be_assigned_before_reading() {
    let env = env();
    let mut b = MethodBuilder::new("ReadOut");
    let o = b.parameter("o", ParameterKind::Out, env.holder);
    let array = b.path(o, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.expr_stmt(access);
    let target = b.var(o);
    let value = b.default_of(env.holder);
    b.assign(target, value);
    let body = b.finish();
    assert_codes!(env, body, [UnassignedField]);
}

#[test]
fn test_unassigned_index_variable() {
    let env = env();
    let mut b = MethodBuilder::new("ReadAt");
    let y = b.initialized_local("y", env.holder);
    let n = b.local("n", env.int);
    let array = b.path(y, &["F"]);
    let n = b.var(n);
    let access = b.index(array, n);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics = assert_codes!(env, body, [UnassignedVariable]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[unassigned-variable]: Use of unassigned local variable 'n' (at 4:5)");
}

#[test]
fn test_nested_element_read() {
    let env = env();
    let mut b = MethodBuilder::new("ReadNested");
    let n = b.local("n", env.nested);
    let outer = b.path(n, &["F"]);
    let one = b.int(1);
    let row = b.index(outer, one);
    let two = b.int(2);
    let cell = b.index(row, two);
    b.expr_stmt(cell);
    let body = b.finish();
    assert_codes!(env, body, [UnassignedField]);
}

#[test]
fn test_value_argument_is_a_read() {
    let env = env();
    let mut b = MethodBuilder::new("PassValue");
    let x = b.local("x", env.holder);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.index(array, zero);
    b.pass("Use", ArgModifier::None, access);
    let body = b.finish();
    assert_codes!(env, body, [UnassignedField]);
}

/// Element accesses passed by reference are not treated as reads, so nothing
/// is reported even though `x` was never assigned
#[test]
fn test_reference_arguments_are_not_reads() {
    let env = env();
    for modifier in [ArgModifier::In, ArgModifier::Ref] {
        let mut b = MethodBuilder::new("PassRef");
        let x = b.local("x", env.holder);
        let array = b.path(x, &["F"]);
        let zero = b.int(0);
        let access = b.index(array, zero);
        b.pass("Use", modifier, access);
        let body = b.finish();
        assert_valid!(env, body);
    }

    let mut b = MethodBuilder::new("BindRef");
    let x = b.local("x", env.holder);
    let init = b.path(x, &["F"]);
    b.ref_local("r", true, env.buffer, init);
    let body = b.finish();
    assert_valid!(env, body);
}

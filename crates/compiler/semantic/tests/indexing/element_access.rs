//! Tests for element access binding: operand kinds, bounds and malformed arguments
use fixbuf_compiler_semantic::{ArgModifier, Argument, ExprId, MethodBuilder, ParameterKind};

use crate::{assert_codes, assert_valid, diagnostic_lines, env};

#[test]
fn test_every_operand_kind_binds() {
    let env = env();
    let mut b = MethodBuilder::new("Operands");
    let x = b.initialized_local("x", env.holder);
    let i = b.parameter("i", ParameterKind::Value, env.int);
    let idx = b.parameter("idx", ParameterKind::Value, env.types.index());
    let r = b.parameter("r", ParameterKind::Value, env.types.range());
    let d = b.parameter("d", ParameterKind::Value, env.types.dynamic());
    let read = |b: &mut MethodBuilder, operand: ExprId| {
        let array = b.path(x, &["F"]);
        let access = b.index(array, operand);
        b.expr_stmt(access);
    };

    let literal = b.int(3);
    read(&mut b, literal);
    let variable = b.var(i);
    read(&mut b, variable);
    let one = b.int(1);
    let hat_one = b.from_end(one);
    read(&mut b, hat_one);
    let index = b.var(idx);
    read(&mut b, index);
    let (start, two) = (b.int(1), b.int(2));
    let end = b.from_end(two);
    let bounded = b.range(Some(start), Some(end));
    read(&mut b, bounded);
    let whole = b.range(None, None);
    read(&mut b, whole);
    let range = b.var(r);
    read(&mut b, range);
    let dynamic = b.var(d);
    read(&mut b, dynamic);

    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_from_end_index_is_offset_from_length() {
    let env = env();
    let mut b = MethodBuilder::new("FromEnd");
    let x = b.initialized_local("x", env.holder);
    // `^10` is element 0 of a 10 element array
    let array = b.path(x, &["F"]);
    let ten = b.int(10);
    let first = b.from_end(ten);
    let access = b.index(array, first);
    b.expr_stmt(access);
    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_constant_index_out_of_bounds() {
    let env = env();
    let mut b = MethodBuilder::new("OutOfBounds");
    let x = b.initialized_local("x", env.holder);
    let array = b.path(x, &["F"]);
    let ten = b.int(10);
    let access = b.index(array, ten);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics = assert_codes!(env, body, [IndexOutOfBounds]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[index-out-of-bounds]: Index 10 is outside the bounds of the inline array of length 10 (at 0:7)");
}

#[test]
fn test_from_end_out_of_bounds() {
    let env = env();
    let mut b = MethodBuilder::new("FromEndOutOfBounds");
    let x = b.initialized_local("x", env.holder);
    for n in [0, 11] {
        let array = b.path(x, &["F"]);
        let n = b.int(n);
        let hat = b.from_end(n);
        let access = b.index(array, hat);
        b.expr_stmt(access);
    }
    let body = b.finish();

    let diagnostics = assert_codes!(env, body, [IndexOutOfBounds, IndexOutOfBounds]);
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Index ^0 is outside the bounds of the inline array of length 10",
            "Index ^11 is outside the bounds of the inline array of length 10",
        ]
    );
}

#[test]
fn test_extreme_from_end_constants_are_out_of_bounds() {
    let env = env();
    let mut b = MethodBuilder::new("ExtremeFromEnd");
    let x = b.initialized_local("x", env.holder);
    for n in [i64::MIN, -1, i64::MAX] {
        let array = b.path(x, &["F"]);
        let n = b.int(n);
        let hat = b.from_end(n);
        let access = b.index(array, hat);
        b.expr_stmt(access);
    }
    let body = b.finish();

    let diagnostics = assert_codes!(
        env,
        body,
        [IndexOutOfBounds, IndexOutOfBounds, IndexOutOfBounds]
    );
    assert_eq!(
        diagnostics.all()[0].args,
        vec![format!("^{}", i64::MIN), "10".to_string()]
    );
}

#[test]
fn test_non_constant_and_range_bounds_are_not_checked() {
    let env = env();
    let mut b = MethodBuilder::new("Unchecked");
    let x = b.initialized_local("x", env.holder);
    let i = b.parameter("i", ParameterKind::Value, env.int);

    let array = b.path(x, &["F"]);
    let i = b.var(i);
    let dynamic = b.index(array, i);
    b.expr_stmt(dynamic);

    let array = b.path(x, &["F"]);
    let (start, end) = (b.int(0), b.int(20));
    let wide = b.range(Some(start), Some(end));
    let slice = b.index(array, wide);
    b.expr_stmt(slice);

    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_invalid_argument_types() {
    let env = env();
    let mut b = MethodBuilder::new("ArgumentTypes");
    let x = b.initialized_local("x", env.holder);
    let idx = b.parameter("idx", ParameterKind::Value, env.types.index());

    let array = b.path(x, &["F"]);
    let flag = b.bool(true);
    let by_bool = b.index(array, flag);
    b.expr_stmt(by_bool);

    let array = b.path(x, &["F"]);
    let text = b.string("0");
    let by_string = b.index(array, text);
    b.expr_stmt(by_string);

    // `^` takes an int, not an Index
    let array = b.path(x, &["F"]);
    let idx = b.var(idx);
    let hat = b.from_end(idx);
    let by_hat_index = b.index(array, hat);
    b.expr_stmt(by_hat_index);

    let array = b.path(x, &["F"]);
    let flag = b.bool(false);
    let bad_range = b.range(Some(flag), None);
    let by_bad_range = b.index(array, bad_range);
    b.expr_stmt(by_bad_range);

    let body = b.finish();
    let diagnostics = assert_codes!(
        env,
        body,
        [IndexArgumentType, IndexArgumentType, IndexArgumentType, IndexArgumentType]
    );
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Cannot index an inline array with an argument of type 'bool'",
            "Cannot index an inline array with an argument of type 'string'",
            "Cannot index an inline array with an argument of type 'Index'",
            "Cannot index an inline array with an argument of type 'bool'",
        ]
    );
}

#[test]
fn test_argument_count() {
    let env = env();
    let mut b = MethodBuilder::new("ArgumentCount");
    let x = b.initialized_local("x", env.holder);

    let array = b.path(x, &["F"]);
    let none = b.element(array, vec![]);
    b.expr_stmt(none);

    let array = b.path(x, &["F"]);
    let (zero, one) = (b.int(0), b.int(1));
    let two = b.element(
        array,
        vec![Argument::positional(zero), Argument::positional(one)],
    );
    b.expr_stmt(two);

    let body = b.finish();
    let diagnostics = assert_codes!(env, body, [IndexArgumentCount, IndexArgumentCount]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @r"
    error[index-argument-count]: Wrong number of indices inside []; expected 1, found 0 (at 0:5)
    error[index-argument-count]: Wrong number of indices inside []; expected 1, found 2 (at 7:16)
    ");
}

#[test]
fn test_named_argument_and_modifier_are_both_reported() {
    let env = env();
    let mut b = MethodBuilder::new("NamedRef");
    let x = b.initialized_local("x", env.holder);
    let array = b.path(x, &["F"]);
    let zero = b.int(0);
    let access = b.element(
        array,
        vec![Argument {
            value: zero,
            name: Some("index".to_string()),
            modifier: ArgModifier::Ref,
        }],
    );
    b.expr_stmt(access);
    let body = b.finish();

    assert_eq!(body.source, "x.F[index: ref 0];\n");
    let diagnostics = assert_codes!(env, body, [NamedIndexArgument, IndexArgumentModifier]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @r"
    error[named-index-argument]: Inline array element access cannot use the named argument 'index' (at 0:17)
    error[index-argument-modifier]: Argument of an inline array element access may not be passed with the 'ref' keyword (at 15:16)
    ");
}

#[test]
fn test_indexing_a_non_array_field() {
    let env = env();
    let mut b = MethodBuilder::new("NotIndexable");
    let x = b.initialized_local("x", env.holder);
    let g = b.path(x, &["G"]);
    let zero = b.int(0);
    let access = b.index(g, zero);
    b.expr_stmt(access);
    let body = b.finish();

    let diagnostics = assert_codes!(env, body, [NotIndexable]);
    insta::assert_snapshot!(diagnostic_lines(&diagnostics), @"error[not-indexable]: Cannot apply indexing with [] to an expression of type 'int' (at 0:3)");
}

#[test]
fn test_nested_inline_arrays() {
    let env = env();
    let mut b = MethodBuilder::new("Nested");
    let n = b.initialized_local("n", env.nested);

    let outer = b.path(n, &["F"]);
    let one = b.int(1);
    let row = b.index(outer, one);
    let two = b.int(2);
    let cell = b.index(row, two);
    b.expr_stmt(cell);

    // Only the inner access is out of bounds
    let outer = b.path(n, &["F"]);
    let two = b.int(2);
    let row = b.index(outer, two);
    let zero = b.int(0);
    let cell = b.index(row, zero);
    b.expr_stmt(cell);

    let body = b.finish();
    let diagnostics = assert_codes!(env, body, [IndexOutOfBounds]);
    assert_eq!(
        diagnostics.all()[0].message,
        "Index 2 is outside the bounds of the inline array of length 2"
    );
}

#[test]
fn test_span_receivers_have_no_constant_bounds() {
    let env = env();
    let mut b = MethodBuilder::new("SpanReceiver");
    let s = b.parameter("s", ParameterKind::Value, env.span);

    let span = b.var(s);
    let hundred = b.int(100);
    let element = b.index(span, hundred);
    b.expr_stmt(element);

    let span = b.var(s);
    let one = b.int(1);
    let tail = b.range(Some(one), None);
    let slice = b.index(span, tail);
    b.expr_stmt(slice);

    let body = b.finish();
    assert_valid!(env, body);
}

#[test]
fn test_conditional_access_on_class_holder() {
    let env = env();
    let mut b = MethodBuilder::new("Conditional");
    let c = b.parameter("c", ParameterKind::Value, env.class_holder);
    let c = b.var(c);
    let access = b.conditional(c, |b, receiver| {
        let array = b.field(receiver, "F");
        let zero = b.int(0);
        b.index(array, zero)
    });
    b.expr_stmt(access);
    let body = b.finish();

    assert_eq!(body.text(access), "c?.F[0]");
    assert_valid!(env, body);
}

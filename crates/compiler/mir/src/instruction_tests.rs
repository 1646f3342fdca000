use fixbuf_compiler_semantic::{BinaryOp, SpanKind, VariableId};

use crate::{Instruction, InstructionKind, PrettyPrint, TempId, Value, ValueId};

fn v(index: usize) -> ValueId {
    ValueId::from_usize(index)
}

#[test]
fn test_destination_and_used_values() {
    let add = Instruction::binary_op(BinaryOp::Add, v(2), Value::operand(v(0)), Value::integer(1));
    assert_eq!(add.destination(), Some(v(2)));
    assert_eq!(add.used_values(), vec![Value::operand(v(0)), Value::integer(1)]);

    let store = Instruction::store(Value::operand(v(2)), Value::integer(7));
    assert_eq!(store.destination(), None);

    let void_call = Instruction::new(InstructionKind::Call {
        dest: None,
        callee: "Use".to_string(),
        args: vec![Value::operand(v(1))],
    });
    assert_eq!(void_call.destination(), None);
    assert_eq!(void_call.used_values(), vec![Value::operand(v(1))]);
}

#[test]
fn test_pretty_print_forms() {
    let t0 = TempId::from_usize(0);
    let instructions = vec![
        Instruction::address_of(v(0), VariableId::from_usize(0), "x"),
        Instruction::field_address(v(1), Value::operand(v(0)), "F"),
        Instruction::new(InstructionKind::SpanProjection {
            dest: v(2),
            address: Value::operand(v(1)),
            kind: SpanKind::ReadOnlySpan,
            array: "Buffer10".to_string(),
            element: "int".to_string(),
            length: 10,
        }),
        Instruction::store_temp(t0, Value::operand(v(2))),
        Instruction::new(InstructionKind::MakeIndex {
            dest: v(3),
            value: Value::integer(1),
            from_end: true,
        }),
        Instruction::return_value(None),
    ];
    let printed: Vec<_> = instructions.iter().map(|i| i.pretty_print(0)).collect();
    assert_eq!(
        printed,
        vec![
            "%0 = &x",
            "%1 = &%0.F",
            "%2 = as_readonly_span<Buffer10, int>(%1, 10)",
            "$t0 = %2",
            "%3 = make_index ^1",
            "return",
        ]
    );
}

#[test]
fn test_guard_body_is_indented() {
    let guard = Instruction::new(InstructionKind::NullGuard {
        dest: v(1),
        tested: Value::operand(v(0)),
        body: vec![Instruction::load(v(2), Value::operand(v(0))).with_comment("inner")],
        result: Value::operand(v(2)),
    });
    assert_eq!(
        guard.pretty_print(1),
        "  %1 = guard %0 {\n    %2 = load %0  // inner\n  } -> %2"
    );
}

#[test]
fn test_comment_trails_its_instruction() {
    let load = Instruction::load(v(1), Value::operand(v(0))).with_comment("read x");
    assert_eq!(load.pretty_print(0), "%1 = load %0  // read x");
}

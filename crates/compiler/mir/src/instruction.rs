//! # MIR Instructions
//!
//! This module defines the instruction types for MIR.
//! Instructions are in three-address form and define at most one value.

use chumsky::span::SimpleSpan;
use fixbuf_compiler_semantic::{BinaryOp, SpanKind, TypeId, VariableId};

use crate::{indent_str, PrettyPrint, TempId, Value, ValueId};

/// A single MIR instruction
///
/// # Design Notes
///
/// - Each instruction has at most one operation
/// - Instructions can define at most one value
/// - Source location is preserved for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The kind of instruction and its operands
    pub kind: InstructionKind,

    /// Source location for diagnostics and debugging
    pub source_span: Option<SimpleSpan<usize>>,

    /// Optional comment for debugging
    pub comment: Option<String>,
}

/// The different kinds of instructions available in MIR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    /// Address of a variable slot: `dest = &name`
    AddressOf {
        dest: ValueId,
        variable: VariableId,
        name: String,
    },

    /// Address of a temporary: `dest = &$tN`
    TempAddress { dest: ValueId, temp: TempId },

    /// Address of a field: `dest = &base.field`
    /// `base` is either an address (struct storage) or an object reference (class)
    FieldAddress {
        dest: ValueId,
        base: Value,
        field: String,
    },

    /// Load from memory: `dest = load address`
    Load { dest: ValueId, address: Value },

    /// Store to memory: `store address, value`
    Store { address: Value, value: Value },

    /// Store into a compiler temporary: `$tN = value`
    StoreTemp { temp: TempId, value: Value },

    /// Bind a ref local to an address: `bind name, address`
    BindRef {
        variable: VariableId,
        name: String,
        address: Value,
    },

    /// Default value of a type: `dest = default T`
    Default {
        dest: ValueId,
        ty: TypeId,
        type_name: String,
    },

    /// Method call: `dest = call callee(args)`
    /// By-reference arguments are passed as addresses; a by-reference call
    /// result is an address
    Call {
        dest: Option<ValueId>,
        callee: String,
        args: Vec<Value>,
    },

    /// View an inline array as a span: `dest = as_span<Array, Element>(address, length)`
    SpanProjection {
        dest: ValueId,
        address: Value,
        kind: SpanKind,
        array: String,
        element: String,
        length: usize,
    },

    /// Number of elements of a span: `dest = length span`
    SpanLength { dest: ValueId, span: Value },

    /// Offset of an `Index` within a sequence of `length` elements
    IndexGetOffset {
        dest: ValueId,
        index: Value,
        length: Value,
    },

    /// Build an `Index` value: `dest = make_index [^]value`
    MakeIndex {
        dest: ValueId,
        value: Value,
        from_end: bool,
    },

    /// Build a `Range` value from two `Index` values
    MakeRange {
        dest: ValueId,
        start: Value,
        end: Value,
    },

    /// `Index` at the start of a range
    RangeStart { dest: ValueId, range: Value },

    /// `Index` at the end of a range
    RangeEnd { dest: ValueId, range: Value },

    /// Binary operation: `dest = left op right`
    BinaryOp {
        op: BinaryOp,
        dest: ValueId,
        left: Value,
        right: Value,
    },

    /// Address of a span element: `dest = index span, offset`
    SpanIndex {
        dest: ValueId,
        span: Value,
        index: Value,
    },

    /// Sub-span: `dest = slice span, start, count`
    SpanSlice {
        dest: ValueId,
        span: Value,
        start: Value,
        count: Value,
    },

    /// Runtime conversion of a dynamic value to an int index
    DynamicConvert { dest: ValueId, value: Value },

    /// Run `body` only when `tested` is not null; `dest` is `result` or null
    NullGuard {
        dest: ValueId,
        tested: Value,
        body: Vec<Instruction>,
        result: Value,
    },

    /// Return from the method
    Return { value: Option<Value> },
}

impl Instruction {
    pub const fn new(kind: InstructionKind) -> Self {
        Self {
            kind,
            source_span: None,
            comment: None,
        }
    }

    pub fn address_of(dest: ValueId, variable: VariableId, name: impl Into<String>) -> Self {
        Self::new(InstructionKind::AddressOf {
            dest,
            variable,
            name: name.into(),
        })
    }

    pub const fn temp_address(dest: ValueId, temp: TempId) -> Self {
        Self::new(InstructionKind::TempAddress { dest, temp })
    }

    pub fn field_address(dest: ValueId, base: Value, field: impl Into<String>) -> Self {
        Self::new(InstructionKind::FieldAddress {
            dest,
            base,
            field: field.into(),
        })
    }

    pub const fn load(dest: ValueId, address: Value) -> Self {
        Self::new(InstructionKind::Load { dest, address })
    }

    pub const fn store(address: Value, value: Value) -> Self {
        Self::new(InstructionKind::Store { address, value })
    }

    pub const fn store_temp(temp: TempId, value: Value) -> Self {
        Self::new(InstructionKind::StoreTemp { temp, value })
    }

    pub const fn binary_op(op: BinaryOp, dest: ValueId, left: Value, right: Value) -> Self {
        Self::new(InstructionKind::BinaryOp {
            op,
            dest,
            left,
            right,
        })
    }

    pub const fn return_value(value: Option<Value>) -> Self {
        Self::new(InstructionKind::Return { value })
    }

    pub const fn with_span(mut self, span: SimpleSpan<usize>) -> Self {
        self.source_span = Some(span);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The value this instruction defines, if any
    pub const fn destination(&self) -> Option<ValueId> {
        match &self.kind {
            InstructionKind::AddressOf { dest, .. }
            | InstructionKind::TempAddress { dest, .. }
            | InstructionKind::FieldAddress { dest, .. }
            | InstructionKind::Load { dest, .. }
            | InstructionKind::Default { dest, .. }
            | InstructionKind::SpanProjection { dest, .. }
            | InstructionKind::SpanLength { dest, .. }
            | InstructionKind::IndexGetOffset { dest, .. }
            | InstructionKind::MakeIndex { dest, .. }
            | InstructionKind::MakeRange { dest, .. }
            | InstructionKind::RangeStart { dest, .. }
            | InstructionKind::RangeEnd { dest, .. }
            | InstructionKind::BinaryOp { dest, .. }
            | InstructionKind::SpanIndex { dest, .. }
            | InstructionKind::SpanSlice { dest, .. }
            | InstructionKind::DynamicConvert { dest, .. }
            | InstructionKind::NullGuard { dest, .. } => Some(*dest),
            InstructionKind::Call { dest, .. } => *dest,
            InstructionKind::Store { .. }
            | InstructionKind::StoreTemp { .. }
            | InstructionKind::BindRef { .. }
            | InstructionKind::Return { .. } => None,
        }
    }

    /// Operands read by this instruction, not including a guard body
    pub fn used_values(&self) -> Vec<Value> {
        match &self.kind {
            InstructionKind::AddressOf { .. }
            | InstructionKind::TempAddress { .. }
            | InstructionKind::Default { .. } => vec![],
            InstructionKind::FieldAddress { base, .. } => vec![*base],
            InstructionKind::Load { address, .. } => vec![*address],
            InstructionKind::Store { address, value } => vec![*address, *value],
            InstructionKind::StoreTemp { value, .. } => vec![*value],
            InstructionKind::BindRef { address, .. } => vec![*address],
            InstructionKind::Call { args, .. } => args.clone(),
            InstructionKind::SpanProjection { address, .. } => vec![*address],
            InstructionKind::SpanLength { span, .. } => vec![*span],
            InstructionKind::IndexGetOffset { index, length, .. } => vec![*index, *length],
            InstructionKind::MakeIndex { value, .. } => vec![*value],
            InstructionKind::MakeRange { start, end, .. } => vec![*start, *end],
            InstructionKind::RangeStart { range, .. } | InstructionKind::RangeEnd { range, .. } => {
                vec![*range]
            }
            InstructionKind::BinaryOp { left, right, .. } => vec![*left, *right],
            InstructionKind::SpanIndex { span, index, .. } => vec![*span, *index],
            InstructionKind::SpanSlice {
                span, start, count, ..
            } => vec![*span, *start, *count],
            InstructionKind::DynamicConvert { value, .. } => vec![*value],
            InstructionKind::NullGuard { tested, result, .. } => vec![*tested, *result],
            InstructionKind::Return { value } => value.iter().copied().collect(),
        }
    }
}

fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.pretty_print(0))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PrettyPrint for Instruction {
    fn pretty_print(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        let mut result = String::new();

        let line = match &self.kind {
            InstructionKind::AddressOf { dest, name, .. } => {
                format!("{} = &{name}", dest.pretty_print(0))
            }
            InstructionKind::TempAddress { dest, temp } => {
                format!("{} = &{}", dest.pretty_print(0), Value::temp(*temp))
            }
            InstructionKind::FieldAddress { dest, base, field } => {
                format!("{} = &{base}.{field}", dest.pretty_print(0))
            }
            InstructionKind::Load { dest, address } => {
                format!("{} = load {address}", dest.pretty_print(0))
            }
            InstructionKind::Store { address, value } => format!("store {address}, {value}"),
            InstructionKind::StoreTemp { temp, value } => {
                format!("{} = {value}", Value::temp(*temp))
            }
            InstructionKind::BindRef { name, address, .. } => format!("bind {name}, {address}"),
            InstructionKind::Default {
                dest, type_name, ..
            } => format!("{} = default {type_name}", dest.pretty_print(0)),
            InstructionKind::Call { dest, callee, args } => match dest {
                Some(dest) => format!("{} = call {callee}({})", dest.pretty_print(0), join(args)),
                None => format!("call {callee}({})", join(args)),
            },
            InstructionKind::SpanProjection {
                dest,
                address,
                kind,
                array,
                element,
                length,
            } => {
                let accessor = if kind.is_readonly() {
                    "as_readonly_span"
                } else {
                    "as_span"
                };
                format!(
                    "{} = {accessor}<{array}, {element}>({address}, {length})",
                    dest.pretty_print(0)
                )
            }
            InstructionKind::SpanLength { dest, span } => {
                format!("{} = length {span}", dest.pretty_print(0))
            }
            InstructionKind::IndexGetOffset {
                dest,
                index,
                length,
            } => format!("{} = getoffset {index}, {length}", dest.pretty_print(0)),
            InstructionKind::MakeIndex {
                dest,
                value,
                from_end,
            } => {
                let hat = if *from_end { "^" } else { "" };
                format!("{} = make_index {hat}{value}", dest.pretty_print(0))
            }
            InstructionKind::MakeRange { dest, start, end } => {
                format!("{} = make_range {start}, {end}", dest.pretty_print(0))
            }
            InstructionKind::RangeStart { dest, range } => {
                format!("{} = range.start {range}", dest.pretty_print(0))
            }
            InstructionKind::RangeEnd { dest, range } => {
                format!("{} = range.end {range}", dest.pretty_print(0))
            }
            InstructionKind::BinaryOp {
                op,
                dest,
                left,
                right,
            } => format!("{} = {left} {op} {right}", dest.pretty_print(0)),
            InstructionKind::SpanIndex { dest, span, index } => {
                format!("{} = index {span}, {index}", dest.pretty_print(0))
            }
            InstructionKind::SpanSlice {
                dest,
                span,
                start,
                count,
            } => format!("{} = slice {span}, {start}, {count}", dest.pretty_print(0)),
            InstructionKind::DynamicConvert { dest, value } => {
                format!("{} = convert.dynamic {value}", dest.pretty_print(0))
            }
            InstructionKind::NullGuard {
                dest,
                tested,
                body,
                result,
            } => {
                let mut guard = format!("{} = guard {tested} {{\n", dest.pretty_print(0));
                for instruction in body {
                    guard.push_str(&instruction.pretty_print(indent + 1));
                    guard.push('\n');
                }
                guard.push_str(&format!("{pad}}} -> {result}"));
                guard
            }
            InstructionKind::Return { value } => match value {
                Some(value) => format!("return {value}"),
                None => "return".to_string(),
            },
        };

        result.push_str(&pad);
        result.push_str(&line);
        if let Some(comment) = &self.comment {
            result.push_str(&format!("  // {comment}"));
        }
        result
    }
}

impl PrettyPrint for ValueId {
    fn pretty_print(&self, _indent: usize) -> String {
        format!("%{}", self.index())
    }
}

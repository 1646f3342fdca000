//! # Instruction Builder
//!
//! This module provides a fluent API for creating MIR instructions.
//! Methods that define a value allocate the destination and return it;
//! the others return the builder for chaining.

use chumsky::span::SimpleSpan;
use fixbuf_compiler_semantic::{BinaryOp, SpanKind, TypeId, VariableId};

use crate::{Instruction, InstructionKind, MirFunction, TempId, Value, ValueId};

/// A builder for creating MIR instructions with a fluent API
///
/// Instructions go to `target`, which is either the function body or the body
/// of the null guard being built. Every instruction is tagged with `span`.
pub struct InstrBuilder<'f> {
    function: &'f mut MirFunction,
    target: &'f mut Vec<Instruction>,
    span: Option<SimpleSpan<usize>>,
}

impl<'f> InstrBuilder<'f> {
    pub const fn new(
        function: &'f mut MirFunction,
        target: &'f mut Vec<Instruction>,
        span: Option<SimpleSpan<usize>>,
    ) -> Self {
        Self {
            function,
            target,
            span,
        }
    }

    /// Add an instruction to the current target
    pub fn add_instruction(&mut self, mut instruction: Instruction) {
        if instruction.source_span.is_none() {
            instruction.source_span = self.span;
        }
        self.target.push(instruction);
    }

    fn define(&mut self, make: impl FnOnce(ValueId) -> InstructionKind) -> ValueId {
        let dest = self.function.new_value_id();
        self.add_instruction(Instruction::new(make(dest)));
        dest
    }

    /// Allocates a temporary without emitting anything
    pub fn temp(&mut self) -> TempId {
        self.function.new_temp()
    }

    /// Allocates a value ID without emitting anything
    pub fn value_id(&mut self) -> ValueId {
        self.function.new_value_id()
    }

    pub fn address_of(&mut self, variable: VariableId, name: &str) -> ValueId {
        let dest = self.function.new_value_id();
        self.add_instruction(Instruction::address_of(dest, variable, name));
        dest
    }

    pub fn temp_address(&mut self, temp: TempId) -> ValueId {
        self.define(|dest| InstructionKind::TempAddress { dest, temp })
    }

    pub fn field_address(&mut self, base: Value, field: &str) -> ValueId {
        let dest = self.function.new_value_id();
        self.add_instruction(Instruction::field_address(dest, base, field));
        dest
    }

    pub fn load(&mut self, address: Value) -> ValueId {
        self.define(|dest| InstructionKind::Load { dest, address })
    }

    /// Create and add a load instruction with a comment
    pub fn load_with(&mut self, address: Value, comment: String) -> ValueId {
        let dest = self.function.new_value_id();
        self.add_instruction(Instruction::load(dest, address).with_comment(comment));
        dest
    }

    pub fn store(&mut self, address: Value, value: Value) -> &mut Self {
        self.add_instruction(Instruction::store(address, value));
        self
    }

    pub fn store_temp(&mut self, temp: TempId, value: Value) -> &mut Self {
        self.add_instruction(Instruction::store_temp(temp, value));
        self
    }

    /// Spill a value to a fresh temporary and return the temporary
    pub fn spill(&mut self, value: Value) -> TempId {
        let temp = self.function.new_temp();
        self.store_temp(temp, value);
        temp
    }

    pub fn bind_ref(&mut self, variable: VariableId, name: &str, address: Value) -> &mut Self {
        self.add_instruction(Instruction::new(InstructionKind::BindRef {
            variable,
            name: name.to_string(),
            address,
        }));
        self
    }

    pub fn default_value(&mut self, ty: TypeId, type_name: String) -> ValueId {
        self.define(|dest| InstructionKind::Default {
            dest,
            ty,
            type_name,
        })
    }

    /// Create and add a call whose result is used
    pub fn call(&mut self, callee: &str, args: Vec<Value>) -> ValueId {
        let dest = self.function.new_value_id();
        self.add_instruction(Instruction::new(InstructionKind::Call {
            dest: Some(dest),
            callee: callee.to_string(),
            args,
        }));
        dest
    }

    /// Create and add a call whose result is discarded
    pub fn call_void(&mut self, callee: &str, args: Vec<Value>) -> &mut Self {
        self.add_instruction(Instruction::new(InstructionKind::Call {
            dest: None,
            callee: callee.to_string(),
            args,
        }));
        self
    }

    pub fn span_projection(
        &mut self,
        address: Value,
        kind: SpanKind,
        array: String,
        element: String,
        length: usize,
    ) -> ValueId {
        self.define(|dest| InstructionKind::SpanProjection {
            dest,
            address,
            kind,
            array,
            element,
            length,
        })
    }

    pub fn span_length(&mut self, span: Value) -> ValueId {
        self.define(|dest| InstructionKind::SpanLength { dest, span })
    }

    pub fn index_get_offset(&mut self, index: Value, length: Value) -> ValueId {
        self.define(|dest| InstructionKind::IndexGetOffset {
            dest,
            index,
            length,
        })
    }

    pub fn make_index(&mut self, value: Value, from_end: bool) -> ValueId {
        self.define(|dest| InstructionKind::MakeIndex {
            dest,
            value,
            from_end,
        })
    }

    pub fn make_range(&mut self, start: Value, end: Value) -> ValueId {
        self.define(|dest| InstructionKind::MakeRange { dest, start, end })
    }

    pub fn range_start(&mut self, range: Value) -> ValueId {
        self.define(|dest| InstructionKind::RangeStart { dest, range })
    }

    pub fn range_end(&mut self, range: Value) -> ValueId {
        self.define(|dest| InstructionKind::RangeEnd { dest, range })
    }

    /// Create and add a binary operation instruction
    pub fn binary_op(&mut self, op: BinaryOp, left: Value, right: Value) -> ValueId {
        let dest = self.function.new_value_id();
        self.add_instruction(Instruction::binary_op(op, dest, left, right));
        dest
    }

    pub fn span_index(&mut self, span: Value, index: Value) -> ValueId {
        self.define(|dest| InstructionKind::SpanIndex { dest, span, index })
    }

    pub fn span_slice(&mut self, span: Value, start: Value, count: Value) -> ValueId {
        self.define(|dest| InstructionKind::SpanSlice {
            dest,
            span,
            start,
            count,
        })
    }

    pub fn dynamic_convert(&mut self, value: Value) -> ValueId {
        self.define(|dest| InstructionKind::DynamicConvert { dest, value })
    }

    /// Add a null guard whose destination was allocated before its body was built
    pub fn null_guard(
        &mut self,
        dest: ValueId,
        tested: Value,
        body: Vec<Instruction>,
        result: Value,
    ) -> &mut Self {
        self.add_instruction(Instruction::new(InstructionKind::NullGuard {
            dest,
            tested,
            body,
            result,
        }));
        self
    }

    pub fn return_value(&mut self, value: Option<Value>) -> &mut Self {
        self.add_instruction(Instruction::return_value(value));
        self
    }
}

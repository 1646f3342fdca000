//! # MIR Function
//!
//! This module defines the function-level MIR representation: a flat list of
//! instructions, where only null guards nest further instructions.

use fixbuf_compiler_semantic::{ReturnKind, VariableId};

use crate::{indent_str, Instruction, InstructionKind, PrettyPrint, TempId, ValueId};

/// The MIR for a single method
///
/// # Design Notes
///
/// - Values are numbered per function and each is defined exactly once
/// - Temporaries are numbered separately; they may be stored to repeatedly
/// - Parameters keep the declaration order of the method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirFunction {
    /// The name of the method
    pub name: String,

    /// Parameter variables, in signature order
    pub parameters: Vec<VariableId>,

    /// The receiver of an instance method
    pub this: Option<VariableId>,

    pub return_kind: ReturnKind,

    pub instructions: Vec<Instruction>,

    /// Next available value ID
    pub(crate) value_count: usize,

    /// Next available temporary ID
    pub(crate) temp_count: usize,
}

impl MirFunction {
    /// Creates a new empty function with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            this: None,
            return_kind: ReturnKind::Void,
            instructions: Vec::new(),
            value_count: 0,
            temp_count: 0,
        }
    }

    /// Allocates a fresh value ID
    pub fn new_value_id(&mut self) -> ValueId {
        let id = ValueId::from_usize(self.value_count);
        self.value_count += 1;
        id
    }

    /// Allocates a fresh temporary
    pub fn new_temp(&mut self) -> TempId {
        let id = TempId::from_usize(self.temp_count);
        self.temp_count += 1;
        id
    }

    pub const fn value_count(&self) -> usize {
        self.value_count
    }

    pub const fn temp_count(&self) -> usize {
        self.temp_count
    }

    /// Visits every instruction, descending into guard bodies
    pub fn for_each_instruction(&self, mut f: impl FnMut(&Instruction)) {
        fn walk(instructions: &[Instruction], f: &mut impl FnMut(&Instruction)) {
            for instruction in instructions {
                f(instruction);
                if let InstructionKind::NullGuard { body, .. } = &instruction.kind {
                    walk(body, f);
                }
            }
        }
        walk(&self.instructions, &mut f);
    }

    /// Names of the well-known span helpers this function calls, in call order
    pub fn span_operations(&self) -> Vec<&'static str> {
        let mut operations = Vec::new();
        self.for_each_instruction(|instruction| {
            let name = match &instruction.kind {
                InstructionKind::SpanProjection { kind, .. } if kind.is_readonly() => {
                    "as_readonly_span"
                }
                InstructionKind::SpanProjection { .. } => "as_span",
                InstructionKind::SpanLength { .. } => "length",
                InstructionKind::IndexGetOffset { .. } => "getoffset",
                InstructionKind::RangeStart { .. } => "range.start",
                InstructionKind::RangeEnd { .. } => "range.end",
                InstructionKind::SpanIndex { .. } => "index",
                InstructionKind::SpanSlice { .. } => "slice",
                _ => return,
            };
            operations.push(name);
        });
        operations
    }
}

impl PrettyPrint for MirFunction {
    fn pretty_print(&self, indent: usize) -> String {
        let base_indent = indent_str(indent);
        let mut result = format!("{base_indent}fn {} {{\n", self.name);
        for instruction in &self.instructions {
            result.push_str(&instruction.pretty_print(indent + 1));
            result.push('\n');
        }
        result.push_str(&format!("{base_indent}}}\n"));
        result
    }
}

//! # Inline Array Intermediate Representation (MIR)
//!
//! This crate defines the instruction-level representation validated method
//! bodies are lowered to, and the lowering itself. Every element access on an
//! inline array becomes an explicit sequence:
//!
//! ```text
//! receiver address -> span accessor -> store to temporary -> operands -> index/slice -> load
//! ```
//!
//! ## Architecture
//!
//! ```text
//! MirFunction
//! instructions: Vec<Instruction>
//! value_count / temp_count
//!
//! Instruction
//! kind: InstructionKind (three-address form, at most one definition)
//! source_span: span of the expression it came from
//! ```
//!
//! Conditional accesses (`a?.F[i]`) are the only nesting: a `guard` instruction
//! owns the instructions that run when the receiver is not null.
//!
//! ## Integration with Semantic Analysis
//!
//! Lowering reuses the binding done by the semantic crate ([`bind_access`]),
//! so the span kind, the operand classification and the required members are
//! decided in exactly one place. Only methods without errors are lowered.
//!
//! [`bind_access`]: fixbuf_compiler_semantic::bind_access

pub use builder::InstrBuilder;
pub use function::MirFunction;
pub use instruction::{Instruction, InstructionKind};
pub use lowering::{lower_method, lower_program, LoweringError};
pub use value::{Literal, Value};

pub mod builder;
pub mod function;
pub mod instruction;
pub mod lowering;
pub mod value;

#[cfg(test)]
mod instruction_tests;

// --- Core Identifiers ---

index_vec::define_index_type! {
    /// Unique identifier for a value (virtual register) within a function
    pub struct ValueId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a compiler temporary within a function
    ///
    /// Temporaries hold spans and spilled receivers; unlike values they have
    /// an address.
    pub struct TempId = usize;
}

// --- Pretty Printing Support ---

/// Trait for pretty-printing MIR constructs
pub trait PrettyPrint {
    fn pretty_print(&self, indent: usize) -> String;
}

/// Helper function to create indentation
pub(crate) fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

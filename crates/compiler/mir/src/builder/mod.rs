//! # MIR Builder Components
//!
//! Builders used while lowering. `InstrBuilder` appends instructions to the
//! list currently being filled and allocates their destinations.

mod instr_builder;

pub use instr_builder::InstrBuilder;

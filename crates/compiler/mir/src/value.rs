//! # MIR Values
//!
//! This module defines values and operands in the MIR system.
//! Values represent data that flows through the program.

use crate::{PrettyPrint, TempId, ValueId};

/// Represents any operand of an instruction: literals, computed values and temporaries
///
/// # Design Notes
///
/// - Literals are embedded directly
/// - Operands reference values computed by instructions
/// - Temporaries are read by name; their address is taken with `TempAddress`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum Value {
    /// A constant literal value
    Literal(Literal),

    /// An operand that references a computed value
    /// The `ValueId` points to the instruction that produces this value
    Operand(ValueId),

    /// The current contents of a compiler temporary
    Temp(TempId),
}

/// Literal constant values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum Literal {
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// Creates a new integer literal value
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a new boolean literal value
    pub const fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Creates a new operand value
    pub const fn operand(id: ValueId) -> Self {
        Self::Operand(id)
    }

    pub const fn temp(id: TempId) -> Self {
        Self::Temp(id)
    }
}

impl PrettyPrint for Value {
    fn pretty_print(&self, _indent: usize) -> String {
        match self {
            Self::Literal(lit) => lit.pretty_print(0),
            Self::Operand(id) => format!("%{}", id.index()),
            Self::Temp(id) => format!("$t{}", id.index()),
        }
    }
}

impl PrettyPrint for Literal {
    fn pretty_print(&self, _indent: usize) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Boolean(value) => value.to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_print(0))
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_print(0))
    }
}

// Convenience conversion methods
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<ValueId> for Value {
    fn from(id: ValueId) -> Self {
        Self::operand(id)
    }
}

impl From<TempId> for Value {
    fn from(id: TempId) -> Self {
        Self::temp(id)
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

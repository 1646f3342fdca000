//! # Expression Tree
//!
//! Method bodies are arenas of expressions addressed by `ExprId`. The tree covers
//! what an inline array access can be built from: variables, field chains, calls,
//! index and range operands, span conversions and null-conditional accesses.

use std::fmt;

use chumsky::span::SimpleSpan;

use crate::types::TypeId;

index_vec::define_index_type! {
    pub struct ExprId = usize;
    MAX_INDEX = usize::MAX;
}

index_vec::define_index_type! {
    pub struct VariableId = usize;
    MAX_INDEX = usize::MAX;
}

/// Modifier written in front of an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArgModifier {
    #[default]
    None,
    Ref,
    In,
    Out,
}

impl fmt::Display for ArgModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Ref => write!(f, "ref"),
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub value: ExprId,
    pub name: Option<String>,
    pub modifier: ArgModifier,
}

impl Argument {
    pub const fn positional(value: ExprId) -> Self {
        Self {
            value,
            name: None,
            modifier: ArgModifier::None,
        }
    }

    pub const fn with_modifier(value: ExprId, modifier: ArgModifier) -> Self {
        Self {
            value,
            name: None,
            modifier,
        }
    }
}

/// How a method or call hands back its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnKind {
    #[default]
    Void,
    Value,
    Ref,
    RefReadonly,
}

impl ReturnKind {
    pub const fn is_by_ref(self) -> bool {
        matches!(self, Self::Ref | Self::RefReadonly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Variable(VariableId),
    Field {
        receiver: ExprId,
        field: String,
    },
    /// Call to a method outside the body; only its result shape matters
    Call {
        callee: String,
        returns: ReturnKind,
        ty: TypeId,
    },
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(String),
    /// `^n`
    FromEnd(ExprId),
    /// `a..b`, either bound may be omitted
    Range {
        start: Option<ExprId>,
        end: Option<ExprId>,
    },
    Default(TypeId),
    ElementAccess {
        receiver: ExprId,
        args: Vec<Argument>,
    },
    /// Explicit or implicit conversion of an inline array to a span
    SpanConversion {
        operand: ExprId,
        readonly: bool,
    },
    /// `receiver?.access`; `access` refers back to the receiver through
    /// [`ExprKind::ConditionalReceiver`]
    ConditionalAccess {
        receiver: ExprId,
        access: ExprId,
    },
    /// The already evaluated, non-null receiver of the enclosing conditional access
    ConditionalReceiver(ExprId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SimpleSpan<usize>,
}

impl Expr {
    pub fn is_element_access(&self) -> bool {
        matches!(self.kind, ExprKind::ElementAccess { .. })
    }
}

//! # Inline Array Semantic Analysis
//!
//! Typed method bodies in, diagnostics out. The analysis answers three
//! questions about every element access on an inline array (or a span viewing
//! one):
//! 1. **Binding**: is the access well formed, and which runtime members does it need?
//! 2. **Projection**: is the receiver viewed as a `Span` or a `ReadOnlySpan`,
//!    and what storage does the view point into?
//! 3. **Ref safety and definite assignment**: may the result be written,
//!    passed by reference or returned, and is the storage assigned when read?
//!
//! ## Main entry points
//!
//! Build bodies with [`MethodBuilder`], then run [`validate_method`] or
//! [`validate_program`]. Well-known members are supplied by the caller through
//! [`WellKnownMembers`].

pub mod access;
pub mod builder;
pub mod context;
pub mod escape;
pub mod expr;
pub mod method;
pub mod place;
pub mod program;
pub mod projection;
pub mod type_resolution;
pub mod types;
pub mod validation;
pub mod visitor;
pub mod well_known;

pub use access::{bind_access, BoundAccess, IndexOperand, RangeBound, ReceiverShape};
pub use builder::MethodBuilder;
pub use context::SemanticContext;
pub use escape::{EscapeScope, Storage, StorageOrigin};
pub use expr::{
    ArgModifier, Argument, BinaryOp, Expr, ExprId, ExprKind, ReturnKind, VariableId,
};
pub use method::{
    MethodBody, MethodKind, ParameterKind, Statement, StatementKind, Variable, VariableKind,
};
pub use place::PlaceExpr;
pub use program::{validate_method, validate_program, MethodReport, Program};
pub use projection::{project, storage_of, Projection, SpanKind};
pub use type_resolution::expression_type;
pub use types::{FieldDef, InlineArrayType, StructKind, StructType, TypeData, TypeError, TypeId, TypeTable};
pub use well_known::{MemberTable, UnknownMember, WellKnownMember, WellKnownMembers};

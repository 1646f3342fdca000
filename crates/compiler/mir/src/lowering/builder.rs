//! # MirBuilder
//!
//! This module contains the main builder struct for constructing a
//! `MirFunction` from a validated method body. The builder keeps the
//! instruction list being filled and the receivers of the conditional
//! accesses currently being lowered.

use chumsky::span::SimpleSpan;
use fixbuf_compiler_semantic::{
    ExprId, MethodBody, MethodKind, SemanticContext, TypeId, VariableId, VariableKind,
};
use rustc_hash::FxHashMap;

use crate::{InstrBuilder, Instruction, MirFunction, Value};

/// A builder that constructs a `MirFunction` from a method body
///
/// Guard bodies are built by swapping `current` out with [`MirBuilder::enter_guard`]
/// and back in with [`MirBuilder::exit_guard`].
pub struct MirBuilder<'a> {
    pub(super) ctx: SemanticContext<'a>,
    pub(super) function: MirFunction,
    /// Instructions of the innermost list being built
    current: Vec<Instruction>,
    /// Span of the statement being lowered
    span: Option<SimpleSpan<usize>>,
    /// Non-null receiver of each conditional access being lowered, keyed by
    /// the receiver expression its placeholder refers to
    pub(super) receivers: FxHashMap<ExprId, Value>,
}

impl<'a> MirBuilder<'a> {
    pub fn new(ctx: SemanticContext<'a>) -> Self {
        let method = ctx.method;
        let mut function = MirFunction::new(method.name.clone());
        function.return_kind = method.return_kind;
        function.parameters = method
            .variables
            .iter_enumerated()
            .filter(|(_, v)| matches!(v.kind, VariableKind::Parameter(_)))
            .map(|(id, _)| id)
            .collect();
        function.this = method.this_variable();

        Self {
            ctx,
            function,
            current: Vec::new(),
            span: None,
            receivers: FxHashMap::default(),
        }
    }

    pub fn method(&self) -> &'a MethodBody {
        self.ctx.method
    }

    /// Returns an instruction builder appending to the current list
    pub fn instr(&mut self) -> InstrBuilder<'_> {
        InstrBuilder::new(&mut self.function, &mut self.current, self.span)
    }

    pub(super) fn set_span(&mut self, span: SimpleSpan<usize>) {
        self.span = Some(span);
    }

    /// Start a guard body; the returned list must be passed to `exit_guard`
    pub(super) fn enter_guard(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.current)
    }

    /// Finish a guard body, returning its instructions
    pub(super) fn exit_guard(&mut self, outer: Vec<Instruction>) -> Vec<Instruction> {
        std::mem::replace(&mut self.current, outer)
    }

    /// Whether the slot of `variable` holds the address of its storage rather
    /// than the storage itself
    pub(super) fn holds_address(&self, variable: VariableId) -> bool {
        match self.ctx.variable(variable).kind {
            VariableKind::Parameter(kind) => kind.is_by_ref(),
            VariableKind::RefLocal { .. } => true,
            VariableKind::This => match self.method().kind {
                MethodKind::Instance { this_type, .. } => !self.ctx.types.is_class(this_type),
                MethodKind::Static => false,
            },
            VariableKind::Local => false,
        }
    }

    pub(super) fn type_name(&self, ty: TypeId) -> String {
        self.ctx.types.format_type(ty)
    }

    pub(super) fn text(&self, expr: ExprId) -> String {
        self.ctx.text(expr).to_string()
    }

    pub fn finish(mut self) -> MirFunction {
        self.function.instructions = std::mem::take(&mut self.current);
        self.function
    }
}

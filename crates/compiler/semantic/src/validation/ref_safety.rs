//! # Ref-Safety Validator
//!
//! Checks that references and spans into inline arrays never outlive their
//! storage and never allow writes through a read-only path.
//!
//! Each use site is run through an [`AccessCheck`]:
//! `Unchecked -> ScopeComputed -> {Accepted, Rejected}`. Terminal states are
//! final and every use is checked exactly once. Two checks do not depend on the
//! use site and run once per expression: a mutable span conversion of read-only
//! or non-addressable storage, and slicing an inline array that has no address.

use fixbuf_compiler_diagnostics::Diagnostic;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::access::{bind_access, ReceiverShape};
use crate::context::SemanticContext;
use crate::escape::{EscapeScope, Storage, StorageOrigin};
use crate::expr::{ArgModifier, ExprId, ExprKind, ReturnKind};
use crate::method::{MethodBody, Statement, StatementKind, VariableKind};
use crate::projection::storage_of;
use crate::type_resolution::expression_type;
use crate::validation::Validator;
use crate::visitor::{walk_expr, walk_statement, Usage, Visitor};

/// What an expression yields at its use site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// A reference to addressable storage
    Ref,
    /// A span value viewing some storage
    Span,
    /// A value with no address
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub shape: ResultShape,
    pub storage: Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    ScopeComputed(Outcome),
    Accepted,
    Rejected(Diagnostic),
}

impl CheckState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected(_))
    }
}

/// Ref-safety check of one expression at one use site
pub struct AccessCheck<'c, 'a> {
    ctx: &'c SemanticContext<'a>,
    expr: ExprId,
    usage: Usage,
    state: CheckState,
}

impl<'c, 'a> AccessCheck<'c, 'a> {
    pub const fn new(ctx: &'c SemanticContext<'a>, expr: ExprId, usage: Usage) -> Self {
        Self {
            ctx,
            expr,
            usage,
            state: CheckState::Unchecked,
        }
    }

    pub const fn state(&self) -> &CheckState {
        &self.state
    }

    /// Perform one transition; terminal states stay where they are
    pub fn advance(&mut self) {
        self.state = match std::mem::replace(&mut self.state, CheckState::Accepted) {
            CheckState::Unchecked => match self.compute() {
                Some(outcome) => CheckState::ScopeComputed(outcome),
                None => CheckState::Accepted,
            },
            CheckState::ScopeComputed(outcome) => match self.decide(&outcome) {
                Ok(()) => CheckState::Accepted,
                Err(diag) => CheckState::Rejected(diag),
            },
            terminal => terminal,
        };
    }

    /// Run to a terminal state and return the rejection, if any
    pub fn run(mut self) -> Option<Diagnostic> {
        while !self.state.is_terminal() {
            self.advance();
        }
        match self.state {
            CheckState::Rejected(diag) => Some(diag),
            _ => None,
        }
    }

    /// Classify the result and its storage; `None` for accesses that did not bind
    fn compute(&self) -> Option<Outcome> {
        let ctx = self.ctx;
        if ctx.expr(self.expr).is_element_access() {
            let bound = bind_access(ctx, self.expr).ok()?;
            let (storage, readonly) = match &bound.shape {
                ReceiverShape::InlineArray(projection) => {
                    (projection.storage.clone(), projection.kind.is_readonly())
                }
                ReceiverShape::Span { kind, storage, .. } => (
                    Storage {
                        referenceable: true,
                        ..storage.clone()
                    },
                    kind.is_readonly(),
                ),
            };
            let shape = if bound.is_slice() {
                ResultShape::Span
            } else if storage.referenceable {
                ResultShape::Ref
            } else {
                ResultShape::Value
            };
            return Some(Outcome {
                shape,
                storage: Storage { readonly, ..storage },
            });
        }

        let storage = storage_of(ctx, self.expr);
        let shape = if ctx.types.is_span(expression_type(ctx, self.expr)) {
            ResultShape::Span
        } else if storage.referenceable {
            ResultShape::Ref
        } else {
            ResultShape::Value
        };
        Some(Outcome { shape, storage })
    }

    fn decide(&self, outcome: &Outcome) -> Result<(), Diagnostic> {
        let ctx = self.ctx;
        let node = ctx.expr(self.expr);
        let span = node.span;
        let text = ctx.text(self.expr);
        let is_variable = matches!(node.kind, ExprKind::Variable(_));
        let Outcome { shape, storage } = outcome;

        match self.usage {
            Usage::Read | Usage::Receiver | Usage::Argument(ArgModifier::None) => Ok(()),
            Usage::Argument(ArgModifier::In) => Ok(()),
            Usage::AssignTarget | Usage::CompoundTarget => match shape {
                ResultShape::Span if is_variable => Ok(()),
                ResultShape::Value | ResultShape::Span => Err(Diagnostic::lvalue_expected(span)),
                ResultShape::Ref if storage.readonly => {
                    Err(Diagnostic::readonly_assignment(text, span))
                }
                ResultShape::Ref => Ok(()),
            },
            Usage::Argument(ArgModifier::Ref | ArgModifier::Out) => match shape {
                ResultShape::Span if is_variable => Ok(()),
                ResultShape::Value | ResultShape::Span => {
                    Err(Diagnostic::ref_argument_not_assignable(span))
                }
                ResultShape::Ref if storage.readonly => {
                    Err(Diagnostic::readonly_ref_use(text, span))
                }
                ResultShape::Ref => Ok(()),
            },
            Usage::RefLocalInit { readonly } => match shape {
                ResultShape::Span if is_variable => Ok(()),
                ResultShape::Value | ResultShape::Span => {
                    Err(Diagnostic::non_referenceable(span))
                }
                ResultShape::Ref if storage.readonly && !readonly => {
                    Err(Diagnostic::readonly_ref_use(text, span))
                }
                ResultShape::Ref => Ok(()),
            },
            Usage::Return(kind @ (ReturnKind::Ref | ReturnKind::RefReadonly)) => match shape {
                ResultShape::Value => Err(Diagnostic::non_referenceable(span)),
                _ if kind == ReturnKind::Ref && storage.readonly => {
                    Err(Diagnostic::readonly_ref_use(text, span))
                }
                _ => check_escape(storage, span),
            },
            Usage::Return(ReturnKind::Value | ReturnKind::Void) => match shape {
                ResultShape::Span => check_escape(storage, span),
                ResultShape::Ref | ResultShape::Value => Ok(()),
            },
        }
    }
}

/// Reject storage that may not be referenced after the method returns
fn check_escape(storage: &Storage, span: chumsky::span::SimpleSpan<usize>) -> Result<(), Diagnostic> {
    if storage.referenceable && storage.scope.outlives(EscapeScope::ReturnOnly) {
        return Ok(());
    }
    Err(match &storage.origin {
        StorageOrigin::ValueParameter(name) => Diagnostic::return_parameter_member(name, span),
        StorageOrigin::StructReceiver => Diagnostic::return_struct_member(span),
        StorageOrigin::Local(name) => Diagnostic::return_local_member(name, span),
        StorageOrigin::ScopedParameter(name) => Diagnostic::return_scoped_parameter(name, span),
        StorageOrigin::RefLocal(name) => Diagnostic::return_ref_local(name, span),
        StorageOrigin::SpanLocal(name) => Diagnostic::span_may_escape(name, span),
        StorageOrigin::Temporary
        | StorageOrigin::Heap
        | StorageOrigin::RefParameter(_)
        | StorageOrigin::RefCall(_) => Diagnostic::non_referenceable(span),
    })
}

/// Checks that hold regardless of where the expression is used
fn intrinsic_check(ctx: &SemanticContext<'_>, expr: ExprId) -> Option<Diagnostic> {
    let node = ctx.expr(expr);
    match &node.kind {
        ExprKind::SpanConversion {
            operand,
            readonly: false,
        } => {
            let storage = storage_of(ctx, *operand);
            if !storage.referenceable {
                Some(Diagnostic::non_referenceable(node.span))
            } else if storage.readonly {
                Some(Diagnostic::readonly_ref_use(
                    ctx.text(*operand),
                    ctx.expr(*operand).span,
                ))
            } else {
                None
            }
        }
        ExprKind::ElementAccess { .. } => {
            let bound = bind_access(ctx, expr).ok()?;
            match &bound.shape {
                ReceiverShape::InlineArray(projection)
                    if bound.is_slice() && projection.via_temporary() =>
                {
                    Some(Diagnostic::non_referenceable(node.span))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

pub struct RefSafetyValidator;

impl Validator for RefSafetyValidator {
    fn validate(&self, ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let mut checker = RefSafetyChecker {
            ctx,
            rejected: FxHashSet::default(),
            diagnostics: Vec::new(),
        };
        checker.visit_body();
        checker.diagnostics
    }

    fn name(&self) -> &'static str {
        "RefSafetyValidator"
    }
}

struct RefSafetyChecker<'c, 'a> {
    ctx: &'c SemanticContext<'a>,
    /// Expressions that already produced a diagnostic
    rejected: FxHashSet<ExprId>,
    diagnostics: Vec<Diagnostic>,
}

impl RefSafetyChecker<'_, '_> {
    /// Whether `expr` or one of the receivers it is built on was rejected
    fn chain_rejected(&self, mut expr: ExprId) -> bool {
        loop {
            if self.rejected.contains(&expr) {
                return true;
            }
            expr = match &self.ctx.expr(expr).kind {
                ExprKind::Field { receiver, .. }
                | ExprKind::ElementAccess { receiver, .. }
                | ExprKind::SpanConversion {
                    operand: receiver, ..
                } => *receiver,
                _ => return false,
            };
        }
    }

    fn reject(&mut self, expr: ExprId, diag: Diagnostic) {
        debug!(method = %self.ctx.method.name, code = %diag.code, "ref-safety rejected");
        self.rejected.insert(expr);
        self.diagnostics.push(diag);
    }

    /// A span local reassigned to a value with a narrower scope than the one
    /// it was declared with
    fn check_span_local_assignment(&mut self, target: ExprId, value: ExprId) {
        let ctx = self.ctx;
        let ExprKind::Variable(v) = ctx.expr(target).kind else {
            return;
        };
        let var = ctx.variable(v);
        if var.kind != VariableKind::Local
            || !ctx.types.is_span(var.ty)
            || ctx.method.first_assignment(v) == Some(value)
            || self.chain_rejected(value)
        {
            return;
        }
        let declared = storage_of(ctx, target).scope;
        let assigned = storage_of(ctx, value);
        if assigned.scope < declared {
            self.reject(value, Diagnostic::span_may_escape(&var.name, ctx.expr(value).span));
        }
    }
}

impl<'a> Visitor<'a> for RefSafetyChecker<'_, 'a> {
    fn body(&self) -> &'a MethodBody {
        self.ctx.method
    }

    fn visit_statement(&mut self, stmt: &'a Statement) {
        walk_statement(self, stmt);
        if let StatementKind::Assign { target, value } = &stmt.kind {
            self.check_span_local_assignment(*target, *value);
        }
    }

    fn visit_expr(&mut self, expr: ExprId, usage: Usage) {
        walk_expr(self, expr, usage);

        if let Some(diag) = intrinsic_check(self.ctx, expr) {
            self.reject(expr, diag);
            return;
        }
        let checked = !matches!(
            usage,
            Usage::Read | Usage::Receiver | Usage::Argument(ArgModifier::None)
        );
        if checked && !self.chain_rejected(expr) {
            if let Some(diag) = AccessCheck::new(self.ctx, expr, usage).run() {
                self.reject(expr, diag);
            }
        }
    }
}

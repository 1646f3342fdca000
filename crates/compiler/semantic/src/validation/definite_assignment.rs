//! # Definite Assignment
//!
//! Tracks locals declared without an initializer and `out` parameters through
//! the statements of a method, in order. Reading an inline array element by
//! value requires the field holding the array to be assigned; reading a whole
//! variable or field requires that place to be assigned. A struct counts as
//! assigned once each of its fields is.
//!
//! Accesses that produce a reference or a span are neither uses nor
//! assignments here: element writes, `ref`/`in`/`out` element arguments, ref
//! local initializers, span conversions and slices. Reads through them go
//! unreported.

use fixbuf_compiler_diagnostics::Diagnostic;
use rustc_hash::FxHashSet;

use crate::context::SemanticContext;
use crate::expr::{ArgModifier, ExprId, ExprKind, VariableId};
use crate::method::{ParameterKind, StatementKind, VariableKind};
use crate::place::{PlaceExpr, PlaceExprSubSegment};
use crate::type_resolution::expression_type;
use crate::types::{TypeData, TypeId};
use crate::validation::Validator;

pub struct DefiniteAssignmentValidator;

impl Validator for DefiniteAssignmentValidator {
    fn validate(&self, ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let mut state = AssignmentState::new(ctx);
        state.run();
        state.diagnostics
    }

    fn name(&self) -> &'static str {
        "DefiniteAssignmentValidator"
    }
}

struct AssignmentState<'c, 'a> {
    ctx: &'c SemanticContext<'a>,
    tracked: FxHashSet<VariableId>,
    assigned: FxHashSet<PlaceExpr>,
    diagnostics: Vec<Diagnostic>,
}

impl<'c, 'a> AssignmentState<'c, 'a> {
    fn new(ctx: &'c SemanticContext<'a>) -> Self {
        let tracked = ctx
            .method
            .variables
            .iter_enumerated()
            .filter(|(_, v)| {
                !v.initially_assigned
                    && matches!(
                        v.kind,
                        VariableKind::Local | VariableKind::Parameter(ParameterKind::Out)
                    )
            })
            .map(|(id, _)| id)
            .collect();
        Self {
            ctx,
            tracked,
            assigned: FxHashSet::default(),
            diagnostics: Vec::new(),
        }
    }

    fn run(&mut self) {
        let method = self.ctx.method;
        for stmt in &method.statements {
            match &stmt.kind {
                StatementKind::Expression(e) => self.read(*e),
                StatementKind::Assign { target, value } => {
                    self.write_target(*target);
                    self.read(*value);
                    self.assign(*target);
                }
                StatementKind::CompoundAssign { target, value, .. } => {
                    self.read(*target);
                    self.read(*value);
                }
                StatementKind::RefLocal { init, .. } => self.untracked(*init),
                StatementKind::Call { args, .. } => {
                    for arg in args {
                        match arg.modifier {
                            ArgModifier::None => self.read(arg.value),
                            ArgModifier::Out => {
                                self.untracked(arg.value);
                                self.assign(arg.value);
                            }
                            ArgModifier::Ref | ArgModifier::In => {
                                if self.produces_ref_or_span(arg.value) {
                                    self.untracked(arg.value);
                                } else {
                                    self.read(arg.value);
                                }
                            }
                        }
                    }
                }
                StatementKind::Return(Some(e)) => {
                    if method.return_kind.is_by_ref() {
                        self.untracked(*e);
                    } else {
                        self.read(*e);
                    }
                }
                StatementKind::Return(None) => {}
            }
        }
    }

    fn produces_ref_or_span(&self, expr: ExprId) -> bool {
        match self.ctx.expr(expr).kind {
            ExprKind::ElementAccess { .. } | ExprKind::SpanConversion { .. } => true,
            _ => self.ctx.types.is_span(expression_type(self.ctx, expr)),
        }
    }

    /// Evaluate `expr` for its value
    fn read(&mut self, expr: ExprId) {
        let ctx = self.ctx;
        match &ctx.expr(expr).kind {
            ExprKind::Variable(_) => self.check_place(expr),
            ExprKind::Field { receiver, .. } => {
                if PlaceExpr::from_expr(ctx.method, expr).is_some() {
                    self.check_place(expr);
                } else {
                    self.read(*receiver);
                }
            }
            ExprKind::ElementAccess { receiver, args } => {
                for arg in args {
                    self.read(arg.value);
                }
                if ctx.types.is_span(expression_type(ctx, expr)) {
                    self.untracked(*receiver);
                } else {
                    self.read_container(*receiver);
                }
            }
            ExprKind::SpanConversion { operand, .. } => self.untracked(*operand),
            ExprKind::FromEnd(inner) => self.read(*inner),
            ExprKind::Range { start, end } => {
                for bound in [start, end].into_iter().flatten() {
                    self.read(*bound);
                }
            }
            ExprKind::ConditionalAccess { receiver, access } => {
                self.read(*receiver);
                self.read(*access);
            }
            ExprKind::Call { .. }
            | ExprKind::IntLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::Default(_)
            | ExprKind::ConditionalReceiver(_) => {}
        }
    }

    /// The receiver of an element read by value: the array holding it must be assigned
    fn read_container(&mut self, mut receiver: ExprId) {
        let ctx = self.ctx;
        while let ExprKind::ElementAccess {
            receiver: inner,
            args,
        } = &ctx.expr(receiver).kind
        {
            for arg in args {
                self.read(arg.value);
            }
            receiver = *inner;
        }
        if ctx.types.is_span(expression_type(ctx, receiver)) {
            self.untracked(receiver);
        } else if PlaceExpr::from_expr(ctx.method, receiver).is_some() {
            self.check_place(receiver);
        } else {
            self.read(receiver);
        }
    }

    /// Visit an expression whose storage is referenced rather than read; only
    /// the operands it evaluates along the way are reads
    fn untracked(&mut self, expr: ExprId) {
        match &self.ctx.expr(expr).kind {
            ExprKind::Variable(_) => {}
            ExprKind::Field { receiver, .. } => self.untracked(*receiver),
            ExprKind::ElementAccess { receiver, args } => {
                for arg in args {
                    self.read(arg.value);
                }
                self.untracked(*receiver);
            }
            ExprKind::SpanConversion { operand, .. } => self.untracked(*operand),
            ExprKind::ConditionalAccess { receiver, access } => {
                self.read(*receiver);
                self.untracked(*access);
            }
            _ => self.read(expr),
        }
    }

    fn write_target(&mut self, target: ExprId) {
        match &self.ctx.expr(target).kind {
            ExprKind::Variable(_) | ExprKind::Field { .. } => {}
            _ => self.untracked(target),
        }
    }

    fn assign(&mut self, target: ExprId) {
        let ctx = self.ctx;
        if ctx.expr(target).is_element_access() {
            return;
        }
        if let Some(place) = PlaceExpr::from_expr(ctx.method, target) {
            self.assigned.insert(place);
        }
    }

    fn check_place(&mut self, expr: ExprId) {
        let ctx = self.ctx;
        let Some(place) = PlaceExpr::from_expr(ctx.method, expr) else {
            return;
        };
        let Some(root) = ctx.method.variable_by_name(place.root_name()) else {
            return;
        };
        if !self.tracked.contains(&root) || self.is_assigned(&place, ctx.variable(root).ty) {
            return;
        }

        let span = ctx.expr(expr).span;
        let diag = match place.last_member() {
            Some(field) if !place.is_name() => Diagnostic::unassigned_field(field, span),
            _ => Diagnostic::unassigned_variable(place.root_name(), span),
        };
        self.diagnostics.push(diag);
        // Report each place once
        self.assigned.insert(place);
    }

    fn is_assigned(&self, place: &PlaceExpr, root_ty: TypeId) -> bool {
        if self.assigned.contains(place) || place.root_exprs().iter().any(|p| self.assigned.contains(p)) {
            return true;
        }
        let types = self.ctx.types;
        let Some(ty) = place_type(self.ctx, place, root_ty) else {
            return false;
        };
        match types.get(ty) {
            TypeData::Struct(s) if !s.kind.is_class() && !s.fields.is_empty() => {
                s.fields.iter().all(|f| {
                    let field_place = place.clone().with_member(f.name.clone());
                    self.is_assigned(&field_place, root_ty)
                })
            }
            _ => false,
        }
    }
}

fn place_type(ctx: &SemanticContext<'_>, place: &PlaceExpr, root_ty: TypeId) -> Option<TypeId> {
    let types = ctx.types;
    place
        .sub_segments()
        .iter()
        .try_fold(root_ty, |ty, segment| match segment {
            PlaceExprSubSegment::Member(name) => types
                .struct_type(ty)
                .and_then(|s| s.field(name))
                .map(|(_, f)| f.ty),
            PlaceExprSubSegment::IntSubscript(_) => types.inline_array(ty).map(|a| a.element),
        })
}

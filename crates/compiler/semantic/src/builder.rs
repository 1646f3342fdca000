//! # Method Builder
//!
//! Fluent construction of [`MethodBody`] values. Expressions are pushed into the
//! arena as they are created; `finish` renders the body to source text and
//! assigns every expression and statement its span in that text.

use chumsky::span::SimpleSpan;
use index_vec::IndexVec;

use crate::expr::{
    ArgModifier, Argument, BinaryOp, Expr, ExprId, ExprKind, ReturnKind, VariableId,
};
use crate::method::{
    MethodBody, MethodKind, ParameterKind, SourceRenderer, Statement, StatementKind, Variable,
    VariableKind,
};
use crate::types::TypeId;

#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    kind: MethodKind,
    return_kind: ReturnKind,
    return_type: Option<TypeId>,
    exprs: IndexVec<ExprId, Expr>,
    variables: IndexVec<VariableId, Variable>,
    statements: Vec<StatementKind>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Static,
            return_kind: ReturnKind::Void,
            return_type: None,
            exprs: IndexVec::new(),
            variables: IndexVec::new(),
            statements: Vec::new(),
        }
    }

    /// Make this an instance method of `this_type` and declare `this`
    pub fn instance(&mut self, this_type: TypeId, readonly: bool, unscoped_ref: bool) -> VariableId {
        self.kind = MethodKind::Instance {
            this_type,
            readonly,
            unscoped_ref,
        };
        self.variables.push(Variable {
            name: "this".to_string(),
            kind: VariableKind::This,
            ty: this_type,
            scoped: false,
            initially_assigned: true,
        })
    }

    pub fn returns(&mut self, kind: ReturnKind, ty: Option<TypeId>) -> &mut Self {
        self.return_kind = kind;
        self.return_type = ty;
        self
    }

    pub fn parameter(&mut self, name: &str, kind: ParameterKind, ty: TypeId) -> VariableId {
        self.declare(name, VariableKind::Parameter(kind), ty, false, kind != ParameterKind::Out)
    }

    pub fn scoped_parameter(&mut self, name: &str, kind: ParameterKind, ty: TypeId) -> VariableId {
        self.declare(name, VariableKind::Parameter(kind), ty, true, kind != ParameterKind::Out)
    }

    /// Declare a local that starts out unassigned
    pub fn local(&mut self, name: &str, ty: TypeId) -> VariableId {
        self.declare(name, VariableKind::Local, ty, false, false)
    }

    /// Declare a local with an initializer the analysis does not track
    pub fn initialized_local(&mut self, name: &str, ty: TypeId) -> VariableId {
        self.declare(name, VariableKind::Local, ty, false, true)
    }

    fn declare(
        &mut self,
        name: &str,
        kind: VariableKind,
        ty: TypeId,
        scoped: bool,
        initially_assigned: bool,
    ) -> VariableId {
        self.variables.push(Variable {
            name: name.to_string(),
            kind,
            ty,
            scoped,
            initially_assigned,
        })
    }

    fn push(&mut self, kind: ExprKind) -> ExprId {
        self.exprs.push(Expr {
            kind,
            span: SimpleSpan::from(0..0),
        })
    }

    pub fn var(&mut self, variable: VariableId) -> ExprId {
        self.push(ExprKind::Variable(variable))
    }

    pub fn field(&mut self, receiver: ExprId, field: &str) -> ExprId {
        self.push(ExprKind::Field {
            receiver,
            field: field.to_string(),
        })
    }

    /// Field chain `root.a.b...`
    pub fn path(&mut self, root: VariableId, fields: &[&str]) -> ExprId {
        let base = self.var(root);
        fields.iter().fold(base, |acc, f| self.field(acc, f))
    }

    pub fn call(&mut self, callee: &str, returns: ReturnKind, ty: TypeId) -> ExprId {
        self.push(ExprKind::Call {
            callee: callee.to_string(),
            returns,
            ty,
        })
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.push(ExprKind::IntLiteral(value))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.push(ExprKind::BoolLiteral(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.push(ExprKind::StringLiteral(value.to_string()))
    }

    pub fn from_end(&mut self, inner: ExprId) -> ExprId {
        self.push(ExprKind::FromEnd(inner))
    }

    pub fn range(&mut self, start: Option<ExprId>, end: Option<ExprId>) -> ExprId {
        self.push(ExprKind::Range { start, end })
    }

    pub fn default_of(&mut self, ty: TypeId) -> ExprId {
        self.push(ExprKind::Default(ty))
    }

    /// Single positional index argument
    pub fn index(&mut self, receiver: ExprId, arg: ExprId) -> ExprId {
        self.element(receiver, vec![Argument::positional(arg)])
    }

    pub fn element(&mut self, receiver: ExprId, args: Vec<Argument>) -> ExprId {
        self.push(ExprKind::ElementAccess { receiver, args })
    }

    pub fn span_of(&mut self, operand: ExprId, readonly: bool) -> ExprId {
        self.push(ExprKind::SpanConversion { operand, readonly })
    }

    /// `receiver?.<access>`; the closure builds the access on top of the
    /// evaluated receiver
    pub fn conditional(
        &mut self,
        receiver: ExprId,
        access: impl FnOnce(&mut Self, ExprId) -> ExprId,
    ) -> ExprId {
        let placeholder = self.push(ExprKind::ConditionalReceiver(receiver));
        let access = access(self, placeholder);
        self.push(ExprKind::ConditionalAccess { receiver, access })
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> &mut Self {
        self.statements.push(StatementKind::Expression(expr));
        self
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> &mut Self {
        self.statements.push(StatementKind::Assign { target, value });
        self
    }

    pub fn compound_assign(&mut self, target: ExprId, op: BinaryOp, value: ExprId) -> &mut Self {
        self.statements
            .push(StatementKind::CompoundAssign { target, op, value });
        self
    }

    /// Declare a ref local and bind it to `init`
    pub fn ref_local(&mut self, name: &str, readonly: bool, ty: TypeId, init: ExprId) -> VariableId {
        let local = self.declare(name, VariableKind::RefLocal { readonly }, ty, false, true);
        self.statements.push(StatementKind::RefLocal { local, init });
        local
    }

    pub fn call_stmt(&mut self, callee: &str, args: Vec<Argument>) -> &mut Self {
        self.statements.push(StatementKind::Call {
            callee: callee.to_string(),
            args,
        });
        self
    }

    /// Pass a single argument with a modifier to an external method
    pub fn pass(&mut self, callee: &str, modifier: ArgModifier, value: ExprId) -> &mut Self {
        self.call_stmt(callee, vec![Argument::with_modifier(value, modifier)])
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> &mut Self {
        self.statements.push(StatementKind::Return(value));
        self
    }

    pub fn finish(self) -> MethodBody {
        let mut renderer = SourceRenderer::new(&self.exprs, &self.variables);
        let spans: Vec<_> = self
            .statements
            .iter()
            .map(|kind| renderer.statement(kind, self.return_kind))
            .collect();
        let (source, expr_spans) = renderer.finish();

        let mut exprs = self.exprs;
        for (expr, span) in exprs.iter_mut().zip(expr_spans) {
            expr.span = span;
        }
        let statements = self
            .statements
            .into_iter()
            .zip(spans)
            .map(|(kind, span)| Statement { kind, span })
            .collect();

        MethodBody {
            name: self.name,
            kind: self.kind,
            return_kind: self.return_kind,
            return_type: self.return_type,
            exprs,
            variables: self.variables,
            statements,
            source,
        }
    }
}

//! # Method Body Visitor
//!
//! Separates traversal of a method body from the analyses run over it. Every
//! expression is visited exactly once, together with the [`Usage`] its parent
//! puts it to; analyses override the visit methods they care about and call
//! the matching `walk_*` function to continue into children.
//!
//! ## Usage
//!
//! ```rust,ignore
//! struct CountAccesses<'a> { body: &'a MethodBody, count: usize }
//!
//! impl<'a> Visitor<'a> for CountAccesses<'a> {
//!     fn body(&self) -> &'a MethodBody { self.body }
//!
//!     fn visit_expr(&mut self, expr: ExprId, usage: Usage) {
//!         if self.body.expr(expr).is_element_access() {
//!             self.count += 1;
//!         }
//!         walk_expr(self, expr, usage);
//!     }
//! }
//! ```

use crate::expr::{ArgModifier, ExprId, ExprKind, ReturnKind};
use crate::method::{MethodBody, Statement, StatementKind, VariableKind};

/// What the parent of an expression does with its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// The value is read
    Read,
    AssignTarget,
    CompoundTarget,
    Argument(ArgModifier),
    RefLocalInit { readonly: bool },
    Return(ReturnKind),
    /// Receiver of a field or element access; the parent decides
    Receiver,
}

impl Usage {
    /// Whether this use site needs a reference rather than a value
    pub const fn demands_ref(self) -> bool {
        match self {
            Self::AssignTarget
            | Self::CompoundTarget
            | Self::RefLocalInit { .. }
            | Self::Argument(ArgModifier::Ref | ArgModifier::Out | ArgModifier::In) => true,
            Self::Return(kind) => kind.is_by_ref(),
            Self::Read | Self::Receiver | Self::Argument(ArgModifier::None) => false,
        }
    }
}

pub trait Visitor<'a> {
    fn body(&self) -> &'a MethodBody;

    fn visit_body(&mut self) {
        for stmt in &self.body().statements {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &'a Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expr(&mut self, expr: ExprId, usage: Usage) {
        walk_expr(self, expr, usage);
    }
}

pub fn walk_statement<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, stmt: &'a Statement) {
    let body = visitor.body();
    match &stmt.kind {
        StatementKind::Expression(expr) => visitor.visit_expr(*expr, Usage::Read),
        StatementKind::Assign { target, value } => {
            visitor.visit_expr(*target, Usage::AssignTarget);
            visitor.visit_expr(*value, Usage::Read);
        }
        StatementKind::CompoundAssign { target, value, .. } => {
            visitor.visit_expr(*target, Usage::CompoundTarget);
            visitor.visit_expr(*value, Usage::Read);
        }
        StatementKind::RefLocal { local, init } => {
            let readonly = matches!(
                body.variable(*local).kind,
                VariableKind::RefLocal { readonly: true }
            );
            visitor.visit_expr(*init, Usage::RefLocalInit { readonly });
        }
        StatementKind::Call { args, .. } => {
            for arg in args {
                visitor.visit_expr(arg.value, Usage::Argument(arg.modifier));
            }
        }
        StatementKind::Return(Some(expr)) => {
            visitor.visit_expr(*expr, Usage::Return(body.return_kind));
        }
        StatementKind::Return(None) => {}
    }
}

pub fn walk_expr<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, expr: ExprId, usage: Usage) {
    let body = visitor.body();
    match &body.expr(expr).kind {
        ExprKind::Field { receiver, .. } => visitor.visit_expr(*receiver, Usage::Receiver),
        ExprKind::ElementAccess { receiver, args } => {
            visitor.visit_expr(*receiver, Usage::Receiver);
            for arg in args {
                visitor.visit_expr(arg.value, Usage::Read);
            }
        }
        ExprKind::SpanConversion { operand, .. } => {
            visitor.visit_expr(*operand, Usage::Receiver);
        }
        ExprKind::FromEnd(inner) => visitor.visit_expr(*inner, Usage::Read),
        ExprKind::Range { start, end } => {
            for bound in [start, end].into_iter().flatten() {
                visitor.visit_expr(*bound, Usage::Read);
            }
        }
        ExprKind::ConditionalAccess { receiver, access } => {
            visitor.visit_expr(*receiver, Usage::Read);
            visitor.visit_expr(*access, usage);
        }
        ExprKind::Variable(_)
        | ExprKind::Call { .. }
        | ExprKind::IntLiteral(_)
        | ExprKind::BoolLiteral(_)
        | ExprKind::StringLiteral(_)
        | ExprKind::Default(_)
        | ExprKind::ConditionalReceiver(_) => {}
    }
}

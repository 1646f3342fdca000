//! # Method Bodies
//!
//! A `MethodBody` owns its expression arena, its variables (parameters, locals,
//! ref locals and `this`) and a flat list of statements. The body also carries
//! a rendered source text; every expression span points into it, which lets
//! diagnostics quote the offending expression.

use std::fmt;

use chumsky::span::SimpleSpan;
use index_vec::IndexVec;

use crate::expr::{ArgModifier, Argument, BinaryOp, Expr, ExprId, ExprKind, ReturnKind, VariableId};
use crate::types::TypeId;

/// Passing convention of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Value,
    Ref,
    In,
    Out,
    RefReadonly,
}

impl ParameterKind {
    pub const fn is_by_ref(self) -> bool {
        !matches!(self, Self::Value)
    }

    pub const fn is_readonly(self) -> bool {
        matches!(self, Self::In | Self::RefReadonly)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Value => "value",
            Self::Ref => "ref",
            Self::In => "in",
            Self::Out => "out",
            Self::RefReadonly => "ref readonly",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Local,
    RefLocal { readonly: bool },
    Parameter(ParameterKind),
    This,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    /// For ref locals, the type of the referent
    pub ty: TypeId,
    /// Declared `scoped`: references to it may not leave the method
    pub scoped: bool,
    /// Definitely assigned on entry
    pub initially_assigned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    #[default]
    Static,
    Instance {
        this_type: TypeId,
        /// `readonly` instance member of a struct
        readonly: bool,
        /// `[UnscopedRef]`: `this` may be returned by reference
        unscoped_ref: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// Expression evaluated for its value
    Expression(ExprId),
    Assign {
        target: ExprId,
        value: ExprId,
    },
    CompoundAssign {
        target: ExprId,
        op: BinaryOp,
        value: ExprId,
    },
    /// `ref [readonly] T local = ref init;`
    RefLocal {
        local: VariableId,
        init: ExprId,
    },
    Call {
        callee: String,
        args: Vec<Argument>,
    },
    Return(Option<ExprId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: SimpleSpan<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    pub name: String,
    pub kind: MethodKind,
    pub return_kind: ReturnKind,
    pub return_type: Option<TypeId>,
    pub exprs: IndexVec<ExprId, Expr>,
    pub variables: IndexVec<VariableId, Variable>,
    pub statements: Vec<Statement>,
    pub source: String,
}

impl MethodBody {
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    pub fn variable_by_name(&self, name: &str) -> Option<VariableId> {
        self.variables
            .iter_enumerated()
            .find(|(_, v)| v.name == name)
            .map(|(id, _)| id)
    }

    pub fn this_variable(&self) -> Option<VariableId> {
        self.variables
            .iter_enumerated()
            .find(|(_, v)| v.kind == VariableKind::This)
            .map(|(id, _)| id)
    }

    /// Source text of an expression
    pub fn text(&self, id: ExprId) -> &str {
        let span = self.exprs[id].span;
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// The initializer bound to a ref local
    pub fn ref_local_init(&self, local: VariableId) -> Option<ExprId> {
        self.statements.iter().find_map(|s| match &s.kind {
            StatementKind::RefLocal { local: l, init } if *l == local => Some(*init),
            _ => None,
        })
    }

    /// The first value assigned to a local, used as the scope source of span locals
    pub fn first_assignment(&self, local: VariableId) -> Option<ExprId> {
        self.statements.iter().find_map(|s| match &s.kind {
            StatementKind::Assign { target, value } => match self.exprs[*target].kind {
                ExprKind::Variable(v) if v == local => Some(*value),
                _ => None,
            },
            _ => None,
        })
    }
}

/// Writes the source form of a method body and records the span of every
/// expression and statement as it goes
pub(crate) struct SourceRenderer<'a> {
    exprs: &'a IndexVec<ExprId, Expr>,
    variables: &'a IndexVec<VariableId, Variable>,
    out: String,
    spans: IndexVec<ExprId, SimpleSpan<usize>>,
}

impl<'a> SourceRenderer<'a> {
    pub(crate) fn new(
        exprs: &'a IndexVec<ExprId, Expr>,
        variables: &'a IndexVec<VariableId, Variable>,
    ) -> Self {
        Self {
            exprs,
            variables,
            out: String::new(),
            spans: exprs.iter().map(|e| e.span).collect(),
        }
    }

    pub(crate) fn statement(&mut self, kind: &StatementKind, returns: ReturnKind) -> SimpleSpan<usize> {
        let start = self.out.len();
        match kind {
            StatementKind::Expression(e) => self.expr(*e),
            StatementKind::Assign { target, value } => {
                self.expr(*target);
                self.out.push_str(" = ");
                self.expr(*value);
            }
            StatementKind::CompoundAssign { target, op, value } => {
                self.expr(*target);
                self.out.push_str(&format!(" {op}= "));
                self.expr(*value);
            }
            StatementKind::RefLocal { local, init } => {
                let var = &self.variables[*local];
                let readonly = matches!(var.kind, VariableKind::RefLocal { readonly: true });
                self.out.push_str(if readonly { "ref readonly " } else { "ref " });
                self.out.push_str(&var.name);
                self.out.push_str(" = ref ");
                self.expr(*init);
            }
            StatementKind::Call { callee, args } => {
                self.out.push_str(callee);
                self.out.push('(');
                self.arguments(args);
                self.out.push(')');
            }
            StatementKind::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push_str(if returns.is_by_ref() { " ref " } else { " " });
                    self.expr(*value);
                }
            }
        }
        self.out.push(';');
        let span = SimpleSpan::from(start..self.out.len());
        self.out.push('\n');
        span
    }

    fn arguments(&mut self, args: &[Argument]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if let Some(name) = &arg.name {
                self.out.push_str(name);
                self.out.push_str(": ");
            }
            if arg.modifier != ArgModifier::None {
                self.out.push_str(&format!("{} ", arg.modifier));
            }
            self.expr(arg.value);
        }
    }

    fn expr(&mut self, id: ExprId) {
        let (exprs, variables) = (self.exprs, self.variables);
        let start = self.out.len();
        match &exprs[id].kind {
            ExprKind::Variable(v) => self.out.push_str(&variables[*v].name),
            ExprKind::Field { receiver, field } => {
                self.expr(*receiver);
                self.out.push('.');
                self.out.push_str(field);
            }
            ExprKind::Call { callee, .. } => {
                self.out.push_str(callee);
                self.out.push_str("()");
            }
            ExprKind::IntLiteral(value) => self.out.push_str(&value.to_string()),
            ExprKind::BoolLiteral(value) => self.out.push_str(&value.to_string()),
            ExprKind::StringLiteral(value) => self.out.push_str(&format!("{value:?}")),
            ExprKind::FromEnd(inner) => {
                self.out.push('^');
                self.expr(*inner);
            }
            ExprKind::Range { start, end } => {
                if let Some(start) = start {
                    self.expr(*start);
                }
                self.out.push_str("..");
                if let Some(end) = end {
                    self.expr(*end);
                }
            }
            ExprKind::Default(_) => self.out.push_str("default"),
            ExprKind::ElementAccess { receiver, args } => {
                self.expr(*receiver);
                self.out.push('[');
                self.arguments(args);
                self.out.push(']');
            }
            ExprKind::SpanConversion { operand, readonly } => {
                self.out
                    .push_str(if *readonly { "(ReadOnlySpan)" } else { "(Span)" });
                self.expr(*operand);
            }
            ExprKind::ConditionalAccess { receiver, access } => {
                self.expr(*receiver);
                self.out.push('?');
                self.expr(*access);
            }
            ExprKind::ConditionalReceiver(_) => {}
        }
        self.spans[id] = SimpleSpan::from(start..self.out.len());
    }

    pub(crate) fn finish(self) -> (String, IndexVec<ExprId, SimpleSpan<usize>>) {
        (self.out, self.spans)
    }
}

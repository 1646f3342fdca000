//! Shared read-only view over everything the analysis of one method needs.

use crate::expr::{Expr, ExprId, VariableId};
use crate::method::{MethodBody, Variable};
use crate::types::TypeTable;
use crate::well_known::WellKnownMembers;

#[derive(Clone, Copy)]
pub struct SemanticContext<'a> {
    pub types: &'a TypeTable,
    pub members: &'a dyn WellKnownMembers,
    pub method: &'a MethodBody,
}

impl<'a> SemanticContext<'a> {
    pub fn new(
        types: &'a TypeTable,
        members: &'a dyn WellKnownMembers,
        method: &'a MethodBody,
    ) -> Self {
        Self {
            types,
            members,
            method,
        }
    }

    pub fn expr(&self, id: ExprId) -> &'a Expr {
        self.method.expr(id)
    }

    pub fn variable(&self, id: VariableId) -> &'a Variable {
        self.method.variable(id)
    }

    pub fn text(&self, id: ExprId) -> &'a str {
        self.method.text(id)
    }
}

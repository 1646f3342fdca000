//! Place expressions: a variable followed by member accesses and constant subscripts
//!
//! Places identify storage for definite-assignment tracking:
//! - Simple names (e.g., `x`)
//! - Member access (e.g., `x.F`)
//! - Constant subscripts (e.g., `x.F[0]`)

use std::hash::Hash;

use smallvec::SmallVec;

use crate::expr::{ExprId, ExprKind};
use crate::method::MethodBody;

/// Sub-segments that can be appended to a place expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceExprSubSegment {
    /// Struct field access, e.g. `.F` in `x.F`
    Member(String),
    /// Constant element access, e.g. `[0]` in `x.F[0]`
    IntSubscript(i64),
}

/// A variable followed by zero or more sub-segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceExpr {
    root_name: String,
    /// SmallVec optimizes for the common case of 0-2 segments
    sub_segments: SmallVec<[PlaceExprSubSegment; 2]>,
}

impl PlaceExpr {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            root_name: name.into(),
            sub_segments: SmallVec::new(),
        }
    }

    pub fn is_name(&self) -> bool {
        self.sub_segments.is_empty()
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn sub_segments(&self) -> &[PlaceExprSubSegment] {
        &self.sub_segments
    }

    /// Name of the last member segment, if any
    pub fn last_member(&self) -> Option<&str> {
        self.sub_segments.iter().rev().find_map(|s| match s {
            PlaceExprSubSegment::Member(m) => Some(m.as_str()),
            PlaceExprSubSegment::IntSubscript(_) => None,
        })
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.sub_segments
            .push(PlaceExprSubSegment::Member(member.into()));
        self
    }

    pub fn with_subscript(mut self, index: i64) -> Self {
        self.sub_segments
            .push(PlaceExprSubSegment::IntSubscript(index));
        self
    }

    /// Every proper prefix of this place
    ///
    /// For example, for `x.y.z`, this returns `[x, x.y]`
    pub fn root_exprs(&self) -> Vec<Self> {
        let mut roots = Vec::new();
        let mut current = Self::name(self.root_name.clone());

        for segment in &self.sub_segments {
            roots.push(current.clone());
            current.sub_segments.push(segment.clone());
        }

        roots
    }

    /// Build a place from a variable or a field chain; constant subscripts are
    /// included, anything else yields `None`
    pub fn from_expr(body: &MethodBody, expr: ExprId) -> Option<Self> {
        match &body.expr(expr).kind {
            ExprKind::Variable(v) => Some(Self::name(body.variable(*v).name.clone())),
            ExprKind::Field { receiver, field } => {
                Self::from_expr(body, *receiver).map(|p| p.with_member(field.clone()))
            }
            ExprKind::ElementAccess { receiver, args } => match args.as_slice() {
                [arg] => match body.expr(arg.value).kind {
                    ExprKind::IntLiteral(index) => {
                        Self::from_expr(body, *receiver).map(|p| p.with_subscript(index))
                    }
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }
}

impl std::fmt::Display for PlaceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root_name)?;
        for segment in &self.sub_segments {
            match segment {
                PlaceExprSubSegment::Member(member) => write!(f, ".{}", member)?,
                PlaceExprSubSegment::IntSubscript(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MethodBuilder;
    use crate::method::ParameterKind;
    use crate::types::TypeTable;

    #[test]
    fn test_simple_name() {
        let place = PlaceExpr::name("x");
        assert!(place.is_name());
        assert_eq!(place.root_name(), "x");
        assert_eq!(place.last_member(), None);
    }

    #[test]
    fn test_member_and_subscript() {
        let place = PlaceExpr::name("x").with_member("F").with_subscript(3);
        assert_eq!(place.to_string(), "x.F[3]");
        assert_eq!(place.last_member(), Some("F"));
        let roots = place.root_exprs();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].to_string(), "x");
        assert_eq!(roots[1].to_string(), "x.F");
    }

    #[test]
    fn test_from_expr() {
        let types = TypeTable::new();
        let mut b = MethodBuilder::new("M");
        let x = b.parameter("x", ParameterKind::Value, types.int());
        let i = b.parameter("i", ParameterKind::Value, types.int());
        let f = b.path(x, &["F", "G"]);
        let zero = b.int(0);
        let constant = b.index(f, zero);
        let i = b.var(i);
        let dynamic = b.index(f, i);
        let body = b.finish();

        assert_eq!(
            PlaceExpr::from_expr(&body, constant).map(|p| p.to_string()),
            Some("x.F.G[0]".to_string())
        );
        assert_eq!(PlaceExpr::from_expr(&body, dynamic), None);
    }
}

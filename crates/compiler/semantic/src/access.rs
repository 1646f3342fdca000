//! # Element Access Binding
//!
//! Binds `receiver[arg]` on an inline array or span receiver. Binding checks the
//! shape of the argument list, classifies the operand (int, `^n`, `Index`,
//! `Range`, range literal or dynamic), rejects constant indexes outside the
//! array and lists the well-known members lowering will call, in the order it
//! calls them.

use fixbuf_compiler_diagnostics::Diagnostic;
use smallvec::SmallVec;

use crate::context::SemanticContext;
use crate::escape::Storage;
use crate::expr::{ArgModifier, ExprId, ExprKind};
use crate::projection::{project, storage_of, Projection, SpanKind};
use crate::type_resolution::expression_type;
use crate::types::{TypeData, TypeId};
use crate::well_known::WellKnownMember;

/// What is being indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverShape {
    /// Inline array, projected to a span first
    InlineArray(Projection),
    /// Span value, indexed directly
    Span {
        kind: SpanKind,
        element: TypeId,
        storage: Storage,
    },
}

impl ReceiverShape {
    pub fn span_kind(&self) -> SpanKind {
        match self {
            Self::InlineArray(projection) => projection.kind,
            Self::Span { kind, .. } => *kind,
        }
    }

    pub fn element(&self) -> TypeId {
        match self {
            Self::InlineArray(projection) => projection.element,
            Self::Span { element, .. } => *element,
        }
    }

    /// Statically known length
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::InlineArray(projection) => Some(projection.length),
            Self::Span { .. } => None,
        }
    }

    pub fn storage(&self) -> &Storage {
        match self {
            Self::InlineArray(projection) => &projection.storage,
            Self::Span { storage, .. } => storage,
        }
    }
}

/// One bound of a range literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Omitted,
    Int(ExprId),
    /// `^n`, holding `n`
    FromEnd(ExprId),
    Index(ExprId),
}

impl RangeBound {
    fn needs_length(self, is_end: bool) -> bool {
        match self {
            Self::Omitted => is_end,
            Self::Int(_) => false,
            Self::FromEnd(_) | Self::Index(_) => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOperand {
    Int(ExprId),
    /// `^n`, holding `n`
    FromEnd(ExprId),
    Index(ExprId),
    Dynamic(ExprId),
    RangeLiteral { start: RangeBound, end: RangeBound },
    Range(ExprId),
}

impl IndexOperand {
    pub const fn is_slice(&self) -> bool {
        matches!(self, Self::RangeLiteral { .. } | Self::Range(_))
    }

    /// Whether lowering has to read the span length
    pub fn needs_length(&self) -> bool {
        match self {
            Self::Int(_) | Self::Dynamic(_) => false,
            Self::FromEnd(_) | Self::Index(_) | Self::Range(_) => true,
            Self::RangeLiteral { start, end } => {
                start.needs_length(false) || end.needs_length(true)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAccess {
    pub expr: ExprId,
    pub receiver: ExprId,
    pub shape: ReceiverShape,
    pub operand: IndexOperand,
    pub result_type: TypeId,
}

impl BoundAccess {
    pub fn span_kind(&self) -> SpanKind {
        self.shape.span_kind()
    }

    pub fn is_slice(&self) -> bool {
        self.operand.is_slice()
    }

    pub fn element(&self) -> TypeId {
        self.shape.element()
    }

    /// Members lowering calls, in call order, without duplicates
    pub fn required_members(&self) -> SmallVec<[WellKnownMember; 6]> {
        let kind = self.span_kind();
        let mut members: SmallVec<[WellKnownMember; 6]> = SmallVec::new();
        let mut require = |member: WellKnownMember| {
            if !members.contains(&member) {
                members.push(member);
            }
        };

        if let ReceiverShape::InlineArray(projection) = &self.shape {
            require(projection.accessor());
        }
        if self.operand.needs_length() {
            require(kind.length());
        }
        match self.operand {
            IndexOperand::Index(_) => require(WellKnownMember::IndexGetOffset),
            IndexOperand::Range(_) => {
                require(WellKnownMember::RangeStart);
                require(WellKnownMember::IndexGetOffset);
                require(WellKnownMember::RangeEnd);
            }
            IndexOperand::RangeLiteral { start, end } => {
                if matches!(start, RangeBound::Index(_)) || matches!(end, RangeBound::Index(_)) {
                    require(WellKnownMember::IndexGetOffset);
                }
            }
            _ => {}
        }
        require(if self.is_slice() {
            kind.slice()
        } else {
            kind.get_item()
        });
        members
    }
}

/// Bind an element access expression
///
/// An empty error list means the access involves an expression that is already
/// erroneous and nothing further should be reported for it.
pub fn bind_access(ctx: &SemanticContext<'_>, expr: ExprId) -> Result<BoundAccess, Vec<Diagnostic>> {
    let node = ctx.expr(expr);
    let ExprKind::ElementAccess { receiver, args } = &node.kind else {
        return Err(Vec::new());
    };
    let receiver = *receiver;
    let types = ctx.types;
    let receiver_ty = expression_type(ctx, receiver);

    let shape = match types.get(receiver_ty) {
        TypeData::InlineArray(_) => match project(ctx, receiver) {
            Some(projection) => ReceiverShape::InlineArray(projection),
            None => return Err(Vec::new()),
        },
        TypeData::Span { element, readonly } => ReceiverShape::Span {
            kind: SpanKind::from_readonly(*readonly),
            element: *element,
            storage: storage_of(ctx, receiver),
        },
        TypeData::Error => return Err(Vec::new()),
        _ => {
            return Err(vec![Diagnostic::not_indexable(
                &types.format_type(receiver_ty),
                ctx.expr(receiver).span,
            )]);
        }
    };

    let mut errors = Vec::new();
    let [arg] = args.as_slice() else {
        return Err(vec![Diagnostic::index_argument_count(args.len(), node.span)]);
    };
    if let Some(name) = &arg.name {
        errors.push(Diagnostic::named_index_argument(name, node.span));
    }
    if arg.modifier != ArgModifier::None {
        errors.push(Diagnostic::index_argument_modifier(
            &arg.modifier.to_string(),
            ctx.expr(arg.value).span,
        ));
    }

    let operand = match classify_operand(ctx, arg.value) {
        Ok(operand) => Some(operand),
        Err(Some(diag)) => {
            errors.push(diag);
            None
        }
        Err(None) => None,
    };
    let Some(operand) = operand else {
        return Err(errors);
    };

    if let Some(length) = shape.length() {
        if let Some(diag) = check_constant_bounds(ctx, operand, length, node.span) {
            errors.push(diag);
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let result_type = if operand.is_slice() {
        types
            .find_span(shape.element(), shape.span_kind().is_readonly())
            .unwrap_or(types.error())
    } else {
        shape.element()
    };

    let bound = BoundAccess {
        expr,
        receiver,
        shape,
        operand,
        result_type,
    };

    let missing: Vec<_> = bound
        .required_members()
        .into_iter()
        .filter(|m| !ctx.members.is_available(*m))
        .map(|m| Diagnostic::missing_required_member(m.qualified_name(), node.span))
        .collect();
    if missing.is_empty() {
        Ok(bound)
    } else {
        Err(missing)
    }
}

/// Classify an index argument; `Err(None)` when its type is already erroneous
fn classify_operand(ctx: &SemanticContext<'_>, arg: ExprId) -> Result<IndexOperand, Option<Diagnostic>> {
    match &ctx.expr(arg).kind {
        ExprKind::FromEnd(inner) => {
            require_int(ctx, *inner)?;
            Ok(IndexOperand::FromEnd(*inner))
        }
        ExprKind::Range { start, end } => Ok(IndexOperand::RangeLiteral {
            start: classify_bound(ctx, *start)?,
            end: classify_bound(ctx, *end)?,
        }),
        _ => {
            let ty = expression_type(ctx, arg);
            match ctx.types.get(ty) {
                TypeData::Int => Ok(IndexOperand::Int(arg)),
                TypeData::Index => Ok(IndexOperand::Index(arg)),
                TypeData::Range => Ok(IndexOperand::Range(arg)),
                TypeData::Dynamic => Ok(IndexOperand::Dynamic(arg)),
                TypeData::Error => Err(None),
                _ => Err(Some(invalid_type(ctx, arg, ty))),
            }
        }
    }
}

fn classify_bound(
    ctx: &SemanticContext<'_>,
    bound: Option<ExprId>,
) -> Result<RangeBound, Option<Diagnostic>> {
    let Some(bound) = bound else {
        return Ok(RangeBound::Omitted);
    };
    if let ExprKind::FromEnd(inner) = ctx.expr(bound).kind {
        require_int(ctx, inner)?;
        return Ok(RangeBound::FromEnd(inner));
    }
    let ty = expression_type(ctx, bound);
    match ctx.types.get(ty) {
        TypeData::Int => Ok(RangeBound::Int(bound)),
        TypeData::Index => Ok(RangeBound::Index(bound)),
        TypeData::Error => Err(None),
        _ => Err(Some(invalid_type(ctx, bound, ty))),
    }
}

fn require_int(ctx: &SemanticContext<'_>, expr: ExprId) -> Result<(), Option<Diagnostic>> {
    let ty = expression_type(ctx, expr);
    match ctx.types.get(ty) {
        TypeData::Int => Ok(()),
        TypeData::Error => Err(None),
        _ => Err(Some(invalid_type(ctx, expr, ty))),
    }
}

fn invalid_type(ctx: &SemanticContext<'_>, expr: ExprId, ty: TypeId) -> Diagnostic {
    Diagnostic::index_argument_type(&ctx.types.format_type(ty), ctx.expr(expr).span)
}

fn constant(ctx: &SemanticContext<'_>, expr: ExprId) -> Option<i64> {
    match ctx.expr(expr).kind {
        ExprKind::IntLiteral(value) => Some(value),
        _ => None,
    }
}

fn check_constant_bounds(
    ctx: &SemanticContext<'_>,
    operand: IndexOperand,
    length: usize,
    span: chumsky::span::SimpleSpan<usize>,
) -> Option<Diagnostic> {
    let bound = i64::try_from(length).ok()?;
    let (written, in_bounds) = match operand {
        IndexOperand::Int(e) => {
            let n = constant(ctx, e)?;
            (n.to_string(), (0..bound).contains(&n))
        }
        // `^n` addresses `length - n`, valid for n in 1..=length
        IndexOperand::FromEnd(e) => {
            let n = constant(ctx, e)?;
            (format!("^{n}"), (1..=bound).contains(&n))
        }
        _ => return None,
    };
    (!in_bounds).then(|| Diagnostic::index_out_of_bounds(&written, length, span))
}

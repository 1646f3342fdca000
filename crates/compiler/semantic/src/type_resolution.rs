//! # Expression Types
//!
//! Types of expressions are computed on demand from the method body and the
//! type table. Anything that cannot be typed resolves to the error type, which
//! the validators treat as "already reported elsewhere".

use crate::context::SemanticContext;
use crate::expr::{ExprId, ExprKind};
use crate::projection::storage_of;
use crate::types::{TypeData, TypeId};

pub fn expression_type(ctx: &SemanticContext<'_>, id: ExprId) -> TypeId {
    let types = ctx.types;
    match &ctx.expr(id).kind {
        ExprKind::Variable(v) => ctx.variable(*v).ty,
        ExprKind::Field { receiver, field } => {
            let receiver_ty = expression_type(ctx, *receiver);
            types
                .struct_type(receiver_ty)
                .and_then(|s| s.field(field))
                .map_or(types.error(), |(_, f)| f.ty)
        }
        ExprKind::Call { ty, .. } | ExprKind::Default(ty) => *ty,
        ExprKind::IntLiteral(_) => types.int(),
        ExprKind::BoolLiteral(_) => types.bool(),
        ExprKind::StringLiteral(_) => types.string(),
        ExprKind::FromEnd(_) => types.index(),
        ExprKind::Range { .. } => types.range(),
        ExprKind::ElementAccess { receiver, args } => {
            let receiver_ty = expression_type(ctx, *receiver);
            let slicing = args
                .first()
                .is_some_and(|arg| expression_type(ctx, arg.value) == types.range());
            match types.get(receiver_ty) {
                TypeData::InlineArray(array) if slicing => {
                    let readonly = storage_of(ctx, *receiver).projects_readonly();
                    types
                        .find_span(array.element, readonly)
                        .unwrap_or(types.error())
                }
                TypeData::InlineArray(array) => array.element,
                TypeData::Span { .. } if slicing => receiver_ty,
                TypeData::Span { element, .. } => *element,
                _ => types.error(),
            }
        }
        ExprKind::SpanConversion { operand, readonly } => {
            let operand_ty = expression_type(ctx, *operand);
            types
                .inline_array(operand_ty)
                .and_then(|array| types.find_span(array.element, *readonly))
                .unwrap_or(types.error())
        }
        ExprKind::ConditionalAccess { access, .. } => expression_type(ctx, *access),
        ExprKind::ConditionalReceiver(receiver) => expression_type(ctx, *receiver),
    }
}

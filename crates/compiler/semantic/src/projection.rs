//! # Storage Classification and Span Projection
//!
//! `storage_of` answers, for any expression, what storage it denotes: how far a
//! reference into it may escape, whether it has an address at all and whether
//! it may be written through. `project` uses that answer to pick the span type an
//! inline array receiver is viewed through before it is indexed or sliced.
//!
//! Ref locals and span-typed locals take their scope from the expression they
//! were first bound to. Cycles through such locals resolve to the current
//! method scope.

use std::fmt;

use smallvec::SmallVec;

use crate::context::SemanticContext;
use crate::escape::{EscapeScope, Storage, StorageOrigin};
use crate::expr::{ExprId, ExprKind, ReturnKind, VariableId};
use crate::method::{MethodKind, ParameterKind, VariableKind};
use crate::type_resolution::expression_type;
use crate::types::{TypeData, TypeId};
use crate::well_known::WellKnownMember;

/// The span type an inline array is projected to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Span,
    ReadOnlySpan,
}

impl SpanKind {
    pub const fn from_readonly(readonly: bool) -> Self {
        if readonly {
            Self::ReadOnlySpan
        } else {
            Self::Span
        }
    }

    pub const fn is_readonly(self) -> bool {
        matches!(self, Self::ReadOnlySpan)
    }

    /// Helper converting an inline array reference to this span kind
    pub const fn accessor(self) -> WellKnownMember {
        match self {
            Self::Span => WellKnownMember::InlineArrayAsSpan,
            Self::ReadOnlySpan => WellKnownMember::InlineArrayAsReadOnlySpan,
        }
    }

    pub const fn get_item(self) -> WellKnownMember {
        match self {
            Self::Span => WellKnownMember::SpanGetItem,
            Self::ReadOnlySpan => WellKnownMember::ReadOnlySpanGetItem,
        }
    }

    pub const fn slice(self) -> WellKnownMember {
        match self {
            Self::Span => WellKnownMember::SpanSlice,
            Self::ReadOnlySpan => WellKnownMember::ReadOnlySpanSlice,
        }
    }

    pub const fn length(self) -> WellKnownMember {
        match self {
            Self::Span => WellKnownMember::SpanLength,
            Self::ReadOnlySpan => WellKnownMember::ReadOnlySpanLength,
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Span => write!(f, "Span"),
            Self::ReadOnlySpan => write!(f, "ReadOnlySpan"),
        }
    }
}

/// How an inline array receiver is viewed as a span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub array_type: TypeId,
    pub element: TypeId,
    pub length: usize,
    pub kind: SpanKind,
    pub storage: Storage,
}

impl Projection {
    /// The receiver has no address and must be spilled to a temporary first
    pub fn via_temporary(&self) -> bool {
        !self.storage.referenceable
    }

    pub fn accessor(&self) -> WellKnownMember {
        self.kind.accessor()
    }
}

/// Project an inline array receiver to a span; `None` if it is not an inline array
pub fn project(ctx: &SemanticContext<'_>, receiver: ExprId) -> Option<Projection> {
    let array_type = expression_type(ctx, receiver);
    let array = ctx.types.inline_array(array_type)?;
    let storage = storage_of(ctx, receiver);
    Some(Projection {
        array_type,
        element: array.element,
        length: array.length,
        kind: SpanKind::from_readonly(storage.projects_readonly()),
        storage,
    })
}

pub fn storage_of(ctx: &SemanticContext<'_>, expr: ExprId) -> Storage {
    StorageResolver {
        ctx,
        active: SmallVec::new(),
    }
    .storage(expr)
}

struct StorageResolver<'c, 'a> {
    ctx: &'c SemanticContext<'a>,
    /// Locals whose initializer is currently being resolved
    active: SmallVec<[VariableId; 4]>,
}

impl StorageResolver<'_, '_> {
    fn storage(&mut self, id: ExprId) -> Storage {
        let ctx = self.ctx;
        let types = ctx.types;
        let ty = expression_type(ctx, id);
        if types.is_span(ty) {
            return self.span_value(id, ty);
        }

        match &ctx.expr(id).kind {
            ExprKind::Variable(v) => self.variable(*v),
            ExprKind::Field { receiver, field } => {
                let receiver_ty = expression_type(ctx, *receiver);
                let Some(s) = types.struct_type(receiver_ty) else {
                    return Storage::temporary();
                };
                let field_readonly = s.field(field).is_some_and(|(_, f)| f.readonly);
                if s.kind.is_class() {
                    Storage::new(EscapeScope::CallingMethod, StorageOrigin::Heap)
                        .readonly_if(field_readonly)
                } else {
                    self.storage(*receiver)
                        .readonly_if(field_readonly || s.kind.is_readonly())
                }
            }
            ExprKind::Call {
                callee, returns, ..
            } => match returns {
                ReturnKind::Ref => Storage::new(
                    EscapeScope::CallingMethod,
                    StorageOrigin::RefCall(callee.clone()),
                ),
                ReturnKind::RefReadonly => Storage::new(
                    EscapeScope::CallingMethod,
                    StorageOrigin::RefCall(callee.clone()),
                )
                .readonly_if(true),
                ReturnKind::Value | ReturnKind::Void => Storage::temporary(),
            },
            ExprKind::ElementAccess { receiver, .. } => {
                let receiver_ty = expression_type(ctx, *receiver);
                match types.get(receiver_ty) {
                    TypeData::InlineArray(_) => {
                        let storage = self.storage(*receiver);
                        let readonly = storage.projects_readonly();
                        Storage { readonly, ..storage }
                    }
                    TypeData::Span { readonly, .. } => {
                        let span = self.span_value(*receiver, receiver_ty);
                        Storage {
                            referenceable: true,
                            readonly: *readonly,
                            ..span
                        }
                    }
                    _ => Storage::temporary(),
                }
            }
            _ => Storage::temporary(),
        }
    }

    fn variable(&mut self, v: VariableId) -> Storage {
        let ctx = self.ctx;
        let var = ctx.variable(v);
        let name = var.name.clone();
        match var.kind {
            VariableKind::Local => {
                Storage::new(EscapeScope::CurrentMethod, StorageOrigin::Local(name))
            }
            VariableKind::Parameter(ParameterKind::Value) => {
                Storage::new(EscapeScope::CurrentMethod, StorageOrigin::ValueParameter(name))
            }
            VariableKind::Parameter(ParameterKind::Out) => {
                Storage::new(EscapeScope::CurrentMethod, StorageOrigin::ScopedParameter(name))
            }
            VariableKind::Parameter(kind) => {
                let storage = if var.scoped {
                    Storage::new(EscapeScope::CurrentMethod, StorageOrigin::ScopedParameter(name))
                } else {
                    Storage::new(EscapeScope::ReturnOnly, StorageOrigin::RefParameter(name))
                };
                storage.readonly_if(kind.is_readonly())
            }
            VariableKind::This => match ctx.method.kind {
                MethodKind::Instance {
                    this_type,
                    readonly,
                    unscoped_ref,
                } => match ctx.types.struct_type(this_type) {
                    Some(s) if !s.kind.is_class() => {
                        let scope = if unscoped_ref {
                            EscapeScope::ReturnOnly
                        } else {
                            EscapeScope::CurrentMethod
                        };
                        Storage::new(scope, StorageOrigin::StructReceiver)
                            .readonly_if(readonly || s.kind.is_readonly())
                    }
                    _ => Storage::temporary(),
                },
                MethodKind::Static => Storage::temporary(),
            },
            VariableKind::RefLocal { readonly } => {
                let init = self.with_active(v, |this| {
                    ctx.method.ref_local_init(v).map(|init| this.storage(init))
                });
                match init.flatten() {
                    Some(target) if target.referenceable => Storage {
                        scope: target.scope,
                        referenceable: true,
                        readonly: target.readonly || readonly,
                        origin: StorageOrigin::RefLocal(name),
                    },
                    _ => Storage::new(EscapeScope::CurrentMethod, StorageOrigin::RefLocal(name))
                        .readonly_if(readonly),
                }
            }
        }
    }

    /// Safe-to-escape scope of a span value
    fn span_value(&mut self, id: ExprId, ty: TypeId) -> Storage {
        let ctx = self.ctx;
        let types = ctx.types;
        let readonly = types.span_parts(ty).is_some_and(|(_, ro)| ro);

        match &ctx.expr(id).kind {
            ExprKind::ElementAccess { receiver, .. } => {
                let receiver_ty = expression_type(ctx, *receiver);
                match types.get(receiver_ty) {
                    TypeData::InlineArray(_) => {
                        let storage = self.storage(*receiver);
                        let readonly = storage.projects_readonly();
                        Storage { readonly, ..storage }
                    }
                    TypeData::Span { .. } => self.span_value(*receiver, receiver_ty),
                    _ => Storage::temporary(),
                }
            }
            ExprKind::SpanConversion {
                operand,
                readonly: requested,
            } => {
                let storage = self.storage(*operand);
                let readonly = storage.projects_readonly() || *requested;
                Storage { readonly, ..storage }
            }
            ExprKind::Variable(v) => {
                let var = ctx.variable(*v);
                let name = var.name.clone();
                match var.kind {
                    VariableKind::Local => {
                        let init = self.with_active(*v, |this| {
                            ctx.method
                                .first_assignment(*v)
                                .map(|init| this.storage(init).scope)
                        });
                        let scope = match init {
                            Some(Some(scope)) => scope,
                            Some(None) => EscapeScope::CallingMethod,
                            None => EscapeScope::CurrentMethod,
                        };
                        Storage::new(scope, StorageOrigin::SpanLocal(name)).readonly_if(readonly)
                    }
                    VariableKind::Parameter(_) if var.scoped => {
                        Storage::new(EscapeScope::CurrentMethod, StorageOrigin::ScopedParameter(name))
                            .readonly_if(readonly)
                    }
                    VariableKind::Parameter(_) => {
                        Storage::new(EscapeScope::CallingMethod, StorageOrigin::ValueParameter(name))
                            .readonly_if(readonly)
                    }
                    _ => Storage::new(EscapeScope::CallingMethod, StorageOrigin::Heap)
                        .readonly_if(readonly),
                }
            }
            ExprKind::Call { callee, .. } => Storage::new(
                EscapeScope::CallingMethod,
                StorageOrigin::RefCall(callee.clone()),
            )
            .readonly_if(readonly),
            ExprKind::Field { .. } | ExprKind::Default(_) => {
                Storage::new(EscapeScope::CallingMethod, StorageOrigin::Heap).readonly_if(readonly)
            }
            _ => Storage::temporary(),
        }
    }

    /// Run `f` with `v` marked as being resolved; `None` on re-entry
    fn with_active<T>(&mut self, v: VariableId, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.active.contains(&v) {
            return None;
        }
        self.active.push(v);
        let result = f(self);
        self.active.pop();
        Some(result)
    }
}

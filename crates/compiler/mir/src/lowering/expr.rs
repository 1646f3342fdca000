//! # Expression Lowering
//!
//! Expressions lower either to a value (`lower_expression`) or to the address
//! of their storage (`lower_address`). Expressions without storage of their own
//! are spilled to a compiler temporary when an address is needed.

use fixbuf_compiler_semantic::{
    expression_type, storage_of, ExprId, ExprKind, ReturnKind, SpanKind,
};

use super::access::AccessResult;
use super::builder::MirBuilder;
use super::LoweringError;
use crate::Value;

impl MirBuilder<'_> {
    pub fn lower_expression(&mut self, expr: ExprId) -> Result<Value, LoweringError> {
        let node = self.ctx.expr(expr);
        match &node.kind {
            ExprKind::Variable(v) => {
                let address = self.lower_address(expr)?;
                let name = self.ctx.variable(*v).name.clone();
                Ok(self.instr().load_with(address, format!("read {name}")).into())
            }
            ExprKind::Field { .. } => {
                let address = self.lower_address(expr)?;
                Ok(self.instr().load(address).into())
            }
            ExprKind::Call {
                callee, returns, ..
            } => {
                let result = self.instr().call(callee, vec![]);
                if returns.is_by_ref() {
                    Ok(self.instr().load(result.into()).into())
                } else {
                    Ok(result.into())
                }
            }
            ExprKind::IntLiteral(value) => Ok(Value::integer(*value)),
            ExprKind::BoolLiteral(value) => Ok(Value::boolean(*value)),
            ExprKind::StringLiteral(_) => Err(LoweringError::Unsupported(self.text(expr))),
            ExprKind::FromEnd(inner) => {
                let value = self.lower_expression(*inner)?;
                Ok(self.instr().make_index(value, true).into())
            }
            ExprKind::Range { start, end } => {
                let start = self.lower_range_bound(*start, false)?;
                let end = self.lower_range_bound(*end, true)?;
                Ok(self.instr().make_range(start, end).into())
            }
            ExprKind::Default(ty) => {
                let name = self.type_name(*ty);
                Ok(self.instr().default_value(*ty, name).into())
            }
            ExprKind::ElementAccess { .. } => match self.lower_access(expr)? {
                AccessResult::Element(address) => Ok(self.instr().load(address).into()),
                AccessResult::Slice(span) => Ok(span),
            },
            ExprKind::SpanConversion { operand, readonly } => {
                self.lower_span_conversion(*operand, *readonly)
            }
            ExprKind::ConditionalAccess { receiver, access } => {
                self.lower_conditional(*receiver, *access)
            }
            ExprKind::ConditionalReceiver(receiver) => self
                .receivers
                .get(receiver)
                .copied()
                .ok_or_else(|| LoweringError::UnboundReceiver(self.text(*receiver))),
        }
    }

    /// Address of the storage an expression denotes
    pub fn lower_address(&mut self, expr: ExprId) -> Result<Value, LoweringError> {
        let node = self.ctx.expr(expr);
        match &node.kind {
            ExprKind::Variable(v) => {
                let name = self.ctx.variable(*v).name.clone();
                let slot = self.instr().address_of(*v, &name);
                if self.holds_address(*v) {
                    Ok(self.instr().load(slot.into()).into())
                } else {
                    Ok(slot.into())
                }
            }
            ExprKind::Field { receiver, field } => {
                let receiver_ty = expression_type(&self.ctx, *receiver);
                let base = if self.ctx.types.is_class(receiver_ty) {
                    self.lower_expression(*receiver)?
                } else {
                    self.address_or_spill(*receiver)?
                };
                Ok(self.instr().field_address(base, field).into())
            }
            ExprKind::Call {
                callee,
                returns: ReturnKind::Ref | ReturnKind::RefReadonly,
                ..
            } => Ok(self.instr().call(callee, vec![]).into()),
            ExprKind::ElementAccess { .. } => match self.lower_access(expr)? {
                AccessResult::Element(address) => Ok(address),
                AccessResult::Slice(_) => Err(LoweringError::NotAddressable(self.text(expr))),
            },
            _ => Err(LoweringError::NotAddressable(self.text(expr))),
        }
    }

    /// Address of the storage of `expr`, or of a temporary holding its value
    pub fn address_or_spill(&mut self, expr: ExprId) -> Result<Value, LoweringError> {
        let placeholder = matches!(self.ctx.expr(expr).kind, ExprKind::ConditionalReceiver(_));
        if !placeholder && storage_of(&self.ctx, expr).referenceable {
            return self.lower_address(expr);
        }
        let value = self.lower_expression(expr)?;
        let mut instr = self.instr();
        let temp = instr.spill(value);
        Ok(instr.temp_address(temp).into())
    }

    /// `Index` value of one bound of a range literal
    fn lower_range_bound(
        &mut self,
        bound: Option<ExprId>,
        is_end: bool,
    ) -> Result<Value, LoweringError> {
        let Some(bound) = bound else {
            return Ok(self.instr().make_index(Value::integer(0), is_end).into());
        };
        let ty = expression_type(&self.ctx, bound);
        let value = self.lower_expression(bound)?;
        if ty == self.ctx.types.int() {
            Ok(self.instr().make_index(value, false).into())
        } else {
            Ok(value)
        }
    }

    fn lower_span_conversion(
        &mut self,
        operand: ExprId,
        readonly: bool,
    ) -> Result<Value, LoweringError> {
        let operand_ty = expression_type(&self.ctx, operand);
        let Some(array) = self.ctx.types.inline_array(operand_ty) else {
            return Err(LoweringError::Unsupported(self.text(operand)));
        };
        let (element, length) = (array.element, array.length);
        let address = self.address_or_spill(operand)?;
        let array_name = self.type_name(operand_ty);
        let element_name = self.type_name(element);
        let kind = SpanKind::from_readonly(readonly);
        Ok(self
            .instr()
            .span_projection(address, kind, array_name, element_name, length)
            .into())
    }

    /// `receiver?.access`: the receiver is evaluated once, the access runs
    /// inside a guard that yields null when the receiver is null
    fn lower_conditional(
        &mut self,
        receiver: ExprId,
        access: ExprId,
    ) -> Result<Value, LoweringError> {
        let tested = self.lower_expression(receiver)?;
        let dest = self.instr().value_id();
        let outer = self.enter_guard();
        self.receivers.insert(receiver, tested);
        let result = self.lower_expression(access);
        self.receivers.remove(&receiver);
        let body = self.exit_guard(outer);
        let result = result?;
        log::trace!("guarded access '{}'", self.text(access));
        self.instr().null_guard(dest, tested, body, result);
        Ok(dest.into())
    }
}

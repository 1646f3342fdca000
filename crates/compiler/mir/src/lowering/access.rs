//! # Element Access Lowering
//!
//! An element access is lowered in a fixed order:
//!
//! 1. the receiver address (spilled to a temporary when it has none)
//! 2. the span accessor (`as_span` / `as_readonly_span`), skipped for span receivers
//! 3. the span stored to a temporary
//! 4. the operand, converted to an offset (and a count for slices)
//! 5. `index` yielding an element address, or `slice` yielding a span
//!
//! Binding is redone with [`bind_access`] so the span kind and operand
//! classification match what validation saw.

use fixbuf_compiler_semantic::{
    bind_access, BinaryOp, BoundAccess, ExprId, IndexOperand, RangeBound, ReceiverShape,
};

use super::builder::MirBuilder;
use super::LoweringError;
use crate::Value;

/// Result of lowering an element access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    /// Address of the accessed element
    Element(Value),
    /// The sliced span
    Slice(Value),
}

impl MirBuilder<'_> {
    pub fn lower_access(&mut self, expr: ExprId) -> Result<AccessResult, LoweringError> {
        let bound = bind_access(&self.ctx, expr)
            .map_err(|_| LoweringError::InvalidAccess(self.text(expr)))?;
        log::debug!(
            "lowering '{}' through {} ({:?})",
            self.text(expr),
            bound.span_kind(),
            bound.operand
        );

        let span = self.lower_span(&bound)?;
        match bound.operand {
            IndexOperand::Int(index) => {
                let index = self.lower_expression(index)?;
                Ok(AccessResult::Element(self.instr().span_index(span, index).into()))
            }
            IndexOperand::FromEnd(count) => {
                let count = self.lower_expression(count)?;
                let mut instr = self.instr();
                let length = instr.span_length(span);
                let offset = instr.binary_op(BinaryOp::Sub, length.into(), count);
                Ok(AccessResult::Element(instr.span_index(span, offset.into()).into()))
            }
            IndexOperand::Index(index) => {
                let index = self.lower_expression(index)?;
                let mut instr = self.instr();
                let length = instr.span_length(span);
                let offset = instr.index_get_offset(index, length.into());
                Ok(AccessResult::Element(instr.span_index(span, offset.into()).into()))
            }
            IndexOperand::Dynamic(value) => {
                let value = self.lower_expression(value)?;
                let mut instr = self.instr();
                let index = instr.dynamic_convert(value);
                Ok(AccessResult::Element(instr.span_index(span, index.into()).into()))
            }
            IndexOperand::Range(range) => {
                let range = self.lower_expression(range)?;
                let mut instr = self.instr();
                let length: Value = instr.span_length(span).into();
                let start = instr.range_start(range);
                let start = instr.index_get_offset(start.into(), length);
                let end = instr.range_end(range);
                let end = instr.index_get_offset(end.into(), length);
                let count = instr.binary_op(BinaryOp::Sub, end.into(), start.into());
                Ok(AccessResult::Slice(
                    instr.span_slice(span, start.into(), count.into()).into(),
                ))
            }
            IndexOperand::RangeLiteral { start, end } => {
                let start = self.lower_bound_operand(start)?;
                let end = self.lower_bound_operand(end)?;
                let length = bound
                    .operand
                    .needs_length()
                    .then(|| Value::from(self.instr().span_length(span)));
                let start = self.bound_offset(start, length, false)?;
                let end = self.bound_offset(end, length, true)?;
                let mut instr = self.instr();
                let count = instr.binary_op(BinaryOp::Sub, end, start);
                Ok(AccessResult::Slice(
                    instr.span_slice(span, start, count.into()).into(),
                ))
            }
        }
    }

    /// Steps 1 to 3: the receiver as a span held in a temporary
    fn lower_span(&mut self, bound: &BoundAccess) -> Result<Value, LoweringError> {
        let span = match &bound.shape {
            ReceiverShape::InlineArray(projection) => {
                let address = self.address_or_spill(bound.receiver)?;
                let array = self.type_name(projection.array_type);
                let element = self.type_name(projection.element);
                self.instr()
                    .span_projection(address, projection.kind, array, element, projection.length)
                    .into()
            }
            ReceiverShape::Span { .. } => self.lower_expression(bound.receiver)?,
        };
        let temp = self.instr().spill(span);
        Ok(Value::temp(temp))
    }

    /// Evaluates the operand of a range bound, before the length is read
    fn lower_bound_operand(
        &mut self,
        bound: RangeBound,
    ) -> Result<(RangeBound, Option<Value>), LoweringError> {
        let value = match bound {
            RangeBound::Omitted => None,
            RangeBound::Int(e) | RangeBound::FromEnd(e) | RangeBound::Index(e) => {
                Some(self.lower_expression(e)?)
            }
        };
        Ok((bound, value))
    }

    /// Offset of a range bound: omitted start is 0, omitted end is the length
    fn bound_offset(
        &mut self,
        (bound, value): (RangeBound, Option<Value>),
        length: Option<Value>,
        is_end: bool,
    ) -> Result<Value, LoweringError> {
        let missing_length = || LoweringError::Unsupported("range bound without length".into());
        let mut instr = self.instr();
        match (bound, value) {
            (RangeBound::Omitted, _) if !is_end => Ok(Value::integer(0)),
            (RangeBound::Omitted, _) => length.ok_or_else(missing_length),
            (RangeBound::Int(_), Some(value)) => Ok(value),
            (RangeBound::FromEnd(_), Some(count)) => {
                let length = length.ok_or_else(missing_length)?;
                Ok(instr.binary_op(BinaryOp::Sub, length, count).into())
            }
            (RangeBound::Index(_), Some(index)) => {
                let length = length.ok_or_else(missing_length)?;
                Ok(instr.index_get_offset(index, length).into())
            }
            _ => Err(missing_length()),
        }
    }
}

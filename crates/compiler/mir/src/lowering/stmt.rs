//! # Statement Lowering
//!
//! Assignment targets are lowered before the assigned value, matching the
//! evaluation order of the source.

use fixbuf_compiler_semantic::{ArgModifier, Argument, Statement, StatementKind};

use super::builder::MirBuilder;
use super::LoweringError;
use crate::Value;

impl MirBuilder<'_> {
    pub fn lower_statement(&mut self, statement: &Statement) -> Result<(), LoweringError> {
        self.set_span(statement.span);
        match &statement.kind {
            StatementKind::Expression(expr) => {
                self.lower_expression(*expr)?;
            }
            StatementKind::Assign { target, value } => {
                let address = self.lower_address(*target)?;
                let value = self.lower_expression(*value)?;
                self.instr().store(address, value);
            }
            StatementKind::CompoundAssign { target, op, value } => {
                let address = self.lower_address(*target)?;
                let current = self.instr().load(address);
                let value = self.lower_expression(*value)?;
                let mut instr = self.instr();
                let result = instr.binary_op(*op, current.into(), value);
                instr.store(address, result.into());
            }
            StatementKind::RefLocal { local, init } => {
                let address = self.address_or_spill(*init)?;
                let name = self.ctx.variable(*local).name.clone();
                self.instr().bind_ref(*local, &name, address);
            }
            StatementKind::Call { callee, args } => {
                let args = self.lower_arguments(args)?;
                self.instr().call_void(callee, args);
            }
            StatementKind::Return(value) => {
                let value = match value {
                    Some(value) if self.function.return_kind.is_by_ref() => {
                        Some(self.lower_address(*value)?)
                    }
                    Some(value) => Some(self.lower_expression(*value)?),
                    None => None,
                };
                self.instr().return_value(value);
            }
        }
        Ok(())
    }

    /// By-reference arguments are passed as addresses; `in` arguments without
    /// storage are passed as the address of a temporary
    fn lower_arguments(&mut self, args: &[Argument]) -> Result<Vec<Value>, LoweringError> {
        args.iter()
            .map(|arg| match arg.modifier {
                ArgModifier::None => self.lower_expression(arg.value),
                ArgModifier::Ref | ArgModifier::Out => self.lower_address(arg.value),
                ArgModifier::In => self.address_or_spill(arg.value),
            })
            .collect()
    }
}

//! # Method-level MIR Lowering
//!
//! Entry points: `lower_method` lowers one method after validating it,
//! `lower_program` lowers every method of a program.

use fixbuf_compiler_semantic::{
    validate_method, MethodBody, Program, SemanticContext, TypeTable, WellKnownMembers,
};

use super::builder::MirBuilder;
use super::LoweringError;
use crate::MirFunction;

/// Lower a method body to MIR
///
/// # Errors
///
/// Returns `LoweringError::HasErrors` when validation reports any error;
/// methods with errors are never lowered.
pub fn lower_method(
    types: &TypeTable,
    members: &dyn WellKnownMembers,
    method: &MethodBody,
) -> Result<MirFunction, LoweringError> {
    let diagnostics = validate_method(types, members, method);
    if diagnostics.has_errors() {
        log::debug!(
            "not lowering '{}': {}",
            method.name,
            diagnostics.summary()
        );
        return Err(LoweringError::HasErrors {
            method: method.name.clone(),
            count: diagnostics.errors().len(),
        });
    }

    let ctx = SemanticContext::new(types, members, method);
    let mut builder = MirBuilder::new(ctx);
    for statement in &method.statements {
        builder.lower_statement(statement)?;
    }
    let function = builder.finish();
    log::debug!(
        "lowered '{}' to {} instruction(s), {} value(s), {} temporar(ies)",
        function.name,
        function.instructions.len(),
        function.value_count(),
        function.temp_count()
    );
    Ok(function)
}

/// Lower every method of a program, in declaration order
pub fn lower_program(
    program: &Program,
    members: &dyn WellKnownMembers,
) -> Vec<Result<MirFunction, LoweringError>> {
    program
        .methods
        .iter()
        .map(|method| lower_method(&program.types, members, method))
        .collect()
}

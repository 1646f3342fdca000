//! # Programs
//!
//! A program is a type table plus the method bodies declared against it.
//! Methods share nothing mutable, so validating a program fans out over the
//! methods in parallel.

use fixbuf_compiler_diagnostics::DiagnosticCollection;
use rayon::prelude::*;
use tracing::{debug, trace_span};

use crate::context::SemanticContext;
use crate::method::MethodBody;
use crate::types::TypeTable;
use crate::validation::{create_default_registry, ValidatorRegistry};
use crate::well_known::WellKnownMembers;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub types: TypeTable,
    pub methods: Vec<MethodBody>,
}

impl Program {
    pub fn new(types: TypeTable) -> Self {
        Self {
            types,
            methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodBody> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Diagnostics produced for one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReport {
    pub method: String,
    pub diagnostics: DiagnosticCollection,
}

impl MethodReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Validate a single method with the default validators
pub fn validate_method(
    types: &TypeTable,
    members: &dyn WellKnownMembers,
    method: &MethodBody,
) -> DiagnosticCollection {
    run_registry(&create_default_registry(), types, members, method)
}

/// Validate every method of a program; reports keep the declaration order
pub fn validate_program(program: &Program, members: &dyn WellKnownMembers) -> Vec<MethodReport> {
    let registry = create_default_registry();
    program
        .methods
        .par_iter()
        .map(|method| MethodReport {
            method: method.name.clone(),
            diagnostics: run_registry(&registry, &program.types, members, method),
        })
        .collect()
}

fn run_registry(
    registry: &ValidatorRegistry,
    types: &TypeTable,
    members: &dyn WellKnownMembers,
    method: &MethodBody,
) -> DiagnosticCollection {
    let _span = trace_span!("validate_method", method = %method.name).entered();
    let ctx = SemanticContext::new(types, members, method);
    let mut diagnostics = registry.validate_all(&ctx);
    diagnostics.sort();
    debug!(count = diagnostics.len(), "method validated");
    diagnostics
}

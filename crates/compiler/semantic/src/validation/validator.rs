//! # Validator Trait and Registry
//!
//! This module defines the trait for method validators and provides
//! a registry system for organizing multiple validators.

use fixbuf_compiler_diagnostics::{Diagnostic, DiagnosticCollection};
use tracing::trace;

use crate::context::SemanticContext;

/// Trait for method validators
pub trait Validator: Send + Sync {
    /// Validate one method body and return diagnostics
    fn validate(&self, ctx: &SemanticContext<'_>) -> Vec<Diagnostic>;

    /// Get the name of this validator (for debugging/logging)
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Registry for managing multiple validators
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator to the registry
    pub fn add_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Run all validators and collect diagnostics
    pub fn validate_all(&self, ctx: &SemanticContext<'_>) -> DiagnosticCollection {
        let mut collection = DiagnosticCollection::new();

        for validator in &self.validators {
            let diagnostics = validator.validate(ctx);
            trace!(
                validator = validator.name(),
                method = %ctx.method.name,
                count = diagnostics.len(),
                "validator finished"
            );
            collection.extend(diagnostics);
        }

        collection
    }

    /// Get the number of registered validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// Create the registry with every validator run on method bodies
pub fn create_default_registry() -> ValidatorRegistry {
    ValidatorRegistry::new()
        .add_validator(crate::validation::IndexingValidator)
        .add_validator(crate::validation::RefSafetyValidator)
        .add_validator(crate::validation::DefiniteAssignmentValidator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MethodBuilder;
    use crate::types::TypeTable;
    use crate::well_known::MemberTable;
    use chumsky::span::SimpleSpan;

    /// Mock validator for testing
    struct MockValidator {
        name: &'static str,
        diagnostics: Vec<Diagnostic>,
    }

    impl MockValidator {
        fn new(name: &'static str, diagnostics: Vec<Diagnostic>) -> Self {
            Self { name, diagnostics }
        }
    }

    impl Validator for MockValidator {
        fn validate(&self, _ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
            self.diagnostics.clone()
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    #[test]
    fn test_validator_registry() {
        let span = SimpleSpan::from(0..1);
        let validator1 = MockValidator::new("test1", vec![Diagnostic::lvalue_expected(span)]);
        let validator2 =
            MockValidator::new("test2", vec![Diagnostic::unassigned_variable("x", span)]);

        let registry = ValidatorRegistry::new()
            .add_validator(validator1)
            .add_validator(validator2);

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());

        let types = TypeTable::new();
        let members = MemberTable::default();
        let body = MethodBuilder::new("M").finish();
        let ctx = SemanticContext::new(&types, &members, &body);
        assert_eq!(registry.validate_all(&ctx).len(), 2);
    }

    #[test]
    fn test_default_registry_has_all_validators() {
        assert_eq!(create_default_registry().len(), 3);
    }
}

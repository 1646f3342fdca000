//! # Method Validation
//!
//! Validators run over one method body at a time and report diagnostics as
//! values. A method that produces no errors can be lowered.

pub mod definite_assignment;
pub mod indexing_validator;
pub mod ref_safety;
pub mod validator;

pub use definite_assignment::DefiniteAssignmentValidator;
pub use indexing_validator::IndexingValidator;
pub use ref_safety::{AccessCheck, CheckState, RefSafetyValidator};
pub use validator::{create_default_registry, Validator, ValidatorRegistry};

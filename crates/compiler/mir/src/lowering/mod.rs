//! # MIR Lowering Module
//!
//! This module lowers validated method bodies to MIR. It's organized into
//! focused submodules that each handle a specific aspect of the lowering
//! process:
//!
//! - `builder`: lowering state (current instruction list, guard receivers)
//! - `access`: element access and slicing of inline arrays and spans
//! - `expr`: values and addresses of the remaining expressions
//! - `stmt`: statements
//! - `function`: entry points

use thiserror::Error;

pub mod access;
pub mod builder;
pub mod expr;
pub mod function;
pub mod stmt;


pub use builder::MirBuilder;
pub use function::{lower_method, lower_program};

/// Reasons a method body cannot be lowered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    #[error("method '{method}' has {count} error(s) and is not lowered")]
    HasErrors { method: String, count: usize },
    #[error("'{0}' cannot be lowered")]
    Unsupported(String),
    #[error("element access '{0}' does not bind")]
    InvalidAccess(String),
    #[error("'{0}' has no address")]
    NotAddressable(String),
    #[error("conditional receiver '{0}' used outside of its access")]
    UnboundReceiver(String),
}

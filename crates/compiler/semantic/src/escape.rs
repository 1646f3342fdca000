//! # Escape Scopes
//!
//! Every storage location a reference can point into is classified by how far a
//! reference to it may travel. The scopes are totally ordered; a wider scope
//! outlives every narrower one.
//!
//! | scope            | reachable from                                  |
//! |------------------|-------------------------------------------------|
//! | `Local`          | the enclosing block only                        |
//! | `CurrentMethod`  | anywhere in the method, never returned          |
//! | `ReturnOnly`     | may be returned by reference to the caller      |
//! | `CallingMethod`  | outlives the caller (heap, returned refs)       |

use std::fmt;

/// Ordered escape scope of a storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EscapeScope {
    Local,
    CurrentMethod,
    ReturnOnly,
    CallingMethod,
}

impl EscapeScope {
    /// Whether storage with this scope may be referenced from `required`
    pub fn outlives(self, required: Self) -> bool {
        self >= required
    }

    pub fn narrowest(self, other: Self) -> Self {
        self.min(other)
    }
}

impl fmt::Display for EscapeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::CurrentMethod => "current-method",
            Self::ReturnOnly => "return-only",
            Self::CallingMethod => "calling-method",
        };
        write!(f, "{name}")
    }
}

/// Where the outermost storage of a place comes from
///
/// Used to pick the diagnostic when a reference would escape its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageOrigin {
    Local(String),
    ValueParameter(String),
    RefParameter(String),
    /// `out` parameters and parameters declared `scoped`
    ScopedParameter(String),
    /// `this` of a struct instance method
    StructReceiver,
    Heap,
    RefLocal(String),
    /// A span-typed local, whose scope comes from its initializer
    SpanLocal(String),
    RefCall(String),
    Temporary,
}

/// Classification of the storage an expression denotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    pub scope: EscapeScope,
    /// False for values with no stable address (call results, conditional accesses)
    pub referenceable: bool,
    pub readonly: bool,
    pub origin: StorageOrigin,
}

impl Storage {
    pub fn new(scope: EscapeScope, origin: StorageOrigin) -> Self {
        Self {
            scope,
            referenceable: true,
            readonly: false,
            origin,
        }
    }

    /// A value with no storage of its own
    pub fn temporary() -> Self {
        Self {
            scope: EscapeScope::Local,
            referenceable: false,
            readonly: true,
            origin: StorageOrigin::Temporary,
        }
    }

    pub fn readonly_if(mut self, readonly: bool) -> Self {
        self.readonly |= readonly;
        self
    }

    /// A span projected from this storage can only be mutable if the storage is
    /// writable and addressable
    pub fn projects_readonly(&self) -> bool {
        self.readonly || !self.referenceable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_ordering() {
        assert!(EscapeScope::Local < EscapeScope::CurrentMethod);
        assert!(EscapeScope::CurrentMethod < EscapeScope::ReturnOnly);
        assert!(EscapeScope::ReturnOnly < EscapeScope::CallingMethod);
        assert!(EscapeScope::CallingMethod.outlives(EscapeScope::ReturnOnly));
        assert!(!EscapeScope::CurrentMethod.outlives(EscapeScope::ReturnOnly));
        assert_eq!(
            EscapeScope::ReturnOnly.narrowest(EscapeScope::Local),
            EscapeScope::Local
        );
    }

    #[test]
    fn test_temporary_projects_readonly() {
        assert!(Storage::temporary().projects_readonly());
        let local = Storage::new(EscapeScope::CurrentMethod, StorageOrigin::Local("x".into()));
        assert!(!local.projects_readonly());
        assert!(local.readonly_if(true).projects_readonly());
    }
}

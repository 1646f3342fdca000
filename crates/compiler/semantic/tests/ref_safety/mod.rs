//! Tests for ref safety of inline array elements, slices and span conversions
//!
//! - `escape` - what may be returned by reference or as a span
//! - `readonly` - writes and `ref` uses through read-only storage
//! - `addressability` - accesses on values that have no address

pub mod addressability;
pub mod escape;
pub mod readonly;

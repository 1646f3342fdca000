//! Tests for binding inline array element accesses
//!
//! Covers the index operand kinds, constant bounds, malformed argument lists
//! and the runtime members each access shape requires.

pub mod element_access;
pub mod required_members;

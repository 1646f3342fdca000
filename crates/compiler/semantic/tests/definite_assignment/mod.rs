//! Tests for definite assignment of inline arrays held by locals and `out` parameters

pub mod element_reads;

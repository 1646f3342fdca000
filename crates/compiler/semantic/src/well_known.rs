//! # Well-known Members
//!
//! Lowering an inline array access calls a handful of runtime helpers: the span
//! accessors, span indexers and slicers, `Index.GetOffset` and the `Range`
//! bounds. A target environment may not provide every one of them, so each
//! access reports the members it depends on and the validator checks them
//! against a [`WellKnownMembers`] provider before lowering is attempted.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WellKnownMember {
    InlineArrayAsSpan,
    InlineArrayAsReadOnlySpan,
    SpanGetItem,
    ReadOnlySpanGetItem,
    SpanSlice,
    ReadOnlySpanSlice,
    SpanLength,
    ReadOnlySpanLength,
    IndexGetOffset,
    RangeStart,
    RangeEnd,
}

impl WellKnownMember {
    pub const ALL: [Self; 11] = [
        Self::InlineArrayAsSpan,
        Self::InlineArrayAsReadOnlySpan,
        Self::SpanGetItem,
        Self::ReadOnlySpanGetItem,
        Self::SpanSlice,
        Self::ReadOnlySpanSlice,
        Self::SpanLength,
        Self::ReadOnlySpanLength,
        Self::IndexGetOffset,
        Self::RangeStart,
        Self::RangeEnd,
    ];

    /// Fully qualified name, as shown in diagnostics
    pub const fn qualified_name(self) -> &'static str {
        match self {
            Self::InlineArrayAsSpan => "<PrivateImplementationDetails>.InlineArrayAsSpan",
            Self::InlineArrayAsReadOnlySpan => {
                "<PrivateImplementationDetails>.InlineArrayAsReadOnlySpan"
            }
            Self::SpanGetItem => "System.Span<T>.get_Item",
            Self::ReadOnlySpanGetItem => "System.ReadOnlySpan<T>.get_Item",
            Self::SpanSlice => "System.Span<T>.Slice",
            Self::ReadOnlySpanSlice => "System.ReadOnlySpan<T>.Slice",
            Self::SpanLength => "System.Span<T>.get_Length",
            Self::ReadOnlySpanLength => "System.ReadOnlySpan<T>.get_Length",
            Self::IndexGetOffset => "System.Index.GetOffset",
            Self::RangeStart => "System.Range.get_Start",
            Self::RangeEnd => "System.Range.get_End",
        }
    }

    /// Short name used in configuration files and on the command line
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::InlineArrayAsSpan => "inline-array-as-span",
            Self::InlineArrayAsReadOnlySpan => "inline-array-as-readonly-span",
            Self::SpanGetItem => "span-get-item",
            Self::ReadOnlySpanGetItem => "readonly-span-get-item",
            Self::SpanSlice => "span-slice",
            Self::ReadOnlySpanSlice => "readonly-span-slice",
            Self::SpanLength => "span-length",
            Self::ReadOnlySpanLength => "readonly-span-length",
            Self::IndexGetOffset => "index-get-offset",
            Self::RangeStart => "range-start",
            Self::RangeEnd => "range-end",
        }
    }

    const fn flag(self) -> MemberSet {
        match self {
            Self::InlineArrayAsSpan => MemberSet::INLINE_ARRAY_AS_SPAN,
            Self::InlineArrayAsReadOnlySpan => MemberSet::INLINE_ARRAY_AS_READONLY_SPAN,
            Self::SpanGetItem => MemberSet::SPAN_GET_ITEM,
            Self::ReadOnlySpanGetItem => MemberSet::READONLY_SPAN_GET_ITEM,
            Self::SpanSlice => MemberSet::SPAN_SLICE,
            Self::ReadOnlySpanSlice => MemberSet::READONLY_SPAN_SLICE,
            Self::SpanLength => MemberSet::SPAN_LENGTH,
            Self::ReadOnlySpanLength => MemberSet::READONLY_SPAN_LENGTH,
            Self::IndexGetOffset => MemberSet::INDEX_GET_OFFSET,
            Self::RangeStart => MemberSet::RANGE_START,
            Self::RangeEnd => MemberSet::RANGE_END,
        }
    }
}

impl fmt::Display for WellKnownMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown well-known member '{0}'")]
pub struct UnknownMember(pub String);

impl FromStr for WellKnownMember {
    type Err = UnknownMember;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.config_name() == s || m.qualified_name() == s)
            .ok_or_else(|| UnknownMember(s.to_string()))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberSet: u16 {
        const INLINE_ARRAY_AS_SPAN = 1 << 0;
        const INLINE_ARRAY_AS_READONLY_SPAN = 1 << 1;
        const SPAN_GET_ITEM = 1 << 2;
        const READONLY_SPAN_GET_ITEM = 1 << 3;
        const SPAN_SLICE = 1 << 4;
        const READONLY_SPAN_SLICE = 1 << 5;
        const SPAN_LENGTH = 1 << 6;
        const READONLY_SPAN_LENGTH = 1 << 7;
        const INDEX_GET_OFFSET = 1 << 8;
        const RANGE_START = 1 << 9;
        const RANGE_END = 1 << 10;
    }
}

/// Answers whether a runtime helper is available in the target environment
pub trait WellKnownMembers: Sync {
    fn is_available(&self, member: WellKnownMember) -> bool;
}

/// Member availability backed by a bit set; every member is present by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberTable {
    available: MemberSet,
}

impl Default for MemberTable {
    fn default() -> Self {
        Self {
            available: MemberSet::all(),
        }
    }
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a member from the table
    pub fn without(mut self, member: WellKnownMember) -> Self {
        self.available.remove(member.flag());
        self
    }

    pub fn with_missing(members: impl IntoIterator<Item = WellKnownMember>) -> Self {
        members
            .into_iter()
            .fold(Self::default(), |table, member| table.without(member))
    }

    pub fn missing(&self) -> Vec<WellKnownMember> {
        WellKnownMember::ALL
            .into_iter()
            .filter(|m| !self.is_available(*m))
            .collect()
    }
}

impl WellKnownMembers for MemberTable {
    fn is_available(&self, member: WellKnownMember) -> bool {
        self.available.contains(member.flag())
    }
}

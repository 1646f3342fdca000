//! Runtime values of the reference interpreter

use std::fmt;

use fixbuf_compiler_mir::TempId;
use fixbuf_compiler_semantic::{TypeData, TypeId, TypeTable, VariableId};

use crate::scenario::InputValue;

/// Identity of an activation; never reused, so a stale address is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Storage an address starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    Slot { frame: FrameId, variable: VariableId },
    Temp { frame: FrameId, temp: TempId },
    /// Class objects and boxed entry arguments
    Heap(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Field(String),
    Element(usize),
}

/// A managed reference: a root plus a path of field and element steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub root: Root,
    pub path: Vec<Step>,
}

impl Address {
    pub const fn new(root: Root) -> Self {
        Self {
            root,
            path: Vec::new(),
        }
    }

    pub fn join(&self, step: Step) -> Self {
        let mut path = self.path.clone();
        path.push(step);
        Self {
            root: self.root.clone(),
            path,
        }
    }
}

/// A view of `length` consecutive elements of the inline array at `base`,
/// starting at `start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanView {
    /// `None` for a default (empty) span
    pub base: Option<Address>,
    pub start: usize,
    pub length: usize,
    pub readonly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexValue {
    pub value: i64,
    pub from_end: bool,
}

impl IndexValue {
    pub const fn start(value: i64) -> Self {
        Self {
            value,
            from_end: false,
        }
    }

    pub const fn offset(self, length: i64) -> i64 {
        if self.from_end {
            length - self.value
        } else {
            self.value
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from_end {
            write!(f, "^")?;
        }
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtValue {
    Unit,
    Null,
    Int(i64),
    Bool(bool),
    /// Struct value; fields in declaration order
    Struct(Vec<(String, RtValue)>),
    Array(Vec<RtValue>),
    /// Reference to a class object on the heap
    Object(usize),
    Address(Address),
    Span(SpanView),
    Index(IndexValue),
    Range(IndexValue, IndexValue),
}

impl RtValue {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Struct(_) => "struct",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Address(_) => "address",
            Self::Span(_) => "span",
            Self::Index(_) => "index",
            Self::Range(..) => "range",
        }
    }

    pub fn field(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Self> {
        match self {
            Self::Struct(fields) => fields
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Structural comparison against plain expected data
    ///
    /// Struct fields not named in the expectation are ignored.
    pub fn matches(&self, expected: &InputValue) -> bool {
        match (self, expected) {
            (Self::Int(a), InputValue::Int(b)) => a == b,
            (Self::Bool(a), InputValue::Bool(b)) => a == b,
            (Self::Index(i), InputValue::Int(b)) => !i.from_end && i.value == *b,
            (Self::Array(items), InputValue::List(expected)) => {
                items.len() == expected.len()
                    && items.iter().zip(expected).all(|(a, b)| a.matches(b))
            }
            (Self::Struct(_), InputValue::Table(expected)) => expected
                .iter()
                .all(|(name, b)| self.field(name).is_some_and(|a| a.matches(b))),
            _ => false,
        }
    }
}

impl fmt::Display for RtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Null => write!(f, "null"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, " }}")
            }
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Object(id) => write!(f, "object#{id}"),
            Self::Address(_) => write!(f, "<address>"),
            Self::Span(view) => write!(f, "<span of {}>", view.length),
            Self::Index(index) => write!(f, "{index}"),
            Self::Range(start, end) => write!(f, "{start}..{end}"),
        }
    }
}

/// The value a variable of type `ty` holds before it is assigned
pub fn default_value(types: &TypeTable, ty: TypeId) -> RtValue {
    match types.get(ty) {
        TypeData::Int | TypeData::Dynamic => RtValue::Int(0),
        TypeData::Bool => RtValue::Bool(false),
        TypeData::String | TypeData::Error => RtValue::Null,
        TypeData::Index => RtValue::Index(IndexValue::start(0)),
        TypeData::Range => RtValue::Range(
            IndexValue::start(0),
            IndexValue {
                value: 0,
                from_end: true,
            },
        ),
        TypeData::InlineArray(array) => {
            RtValue::Array(vec![default_value(types, array.element); array.length])
        }
        TypeData::Struct(s) if s.kind.is_class() => RtValue::Null,
        TypeData::Struct(s) => RtValue::Struct(
            s.fields
                .iter()
                .map(|f| (f.name.clone(), default_value(types, f.ty)))
                .collect(),
        ),
        TypeData::Span { readonly, .. } => RtValue::Span(SpanView {
            base: None,
            start: 0,
            length: 0,
            readonly: *readonly,
        }),
    }
}

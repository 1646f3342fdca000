//! # Type Table
//!
//! Types are stored once in a `TypeTable` and referred to by `TypeId`. Primitive
//! types and span types are interned, so two lookups of `Span<int>` yield the
//! same id. Named types (inline arrays, structs and classes) are registered by
//! name; structs are declared first and receive their fields afterwards so that
//! a class may hold a field of its own type.
//!
//! Whenever an inline array type is added, both span types over its element type
//! are interned too. Type queries on method bodies only need shared access to the
//! table, so every span type an index or slice can produce must already exist.

use index_vec::IndexVec;
use rustc_hash::FxHashMap;
use thiserror::Error;

index_vec::define_index_type! {
    pub struct TypeId = usize;
    MAX_INDEX = usize::MAX;
}

/// How a user-defined aggregate behaves with respect to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// Reference type; its fields live on the heap
    Class,
    /// Value type stored inline in its container
    Struct,
    /// Value type whose fields are never writable
    ReadonlyStruct,
}

impl StructKind {
    pub const fn is_class(self) -> bool {
        matches!(self, Self::Class)
    }

    pub const fn is_readonly(self) -> bool {
        matches!(self, Self::ReadonlyStruct)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeId,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    pub name: String,
    pub kind: StructKind,
    pub fields: Vec<FieldDef>,
}

impl StructType {
    /// Find a field by name, returning its position and definition
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDef)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// A value type that holds exactly `length` consecutive elements of one type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InlineArrayType {
    pub name: String,
    pub element: TypeId,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    Int,
    Bool,
    String,
    /// `System.Index`, possibly counting from the end
    Index,
    /// `System.Range`
    Range,
    /// Late-bound value; indexing with it converts to `int`
    Dynamic,
    InlineArray(InlineArrayType),
    Struct(StructType),
    /// `Span<T>` or `ReadOnlySpan<T>`
    Span { element: TypeId, readonly: bool },
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("type '{0}' is already defined")]
    DuplicateType(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("type '{0}' is not a struct or class")]
    NotAStruct(String),
    #[error("inline array '{0}' must have a length of at least 1")]
    EmptyInlineArray(String),
}

#[derive(Debug, Clone)]
pub struct TypeTable {
    types: IndexVec<TypeId, TypeData>,
    by_name: FxHashMap<String, TypeId>,
    spans: FxHashMap<(TypeId, bool), TypeId>,
    int: TypeId,
    bool: TypeId,
    string: TypeId,
    index: TypeId,
    range: TypeId,
    dynamic: TypeId,
    error: TypeId,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let mut types = IndexVec::new();
        let mut by_name = FxHashMap::default();
        let mut builtin = |name: &str, data: TypeData| {
            let id = types.push(data);
            by_name.insert(name.to_string(), id);
            id
        };
        let int = builtin("int", TypeData::Int);
        let bool = builtin("bool", TypeData::Bool);
        let string = builtin("string", TypeData::String);
        let index = builtin("Index", TypeData::Index);
        let range = builtin("Range", TypeData::Range);
        let dynamic = builtin("dynamic", TypeData::Dynamic);
        let error = types.push(TypeData::Error);

        Self {
            types,
            by_name,
            spans: FxHashMap::default(),
            int,
            bool,
            string,
            index,
            range,
            dynamic,
            error,
        }
    }

    pub const fn int(&self) -> TypeId {
        self.int
    }

    pub const fn bool(&self) -> TypeId {
        self.bool
    }

    pub const fn string(&self) -> TypeId {
        self.string
    }

    pub const fn index(&self) -> TypeId {
        self.index
    }

    pub const fn range(&self) -> TypeId {
        self.range
    }

    pub const fn dynamic(&self) -> TypeId {
        self.dynamic
    }

    pub const fn error(&self) -> TypeId {
        self.error
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a type name, accepting `Span<T>` and `ReadOnlySpan<T>` forms
    pub fn resolve(&mut self, name: &str) -> Result<TypeId, TypeError> {
        let name = name.trim();
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }
        for (prefix, readonly) in [("ReadOnlySpan<", true), ("Span<", false)] {
            if let Some(inner) = name.strip_prefix(prefix).and_then(|s| s.strip_suffix('>')) {
                let element = self.resolve(inner)?;
                return Ok(self.span(element, readonly));
            }
        }
        Err(TypeError::UnknownType(name.to_string()))
    }

    /// Intern a span type over `element`
    pub fn span(&mut self, element: TypeId, readonly: bool) -> TypeId {
        if let Some(&id) = self.spans.get(&(element, readonly)) {
            return id;
        }
        let id = self.types.push(TypeData::Span { element, readonly });
        self.spans.insert((element, readonly), id);
        id
    }

    /// Look up an already interned span type
    pub fn find_span(&self, element: TypeId, readonly: bool) -> Option<TypeId> {
        self.spans.get(&(element, readonly)).copied()
    }

    pub fn add_inline_array(
        &mut self,
        name: &str,
        element: TypeId,
        length: usize,
    ) -> Result<TypeId, TypeError> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateType(name.to_string()));
        }
        if length == 0 {
            return Err(TypeError::EmptyInlineArray(name.to_string()));
        }
        let id = self.types.push(TypeData::InlineArray(InlineArrayType {
            name: name.to_string(),
            element,
            length,
        }));
        self.by_name.insert(name.to_string(), id);
        self.span(element, false);
        self.span(element, true);
        Ok(id)
    }

    /// Register a struct or class name; fields are attached with [`Self::define_fields`]
    pub fn declare_struct(&mut self, name: &str, kind: StructKind) -> Result<TypeId, TypeError> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateType(name.to_string()));
        }
        let id = self.types.push(TypeData::Struct(StructType {
            name: name.to_string(),
            kind,
            fields: Vec::new(),
        }));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn define_fields(&mut self, id: TypeId, fields: Vec<FieldDef>) -> Result<(), TypeError> {
        let name = self.format_type(id);
        match &mut self.types[id] {
            TypeData::Struct(s) => {
                s.fields = fields;
                Ok(())
            }
            _ => Err(TypeError::NotAStruct(name)),
        }
    }

    pub fn inline_array(&self, id: TypeId) -> Option<&InlineArrayType> {
        match self.get(id) {
            TypeData::InlineArray(array) => Some(array),
            _ => None,
        }
    }

    pub fn struct_type(&self, id: TypeId) -> Option<&StructType> {
        match self.get(id) {
            TypeData::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Element type and read-only flag of a span type
    pub fn span_parts(&self, id: TypeId) -> Option<(TypeId, bool)> {
        match self.get(id) {
            TypeData::Span { element, readonly } => Some((*element, *readonly)),
            _ => None,
        }
    }

    pub fn is_class(&self, id: TypeId) -> bool {
        self.struct_type(id).is_some_and(|s| s.kind.is_class())
    }

    pub fn is_span(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Span { .. })
    }

    /// Whether values of this type are copied on assignment
    pub fn is_value_type(&self, id: TypeId) -> bool {
        match self.get(id) {
            TypeData::Struct(s) => !s.kind.is_class(),
            TypeData::String | TypeData::Dynamic | TypeData::Error => false,
            _ => true,
        }
    }

    pub fn format_type(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Int => "int".to_string(),
            TypeData::Bool => "bool".to_string(),
            TypeData::String => "string".to_string(),
            TypeData::Index => "Index".to_string(),
            TypeData::Range => "Range".to_string(),
            TypeData::Dynamic => "dynamic".to_string(),
            TypeData::InlineArray(array) => array.name.clone(),
            TypeData::Struct(s) => s.name.clone(),
            TypeData::Span { element, readonly } => {
                let outer = if *readonly { "ReadOnlySpan" } else { "Span" };
                format!("{outer}<{}>", self.format_type(*element))
            }
            TypeData::Error => "error".to_string(),
        }
    }
}

//! # Reference Interpreter
//!
//! Executes lowered methods directly on their MIR. Each activation owns its
//! variable slots, temporaries and values; class objects and boxed entry
//! arguments live on a shared heap. Addresses are a root plus a path of field
//! and element steps, so a span is simply the address of an inline array plus
//! a window over its elements.
//!
//! Calls to methods the program does not define are treated as host sinks:
//! the call and its rendered arguments are appended to the output log and the
//! call returns unit.

pub mod value;


use std::collections::BTreeMap;

use fixbuf_compiler_mir::{Instruction, InstructionKind, Literal, MirFunction, Value, ValueId};
use fixbuf_compiler_semantic::{
    BinaryOp, MethodBody, MethodKind, Program, ReturnKind, TypeData, TypeId, VariableId,
    VariableKind,
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::scenario::InputValue;
pub use value::{default_value, Address, FrameId, IndexValue, Root, RtValue, SpanView, Step};

/// Calls nested deeper than this abort the run
pub const MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("index {index} is out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("slice of {count} element(s) at {start} is out of range for length {length}")]
    SliceOutOfRange { start: i64, count: i64, length: usize },
    #[error("index value {0} is negative")]
    NegativeIndex(i64),
    #[error("null reference")]
    NullReference,
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },
    #[error("reference to storage that no longer exists")]
    DanglingReference,
    #[error("value {0} is used before it is defined")]
    UndefinedValue(String),
    #[error("method '{0}' was not lowered")]
    UnknownMethod(String),
    #[error("'{callee}' expects {expected} argument(s), found {found}")]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("call depth exceeded {0}")]
    StackOverflow(usize),
    #[error("invalid input for '{name}': expected {expected}")]
    InvalidInput { name: String, expected: String },
}

impl RuntimeError {
    /// Stable kebab-case name, used by scenario expectations and JSON output
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => "index-out-of-range",
            Self::SliceOutOfRange { .. } => "slice-out-of-range",
            Self::NegativeIndex(_) => "negative-index",
            Self::NullReference => "null-reference",
            Self::TypeMismatch { .. } => "type-mismatch",
            Self::DanglingReference => "dangling-reference",
            Self::UndefinedValue(_) => "undefined-value",
            Self::UnknownMethod(_) => "unknown-method",
            Self::ArgumentCount { .. } => "argument-count",
            Self::StackOverflow(_) => "stack-overflow",
            Self::InvalidInput { .. } => "invalid-input",
        }
    }
}

fn mismatch(expected: &'static str, found: &RtValue) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected,
        found: found.kind_name().to_string(),
    }
}

/// Outcome of running an entry method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Returned value with references followed; `None` for void methods
    pub result: Option<RtValue>,
    /// Host calls, in order
    pub output: Vec<String>,
}

struct Frame {
    id: FrameId,
    slots: FxHashMap<VariableId, RtValue>,
    temps: Vec<RtValue>,
    values: Vec<Option<RtValue>>,
}

pub struct Vm<'p> {
    program: &'p Program,
    functions: FxHashMap<&'p str, (&'p MethodBody, &'p MirFunction)>,
    frames: Vec<Frame>,
    heap: Vec<RtValue>,
    next_frame: u64,
    output: Vec<String>,
}

impl<'p> Vm<'p> {
    /// Functions without a matching method body in `program` are ignored
    pub fn new(program: &'p Program, functions: &'p [MirFunction]) -> Self {
        let functions = functions
            .iter()
            .filter_map(|f| Some((f.name.as_str(), (program.method(&f.name)?, f))))
            .collect();
        Self {
            program,
            functions,
            frames: Vec::new(),
            heap: Vec::new(),
            next_frame: 0,
            output: Vec::new(),
        }
    }

    /// Run `entry`, seeding its parameters (and `this`) from `inputs`;
    /// parameters without an input start from their default value
    pub fn run(
        &mut self,
        entry: &str,
        inputs: &BTreeMap<String, InputValue>,
    ) -> Result<Execution, RuntimeError> {
        let (body, function) = *self
            .functions
            .get(entry)
            .ok_or_else(|| RuntimeError::UnknownMethod(entry.to_string()))?;
        debug!(entry, "running");

        let mut args = Vec::with_capacity(function.parameters.len());
        for &parameter in &function.parameters {
            let variable = body.variable(parameter);
            let value = self.entry_value(&variable.name, variable.ty, inputs)?;
            args.push(match variable.kind {
                VariableKind::Parameter(kind) if kind.is_by_ref() => self.boxed(value),
                _ => value,
            });
        }
        let this = match body.kind {
            MethodKind::Instance { this_type, .. } => {
                let value = self.entry_value("this", this_type, inputs)?;
                Some(match value {
                    RtValue::Null if self.program.types.is_class(this_type) => {
                        let object = default_object(self, this_type);
                        self.allocate(object)
                    }
                    value if self.program.types.is_class(this_type) => value,
                    value => self.boxed(value),
                })
            }
            MethodKind::Static => None,
        };

        let returned = self.invoke(entry, args, this)?;
        let result = match function.return_kind {
            ReturnKind::Void => None,
            _ => Some(self.materialize(&returned)?),
        };
        Ok(Execution {
            result,
            output: std::mem::take(&mut self.output),
        })
    }

    fn entry_value(
        &mut self,
        name: &str,
        ty: TypeId,
        inputs: &BTreeMap<String, InputValue>,
    ) -> Result<RtValue, RuntimeError> {
        match inputs.get(name) {
            Some(input) => self.input_value(name, ty, input),
            None => Ok(default_value(&self.program.types, ty)),
        }
    }

    /// Convert plain input data to a runtime value of type `ty`
    fn input_value(
        &mut self,
        name: &str,
        ty: TypeId,
        input: &InputValue,
    ) -> Result<RtValue, RuntimeError> {
        let program = self.program;
        let types = &program.types;
        let invalid = || RuntimeError::InvalidInput {
            name: name.to_string(),
            expected: types.format_type(ty),
        };
        let index = |input: &InputValue| match input {
            InputValue::Int(value) => Some(IndexValue::start(*value)),
            InputValue::Table(table) => match table.get("from-end") {
                Some(InputValue::Int(value)) => Some(IndexValue {
                    value: *value,
                    from_end: true,
                }),
                _ => None,
            },
            _ => None,
        };

        Ok(match (types.get(ty), input) {
            (TypeData::Int | TypeData::Dynamic, InputValue::Int(value)) => RtValue::Int(*value),
            (TypeData::Bool | TypeData::Dynamic, InputValue::Bool(value)) => {
                RtValue::Bool(*value)
            }
            (TypeData::Index, input) => RtValue::Index(index(input).ok_or_else(invalid)?),
            (TypeData::Range, InputValue::Table(table)) => {
                let start = table.get("start").map_or(Some(IndexValue::start(0)), index);
                let end = table.get("end").map_or(
                    Some(IndexValue {
                        value: 0,
                        from_end: true,
                    }),
                    index,
                );
                match (start, end) {
                    (Some(start), Some(end)) => RtValue::Range(start, end),
                    _ => return Err(invalid()),
                }
            }
            (TypeData::InlineArray(array), InputValue::List(items)) => {
                if items.len() != array.length {
                    return Err(invalid());
                }
                let element = array.element;
                let items = items
                    .iter()
                    .map(|item| self.input_value(name, element, item))
                    .collect::<Result<_, _>>()?;
                RtValue::Array(items)
            }
            (TypeData::Span { element, readonly }, InputValue::List(items)) => {
                let (element, readonly) = (*element, *readonly);
                let items = items
                    .iter()
                    .map(|item| self.input_value(name, element, item))
                    .collect::<Result<Vec<_>, _>>()?;
                let length = items.len();
                let RtValue::Address(base) = self.boxed(RtValue::Array(items)) else {
                    return Err(invalid());
                };
                RtValue::Span(SpanView {
                    base: Some(base),
                    start: 0,
                    length,
                    readonly,
                })
            }
            (TypeData::Struct(s), InputValue::Table(table)) => {
                if table.keys().any(|key| s.field(key).is_none()) {
                    return Err(invalid());
                }
                let (class, fields) = (s.kind.is_class(), s.fields.clone());
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = match table.get(&field.name) {
                        Some(input) => self.input_value(name, field.ty, input)?,
                        None => default_value(types, field.ty),
                    };
                    values.push((field.name, value));
                }
                if class {
                    self.allocate(RtValue::Struct(values))
                } else {
                    RtValue::Struct(values)
                }
            }
            _ => return Err(invalid()),
        })
    }

    /// Put a class object on the heap and return a reference to it
    fn allocate(&mut self, object: RtValue) -> RtValue {
        self.heap.push(object);
        RtValue::Object(self.heap.len() - 1)
    }

    /// Put a value on the heap and return its address
    fn boxed(&mut self, value: RtValue) -> RtValue {
        self.heap.push(value);
        RtValue::Address(Address::new(Root::Heap(self.heap.len() - 1)))
    }

    fn invoke(
        &mut self,
        callee: &str,
        args: Vec<RtValue>,
        this: Option<RtValue>,
    ) -> Result<RtValue, RuntimeError> {
        let found = self.functions.get(callee).copied();
        let Some((body, function)) = found else {
            return Ok(self.host_call(callee, &args));
        };
        if args.len() != function.parameters.len() {
            return Err(RuntimeError::ArgumentCount {
                callee: callee.to_string(),
                expected: function.parameters.len(),
                found: args.len(),
            });
        }
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow(MAX_CALL_DEPTH));
        }

        let mut slots = FxHashMap::default();
        for (id, variable) in body.variables.iter_enumerated() {
            let value = match variable.kind {
                VariableKind::Local => default_value(&self.program.types, variable.ty),
                VariableKind::RefLocal { .. } => RtValue::Null,
                VariableKind::Parameter(_) | VariableKind::This => continue,
            };
            slots.insert(id, value);
        }
        slots.extend(function.parameters.iter().copied().zip(args));
        if let Some(this_var) = function.this {
            let this = match this {
                Some(this) => this,
                None => default_value(&self.program.types, body.variable(this_var).ty),
            };
            slots.insert(this_var, this);
        }

        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        self.frames.push(Frame {
            id,
            slots,
            temps: vec![RtValue::Unit; function.temp_count()],
            values: vec![None; function.value_count()],
        });
        trace!(callee, depth = self.frames.len(), "enter");
        let result = self.execute(&function.instructions);
        self.frames.pop();
        Ok(result?.unwrap_or(RtValue::Unit))
    }

    fn host_call(&mut self, callee: &str, args: &[RtValue]) -> RtValue {
        let rendered: Vec<String> = args.iter().map(|arg| self.render(arg)).collect();
        let line = format!("{callee}({})", rendered.join(", "));
        debug!(call = %line, "host call");
        self.output.push(line);
        RtValue::Unit
    }

    /// Render a value for the output log, following references and spans
    fn render(&self, value: &RtValue) -> String {
        match self.materialize(value) {
            Ok(value) => value.to_string(),
            Err(err) => format!("<{err}>"),
        }
    }

    /// Replace references, spans and objects by the data they designate
    fn materialize(&self, value: &RtValue) -> Result<RtValue, RuntimeError> {
        match value {
            RtValue::Address(address) => self.materialize(&self.read(address)?),
            RtValue::Object(id) => match self.heap.get(*id) {
                Some(object) => self.materialize(object),
                None => Err(RuntimeError::DanglingReference),
            },
            RtValue::Span(view) => {
                let items = (0..view.length)
                    .map(|i| match &view.base {
                        Some(base) => self.materialize(&RtValue::Address(
                            base.join(Step::Element(view.start + i)),
                        )),
                        None => Err(RuntimeError::NullReference),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(RtValue::Array(items))
            }
            RtValue::Struct(fields) => Ok(RtValue::Struct(
                fields
                    .iter()
                    .map(|(name, v)| Ok((name.clone(), self.materialize(v)?)))
                    .collect::<Result<_, RuntimeError>>()?,
            )),
            RtValue::Array(items) => Ok(RtValue::Array(
                items
                    .iter()
                    .map(|v| self.materialize(v))
                    .collect::<Result<_, _>>()?,
            )),
            other => Ok(other.clone()),
        }
    }

    fn frame(&self) -> &Frame {
        // `execute` only runs inside `invoke`, which pushed a frame
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    fn find_frame(&self, id: FrameId) -> Result<&Frame, RuntimeError> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.id == id)
            .ok_or(RuntimeError::DanglingReference)
    }

    fn find_frame_mut(&mut self, id: FrameId) -> Result<&mut Frame, RuntimeError> {
        self.frames
            .iter_mut()
            .rev()
            .find(|f| f.id == id)
            .ok_or(RuntimeError::DanglingReference)
    }

    fn root(&self, root: &Root) -> Result<&RtValue, RuntimeError> {
        match root {
            Root::Slot { frame, variable } => self
                .find_frame(*frame)?
                .slots
                .get(variable)
                .ok_or(RuntimeError::DanglingReference),
            Root::Temp { frame, temp } => self
                .find_frame(*frame)?
                .temps
                .get(temp.index())
                .ok_or(RuntimeError::DanglingReference),
            Root::Heap(id) => self.heap.get(*id).ok_or(RuntimeError::DanglingReference),
        }
    }

    fn root_mut(&mut self, root: &Root) -> Result<&mut RtValue, RuntimeError> {
        match root {
            Root::Slot { frame, variable } => self
                .find_frame_mut(*frame)?
                .slots
                .get_mut(variable)
                .ok_or(RuntimeError::DanglingReference),
            Root::Temp { frame, temp } => self
                .find_frame_mut(*frame)?
                .temps
                .get_mut(temp.index())
                .ok_or(RuntimeError::DanglingReference),
            Root::Heap(id) => self
                .heap
                .get_mut(*id)
                .ok_or(RuntimeError::DanglingReference),
        }
    }

    fn read(&self, address: &Address) -> Result<RtValue, RuntimeError> {
        let mut current = self.root(&address.root)?;
        for step in &address.path {
            current = match (current, step) {
                (RtValue::Struct(_), Step::Field(name)) => {
                    current.field(name).ok_or_else(|| mismatch("field", current))?
                }
                (RtValue::Array(items), Step::Element(i)) => {
                    items.get(*i).ok_or(RuntimeError::IndexOutOfRange {
                        index: *i as i64,
                        length: items.len(),
                    })?
                }
                (RtValue::Null, _) => return Err(RuntimeError::NullReference),
                (other, Step::Field(_)) => return Err(mismatch("struct", other)),
                (other, Step::Element(_)) => return Err(mismatch("inline array", other)),
            };
        }
        Ok(current.clone())
    }

    fn write(&mut self, address: &Address, value: RtValue) -> Result<(), RuntimeError> {
        let mut current = self.root_mut(&address.root)?;
        for step in &address.path {
            current = match (current, step) {
                (RtValue::Struct(fields), Step::Field(name)) => fields
                    .iter_mut()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v)
                    .ok_or(RuntimeError::TypeMismatch {
                        expected: "field",
                        found: name.clone(),
                    })?,
                (RtValue::Array(items), Step::Element(i)) => {
                    let length = items.len();
                    items.get_mut(*i).ok_or(RuntimeError::IndexOutOfRange {
                        index: *i as i64,
                        length,
                    })?
                }
                (RtValue::Null, _) => return Err(RuntimeError::NullReference),
                (other, Step::Field(_)) => return Err(mismatch("struct", other)),
                (other, Step::Element(_)) => return Err(mismatch("inline array", other)),
            };
        }
        *current = value;
        Ok(())
    }

    fn value(&self, value: &Value) -> Result<RtValue, RuntimeError> {
        match value {
            Value::Literal(Literal::Integer(v)) => Ok(RtValue::Int(*v)),
            Value::Literal(Literal::Boolean(v)) => Ok(RtValue::Bool(*v)),
            Value::Operand(id) => self
                .frame()
                .values
                .get(id.index())
                .cloned()
                .flatten()
                .ok_or_else(|| RuntimeError::UndefinedValue(value.to_string())),
            Value::Temp(temp) => self
                .frame()
                .temps
                .get(temp.index())
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedValue(value.to_string())),
        }
    }

    fn int(&self, value: &Value) -> Result<i64, RuntimeError> {
        match self.value(value)? {
            RtValue::Int(v) => Ok(v),
            other => Err(mismatch("int", &other)),
        }
    }

    fn address(&self, value: &Value) -> Result<Address, RuntimeError> {
        match self.value(value)? {
            RtValue::Address(address) => Ok(address),
            RtValue::Null => Err(RuntimeError::NullReference),
            other => Err(mismatch("address", &other)),
        }
    }

    fn span(&self, value: &Value) -> Result<SpanView, RuntimeError> {
        match self.value(value)? {
            RtValue::Span(view) => Ok(view),
            other => Err(mismatch("span", &other)),
        }
    }

    fn index_value(&self, value: &Value) -> Result<IndexValue, RuntimeError> {
        match self.value(value)? {
            RtValue::Index(index) => Ok(index),
            RtValue::Int(v) => Ok(IndexValue::start(v)),
            other => Err(mismatch("index", &other)),
        }
    }

    fn define(&mut self, dest: ValueId, value: RtValue) {
        if let Some(slot) = self.frame_mut().values.get_mut(dest.index()) {
            *slot = Some(value);
        }
    }

    /// Run a block; `Some` carries the value of a `return`
    fn execute(&mut self, instructions: &[Instruction]) -> Result<Option<RtValue>, RuntimeError> {
        for instruction in instructions {
            if let Some(returned) = self.step(instruction)? {
                return Ok(Some(returned));
            }
        }
        Ok(None)
    }

    fn step(&mut self, instruction: &Instruction) -> Result<Option<RtValue>, RuntimeError> {
        let frame = self.frame().id;
        match &instruction.kind {
            InstructionKind::AddressOf { dest, variable, .. } => {
                let address = Address::new(Root::Slot {
                    frame,
                    variable: *variable,
                });
                self.define(*dest, RtValue::Address(address));
            }
            InstructionKind::TempAddress { dest, temp } => {
                let address = Address::new(Root::Temp { frame, temp: *temp });
                self.define(*dest, RtValue::Address(address));
            }
            InstructionKind::FieldAddress { dest, base, field } => {
                let address = match self.value(base)? {
                    RtValue::Address(address) => address.join(Step::Field(field.clone())),
                    RtValue::Object(id) => {
                        Address::new(Root::Heap(id)).join(Step::Field(field.clone()))
                    }
                    RtValue::Null => return Err(RuntimeError::NullReference),
                    other => return Err(mismatch("address or object", &other)),
                };
                self.define(*dest, RtValue::Address(address));
            }
            InstructionKind::Load { dest, address } => {
                let address = self.address(address)?;
                let value = self.read(&address)?;
                self.define(*dest, value);
            }
            InstructionKind::Store { address, value } => {
                let address = self.address(address)?;
                let value = self.value(value)?;
                self.write(&address, value)?;
            }
            InstructionKind::StoreTemp { temp, value } => {
                let value = self.value(value)?;
                let temps = &mut self.frame_mut().temps;
                if temps.len() <= temp.index() {
                    temps.resize(temp.index() + 1, RtValue::Unit);
                }
                temps[temp.index()] = value;
            }
            InstructionKind::BindRef {
                variable, address, ..
            } => {
                let address = self.address(address)?;
                self.frame_mut()
                    .slots
                    .insert(*variable, RtValue::Address(address));
            }
            InstructionKind::Default { dest, ty, .. } => {
                let value = default_value(&self.program.types, *ty);
                self.define(*dest, value);
            }
            InstructionKind::Call { dest, callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.value(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = self.invoke(callee, args, None)?;
                if let Some(dest) = dest {
                    self.define(*dest, result);
                }
            }
            InstructionKind::SpanProjection {
                dest,
                address,
                kind,
                length,
                ..
            } => {
                let base = self.address(address)?;
                let view = SpanView {
                    base: Some(base),
                    start: 0,
                    length: *length,
                    readonly: kind.is_readonly(),
                };
                self.define(*dest, RtValue::Span(view));
            }
            InstructionKind::SpanLength { dest, span } => {
                let length = self.span(span)?.length;
                self.define(*dest, RtValue::Int(length as i64));
            }
            InstructionKind::IndexGetOffset {
                dest,
                index,
                length,
            } => {
                let index = self.index_value(index)?;
                let length = self.int(length)?;
                self.define(*dest, RtValue::Int(index.offset(length)));
            }
            InstructionKind::MakeIndex {
                dest,
                value,
                from_end,
            } => {
                let value = self.int(value)?;
                if value < 0 {
                    return Err(RuntimeError::NegativeIndex(value));
                }
                let index = IndexValue {
                    value,
                    from_end: *from_end,
                };
                self.define(*dest, RtValue::Index(index));
            }
            InstructionKind::MakeRange { dest, start, end } => {
                let range = RtValue::Range(self.index_value(start)?, self.index_value(end)?);
                self.define(*dest, range);
            }
            InstructionKind::RangeStart { dest, range } | InstructionKind::RangeEnd { dest, range } => {
                let (start, end) = match self.value(range)? {
                    RtValue::Range(start, end) => (start, end),
                    other => return Err(mismatch("range", &other)),
                };
                let bound = if matches!(instruction.kind, InstructionKind::RangeStart { .. }) {
                    start
                } else {
                    end
                };
                self.define(*dest, RtValue::Index(bound));
            }
            InstructionKind::BinaryOp {
                op,
                dest,
                left,
                right,
            } => {
                let (left, right) = (self.int(left)?, self.int(right)?);
                let result = match op {
                    BinaryOp::Add => left.wrapping_add(right),
                    BinaryOp::Sub => left.wrapping_sub(right),
                    BinaryOp::Mul => left.wrapping_mul(right),
                };
                self.define(*dest, RtValue::Int(result));
            }
            InstructionKind::SpanIndex { dest, span, index } => {
                let view = self.span(span)?;
                let index = self.int(index)?;
                let base = match &view.base {
                    Some(base) if index >= 0 && (index as usize) < view.length => base,
                    _ => {
                        return Err(RuntimeError::IndexOutOfRange {
                            index,
                            length: view.length,
                        })
                    }
                };
                let address = base.join(Step::Element(view.start + index as usize));
                self.define(*dest, RtValue::Address(address));
            }
            InstructionKind::SpanSlice {
                dest,
                span,
                start,
                count,
            } => {
                let view = self.span(span)?;
                let (start, count) = (self.int(start)?, self.int(count)?);
                let in_range = start >= 0
                    && count >= 0
                    && start
                        .checked_add(count)
                        .is_some_and(|end| end as usize <= view.length);
                if !in_range {
                    return Err(RuntimeError::SliceOutOfRange {
                        start,
                        count,
                        length: view.length,
                    });
                }
                let slice = SpanView {
                    base: view.base.clone(),
                    start: view.start + start as usize,
                    length: count as usize,
                    readonly: view.readonly,
                };
                self.define(*dest, RtValue::Span(slice));
            }
            InstructionKind::DynamicConvert { dest, value } => {
                let value = self.int(value)?;
                self.define(*dest, RtValue::Int(value));
            }
            InstructionKind::NullGuard {
                dest,
                tested,
                body,
                result,
            } => {
                let value = if self.value(tested)? == RtValue::Null {
                    RtValue::Null
                } else {
                    if let Some(returned) = self.execute(body)? {
                        return Ok(Some(returned));
                    }
                    self.value(result)?
                };
                self.define(*dest, value);
            }
            InstructionKind::Return { value } => {
                let value = match value {
                    Some(value) => self.value(value)?,
                    None => RtValue::Unit,
                };
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

/// Default field values of a class object
fn default_object(vm: &Vm<'_>, class: TypeId) -> RtValue {
    match vm.program.types.struct_type(class) {
        Some(s) => RtValue::Struct(
            s.fields
                .iter()
                .map(|f| (f.name.clone(), default_value(&vm.program.types, f.ty)))
                .collect(),
        ),
        None => RtValue::Null,
    }
}

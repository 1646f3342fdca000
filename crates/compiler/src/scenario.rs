//! # Scenario Files
//!
//! A scenario is a TOML document describing the types and typed method bodies
//! of one program, the options to compile it with, the inputs of the entry
//! method and, optionally, the expected outcome.
//!
//! ```toml
//! [options]
//! run = true
//!
//! [[inline-arrays]]
//! name = "Buffer10"
//! element = "int"
//! length = 10
//!
//! [[structs]]
//! name = "Holder"
//! fields = [{ name = "F", type = "Buffer10" }]
//!
//! [[methods]]
//! name = "Main"
//! returns = "value"
//! return-type = "int"
//! parameters = [{ name = "x", kind = "ref", type = "Holder" }]
//!
//! [[methods.body]]
//! assign.target.index = { of.path = "x.F", at.int = 0 }
//! assign.value.int = 111
//!
//! [[methods.body]]
//! return.value.index = { of.path = "x.F", at.int = 0 }
//! ```
//!
//! Expressions and statements are externally tagged: the single key of each
//! table names the node. Inside a `conditional` access the evaluated receiver
//! is written as the string `"receiver"`.

use std::collections::BTreeMap;

use fixbuf_compiler_semantic::{
    ArgModifier, Argument, BinaryOp, ExprId, FieldDef, MethodBody, MethodBuilder, ParameterKind,
    Program, ReturnKind, StructKind, TypeData, TypeError, TypeId, TypeTable, VariableId,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::CompilerOptions;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("method '{0}' is declared more than once")]
    DuplicateMethod(String),
    #[error("variable '{name}' is declared more than once in method '{method}'")]
    DuplicateVariable { method: String, name: String },
    #[error("unknown variable '{name}' in method '{method}'")]
    UnknownVariable { method: String, name: String },
    #[error("'receiver' used outside of a conditional access in method '{0}'")]
    ReceiverOutsideConditional(String),
    #[error("struct '{0}' contains itself by value")]
    RecursiveStruct(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub options: CompilerOptions,
    /// Inline array types; an array may only use arrays declared before it
    #[serde(default)]
    pub inline_arrays: Vec<InlineArrayDecl>,
    #[serde(default)]
    pub structs: Vec<StructDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Arguments of the entry method by parameter name; `this` seeds the receiver
    #[serde(default)]
    pub inputs: BTreeMap<String, InputValue>,
    #[serde(default)]
    pub expect: Option<Expectations>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InlineArrayDecl {
    pub name: String,
    pub element: String,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructKindDecl {
    #[default]
    Struct,
    ReadonlyStruct,
    Class,
}

impl From<StructKindDecl> for StructKind {
    fn from(kind: StructKindDecl) -> Self {
        match kind {
            StructKindDecl::Struct => Self::Struct,
            StructKindDecl::ReadonlyStruct => Self::ReadonlyStruct,
            StructKindDecl::Class => Self::Class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StructDecl {
    pub name: String,
    #[serde(default)]
    pub kind: StructKindDecl,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnKindDecl {
    #[default]
    Void,
    Value,
    Ref,
    RefReadonly,
}

impl From<ReturnKindDecl> for ReturnKind {
    fn from(kind: ReturnKindDecl) -> Self {
        match kind {
            ReturnKindDecl::Void => Self::Void,
            ReturnKindDecl::Value => Self::Value,
            ReturnKindDecl::Ref => Self::Ref,
            ReturnKindDecl::RefReadonly => Self::RefReadonly,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKindDecl {
    #[default]
    Value,
    Ref,
    In,
    Out,
    RefReadonly,
}

impl From<ParameterKindDecl> for ParameterKind {
    fn from(kind: ParameterKindDecl) -> Self {
        match kind {
            ParameterKindDecl::Value => Self::Value,
            ParameterKindDecl::Ref => Self::Ref,
            ParameterKindDecl::In => Self::In,
            ParameterKindDecl::Out => Self::Out,
            ParameterKindDecl::RefReadonly => Self::RefReadonly,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierDecl {
    #[default]
    None,
    Ref,
    In,
    Out,
}

impl From<ModifierDecl> for ArgModifier {
    fn from(modifier: ModifierDecl) -> Self {
        match modifier {
            ModifierDecl::None => Self::None,
            ModifierDecl::Ref => Self::Ref,
            ModifierDecl::In => Self::In,
            ModifierDecl::Out => Self::Out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpDecl {
    Add,
    Sub,
    Mul,
}

impl From<OpDecl> for BinaryOp {
    fn from(op: OpDecl) -> Self {
        match op {
            OpDecl::Add => Self::Add,
            OpDecl::Sub => Self::Sub,
            OpDecl::Mul => Self::Mul,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InstanceDecl {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub unscoped_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(default)]
    pub kind: ParameterKindDecl,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub scoped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LocalDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Has an initializer; unassigned locals start out unassigned
    #[serde(default)]
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub returns: ReturnKindDecl,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub instance: Option<InstanceDecl>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub locals: Vec<LocalDecl>,
    #[serde(default)]
    pub body: Vec<StmtDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExprDecl {
    /// `x` or a field chain `x.F.G`
    Path(String),
    Field {
        of: Box<ExprDecl>,
        name: String,
    },
    Int(i64),
    Bool(bool),
    String(String),
    FromEnd(Box<ExprDecl>),
    Range {
        #[serde(default)]
        start: Option<Box<ExprDecl>>,
        #[serde(default)]
        end: Option<Box<ExprDecl>>,
    },
    Default(String),
    Call {
        callee: String,
        #[serde(default)]
        returns: ReturnKindDecl,
        #[serde(rename = "type")]
        ty: String,
    },
    /// Element access with a single positional argument
    Index {
        of: Box<ExprDecl>,
        at: Box<ExprDecl>,
    },
    /// Element access with an explicit argument list
    Element {
        of: Box<ExprDecl>,
        args: Vec<ArgDecl>,
    },
    Span {
        of: Box<ExprDecl>,
        #[serde(default)]
        readonly: bool,
    },
    Conditional {
        receiver: Box<ExprDecl>,
        access: Box<ExprDecl>,
    },
    Receiver,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ArgDecl {
    pub value: ExprDecl,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modifier: ModifierDecl,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StmtDecl {
    Expr(ExprDecl),
    Assign {
        target: ExprDecl,
        value: ExprDecl,
    },
    Compound {
        target: ExprDecl,
        op: OpDecl,
        value: ExprDecl,
    },
    RefLocal {
        name: String,
        #[serde(default)]
        readonly: bool,
        #[serde(rename = "type")]
        ty: String,
        init: ExprDecl,
    },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<ArgDecl>,
    },
    Return {
        #[serde(default)]
        value: Option<ExprDecl>,
    },
}

/// Plain data used for entry inputs and expected results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Bool(bool),
    Int(i64),
    List(Vec<InputValue>),
    Table(BTreeMap<String, InputValue>),
}

/// Expected outcome of compiling (and running) a scenario; absent keys are
/// not checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Expectations {
    /// Diagnostic codes of every method, in report order
    pub codes: Option<Vec<String>>,
    /// Names of the methods that were lowered
    pub lowered: Option<Vec<String>>,
    /// Span operations of a lowered method, in call order
    #[serde(default)]
    pub operations: BTreeMap<String, Vec<String>>,
    pub result: Option<InputValue>,
    /// Calls made to methods outside the scenario, rendered as `Name(args)`
    pub output: Option<Vec<String>>,
    pub runtime_error: Option<String>,
}

impl Scenario {
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Build the type table and every method body
    pub fn build_program(&self) -> Result<Program, ScenarioError> {
        let mut types = self.build_types()?;
        let mut seen = FxHashSet::default();
        let mut methods = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            if !seen.insert(method.name.as_str()) {
                return Err(ScenarioError::DuplicateMethod(method.name.clone()));
            }
            methods.push(build_method(&mut types, method)?);
        }
        debug!(
            types = self.inline_arrays.len() + self.structs.len(),
            methods = methods.len(),
            "scenario built"
        );
        Ok(Program { types, methods })
    }

    fn build_types(&self) -> Result<TypeTable, ScenarioError> {
        let mut types = TypeTable::new();
        let declared = self
            .structs
            .iter()
            .map(|s| Ok((types.declare_struct(&s.name, s.kind.into())?, s)))
            .collect::<Result<Vec<_>, ScenarioError>>()?;
        for array in &self.inline_arrays {
            let element = types.resolve(&array.element)?;
            types.add_inline_array(&array.name, element, array.length)?;
        }
        for (id, decl) in &declared {
            let fields = decl
                .fields
                .iter()
                .map(|f| {
                    Ok(FieldDef {
                        name: f.name.clone(),
                        ty: types.resolve(&f.ty)?,
                        readonly: f.readonly,
                    })
                })
                .collect::<Result<Vec<_>, ScenarioError>>()?;
            types.define_fields(*id, fields)?;
        }
        for (id, decl) in &declared {
            if contains_by_value(&types, *id, *id, &mut FxHashSet::default()) {
                return Err(ScenarioError::RecursiveStruct(decl.name.clone()));
            }
        }
        Ok(types)
    }
}

/// Whether `current` holds `target` inline, through struct fields and array elements
fn contains_by_value(
    types: &TypeTable,
    current: TypeId,
    target: TypeId,
    visited: &mut FxHashSet<TypeId>,
) -> bool {
    if !visited.insert(current) {
        return false;
    }
    let children: Vec<TypeId> = match types.get(current) {
        TypeData::Struct(s) if !s.kind.is_class() => s.fields.iter().map(|f| f.ty).collect(),
        TypeData::InlineArray(array) => vec![array.element],
        _ => return false,
    };
    children.into_iter().any(|child| {
        (child == target && !types.is_class(child))
            || contains_by_value(types, child, target, visited)
    })
}

fn build_method(
    types: &mut TypeTable,
    decl: &MethodDecl,
) -> Result<MethodBody, ScenarioError> {
    let mut builder = MethodBuilder::new(&decl.name);
    let mut scope = Scope {
        method: &decl.name,
        types,
        variables: FxHashMap::default(),
        receiver: None,
    };

    if let Some(instance) = &decl.instance {
        let ty = scope.types.resolve(&instance.ty)?;
        let this = builder.instance(ty, instance.readonly, instance.unscoped_ref);
        scope.declare("this", this)?;
    }
    let return_type = decl
        .return_type
        .as_deref()
        .map(|ty| scope.types.resolve(ty))
        .transpose()?;
    builder.returns(decl.returns.into(), return_type);

    for parameter in &decl.parameters {
        let ty = scope.types.resolve(&parameter.ty)?;
        let id = if parameter.scoped {
            builder.scoped_parameter(&parameter.name, parameter.kind.into(), ty)
        } else {
            builder.parameter(&parameter.name, parameter.kind.into(), ty)
        };
        scope.declare(&parameter.name, id)?;
    }
    for local in &decl.locals {
        let ty = scope.types.resolve(&local.ty)?;
        let id = if local.initialized {
            builder.initialized_local(&local.name, ty)
        } else {
            builder.local(&local.name, ty)
        };
        scope.declare(&local.name, id)?;
    }

    for statement in &decl.body {
        scope.statement(&mut builder, statement)?;
    }
    Ok(builder.finish())
}

/// Name resolution state while building one method
struct Scope<'a> {
    method: &'a str,
    types: &'a mut TypeTable,
    variables: FxHashMap<String, VariableId>,
    receiver: Option<ExprId>,
}

impl Scope<'_> {
    fn declare(&mut self, name: &str, id: VariableId) -> Result<(), ScenarioError> {
        if self.variables.insert(name.to_string(), id).is_some() {
            return Err(ScenarioError::DuplicateVariable {
                method: self.method.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<VariableId, ScenarioError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownVariable {
                method: self.method.to_string(),
                name: name.to_string(),
            })
    }

    fn statement(&mut self, b: &mut MethodBuilder, decl: &StmtDecl) -> Result<(), ScenarioError> {
        match decl {
            StmtDecl::Expr(expr) => {
                let expr = self.expr(b, expr)?;
                b.expr_stmt(expr);
            }
            StmtDecl::Assign { target, value } => {
                let target = self.expr(b, target)?;
                let value = self.expr(b, value)?;
                b.assign(target, value);
            }
            StmtDecl::Compound { target, op, value } => {
                let target = self.expr(b, target)?;
                let value = self.expr(b, value)?;
                b.compound_assign(target, (*op).into(), value);
            }
            StmtDecl::RefLocal {
                name,
                readonly,
                ty,
                init,
            } => {
                let ty = self.types.resolve(ty)?;
                let init = self.expr(b, init)?;
                let local = b.ref_local(name, *readonly, ty, init);
                self.declare(name, local)?;
            }
            StmtDecl::Call { callee, args } => {
                let args = self.arguments(b, args)?;
                b.call_stmt(callee, args);
            }
            StmtDecl::Return { value } => {
                let value = value.as_ref().map(|v| self.expr(b, v)).transpose()?;
                b.ret(value);
            }
        }
        Ok(())
    }

    fn arguments(
        &mut self,
        b: &mut MethodBuilder,
        args: &[ArgDecl],
    ) -> Result<Vec<Argument>, ScenarioError> {
        args.iter()
            .map(|arg| {
                Ok(Argument {
                    value: self.expr(b, &arg.value)?,
                    name: arg.name.clone(),
                    modifier: arg.modifier.into(),
                })
            })
            .collect()
    }

    fn expr(&mut self, b: &mut MethodBuilder, decl: &ExprDecl) -> Result<ExprId, ScenarioError> {
        Ok(match decl {
            ExprDecl::Path(path) => {
                let mut segments = path.split('.');
                let root = self.lookup(segments.next().unwrap_or_default())?;
                let base = b.var(root);
                segments.fold(base, |acc, field| b.field(acc, field))
            }
            ExprDecl::Field { of, name } => {
                let receiver = self.expr(b, of)?;
                b.field(receiver, name)
            }
            ExprDecl::Int(value) => b.int(*value),
            ExprDecl::Bool(value) => b.bool(*value),
            ExprDecl::String(value) => b.string(value),
            ExprDecl::FromEnd(inner) => {
                let inner = self.expr(b, inner)?;
                b.from_end(inner)
            }
            ExprDecl::Range { start, end } => {
                let start = start.as_deref().map(|e| self.expr(b, e)).transpose()?;
                let end = end.as_deref().map(|e| self.expr(b, e)).transpose()?;
                b.range(start, end)
            }
            ExprDecl::Default(ty) => {
                let ty = self.types.resolve(ty)?;
                b.default_of(ty)
            }
            ExprDecl::Call {
                callee,
                returns,
                ty,
            } => {
                let ty = self.types.resolve(ty)?;
                b.call(callee, (*returns).into(), ty)
            }
            ExprDecl::Index { of, at } => {
                let receiver = self.expr(b, of)?;
                let arg = self.expr(b, at)?;
                b.index(receiver, arg)
            }
            ExprDecl::Element { of, args } => {
                let receiver = self.expr(b, of)?;
                let args = self.arguments(b, args)?;
                b.element(receiver, args)
            }
            ExprDecl::Span { of, readonly } => {
                let operand = self.expr(b, of)?;
                b.span_of(operand, *readonly)
            }
            ExprDecl::Conditional { receiver, access } => {
                let receiver = self.expr(b, receiver)?;
                let mut failure = None;
                let id = b.conditional(receiver, |b, placeholder| {
                    let outer = self.receiver.replace(placeholder);
                    let id = self.expr(b, access).unwrap_or_else(|err| {
                        failure = Some(err);
                        placeholder
                    });
                    self.receiver = outer;
                    id
                });
                if let Some(err) = failure {
                    return Err(err);
                }
                id
            }
            ExprDecl::Receiver => self
                .receiver
                .ok_or_else(|| ScenarioError::ReceiverOutsideConditional(self.method.to_string()))?,
        })
    }
}

//! Runtime values passed through linked call sites.

use std::fmt;
use std::sync::Arc;

use latebind_core::{DataType, PrimitiveKind};

use crate::LinkError;

/// A linked implementation: takes every argument (receiver first) and
/// returns the result.
pub type Target = Arc<dyn Fn(&[Value]) -> Result<Value, LinkError> + Send + Sync>;

/// Handle to a host object, identified by its type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    pub type_name: Arc<str>,
    pub id: u64,
}

impl ObjectHandle {
    pub fn new(type_name: &str, id: u64) -> Self {
        Self {
            type_name: Arc::from(type_name),
            id,
        }
    }
}

/// An instance of a functional interface.
///
/// Calling it runs the implementation it was materialized from, through a
/// bridge adapter when the signatures differ.
#[derive(Clone)]
pub struct FunctionObject {
    /// Functional interface this object implements.
    pub interface: String,
    /// Name of the interface method.
    pub method: String,
    callable: Target,
}

impl FunctionObject {
    pub fn new(interface: impl Into<String>, method: impl Into<String>, callable: Target) -> Self {
        Self {
            interface: interface.into(),
            method: method.into(),
            callable,
        }
    }

    /// Invoke the interface method.
    pub fn call(&self, args: &[Value]) -> Result<Value, LinkError> {
        (self.callable)(args)
    }

    /// Whether two objects share the same callable.
    pub fn ptr_eq(&self, other: &FunctionObject) -> bool {
        Arc::ptr_eq(&self.callable, &other.callable)
    }
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionObject")
            .field("interface", &self.interface)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FunctionObject {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface && self.ptr_eq(other)
    }
}

/// A dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Object(ObjectHandle),
    Function(FunctionObject),
}

impl Value {
    /// The runtime type name, used as the call-site guard.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Object(handle) => &handle.type_name,
            Value::Function(function) => &function.interface,
        }
    }

    /// Convert to `target`, boxing through `def` and widening primitives.
    pub fn convert_to(self, target: &DataType) -> Result<Value, LinkError> {
        use PrimitiveKind::*;

        let converted = match (self, target) {
            (value, DataType::Def) => value,
            (_, DataType::Void) => Value::Void,
            (value @ Value::String(_), DataType::String) => value,
            (Value::Object(handle), DataType::Object(name)) if *handle.type_name == **name => {
                Value::Object(handle)
            }
            (Value::Function(function), DataType::Object(name)) if function.interface == *name => {
                Value::Function(function)
            }
            (Value::Bool(v), DataType::Primitive(Bool)) => Value::Bool(v),
            (Value::Int(v), DataType::Primitive(Int)) => Value::Int(v),
            (Value::Int(v), DataType::Primitive(Long)) => Value::Long(i64::from(v)),
            (Value::Int(v), DataType::Primitive(Float)) => Value::Float(v as f32),
            (Value::Int(v), DataType::Primitive(Double)) => Value::Double(f64::from(v)),
            (Value::Long(v), DataType::Primitive(Long)) => Value::Long(v),
            (Value::Long(v), DataType::Primitive(Float)) => Value::Float(v as f32),
            (Value::Long(v), DataType::Primitive(Double)) => Value::Double(v as f64),
            (Value::Float(v), DataType::Primitive(Float)) => Value::Float(v),
            (Value::Float(v), DataType::Primitive(Double)) => Value::Double(f64::from(v)),
            (Value::Double(v), DataType::Primitive(Double)) => Value::Double(v),
            (value, _) => {
                return Err(LinkError::Conversion {
                    from: value.type_name().to_string(),
                    to: target.to_string(),
                });
            }
        };
        Ok(converted)
    }

    pub fn as_function(&self) -> Option<&FunctionObject> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }
}

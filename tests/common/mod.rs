//! Test harness for compiled scripts.
//!
//! Provides a host with native bindings for the standard registry types and
//! a small stack machine that executes a compiled chunk against it, linking
//! every `InvokeDynamic` through a [`CallSiteTable`].
//!
//! Integer constants are pushed as `long`: the chunk does not record the
//! width of integer literals.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use latebind::{
    Bootstrap, CallSiteTable, CompiledScript, Constant, DataType, LinkError, NativeHost,
    ObjectHandle, OpCode, PrimitiveKind, Span, TypeRegistry, Value,
};

pub fn at(line: u32, col: u32) -> Span {
    Span::new(line, col, 1)
}

pub fn long() -> DataType {
    DataType::Primitive(PrimitiveKind::Long)
}

fn arity(expected: usize, args: &[Value]) -> LinkError {
    LinkError::ArityMismatch {
        expected,
        found: args.len(),
    }
}

/// Standard registry plus:
/// - `Math::negate(long) -> long`
/// - `string::applyToLength(LongUnaryOperator) -> long`
/// - `List::forEachSize(Consumer) -> void`
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::with_standard_types();
    registry
        .add_static("Math", "negate", vec![long()], long())
        .unwrap();
    registry
        .add_method(
            "string",
            "applyToLength",
            vec![DataType::object("LongUnaryOperator")],
            long(),
        )
        .unwrap();
    registry
}

/// A host with every member of [`registry`] bound. Lists live in a shared
/// arena indexed by handle id.
pub fn host() -> NativeHost {
    let mut host = NativeHost::new(registry());
    let lists: Arc<Mutex<Vec<Vec<Value>>>> = Arc::default();

    host.bind_static("Math", "abs", 1, |args| match args {
        [Value::Long(v)] => Ok(Value::Long(v.abs())),
        _ => Err(arity(1, args)),
    })
    .unwrap();
    host.bind_static("Math", "negate", 1, |args| match args {
        [Value::Long(v)] => Ok(Value::Long(-v)),
        _ => Err(arity(1, args)),
    })
    .unwrap();
    host.bind_static("Math", "max", 2, |args| match args {
        [Value::Long(a), Value::Long(b)] => Ok(Value::Long(*a.max(b))),
        _ => Err(arity(2, args)),
    })
    .unwrap();
    host.bind_static("Math", "sqrt", 1, |args| match args {
        [Value::Double(v)] => Ok(Value::Double(v.sqrt())),
        _ => Err(arity(1, args)),
    })
    .unwrap();

    host.bind_method("string", "length", 0, |args| match args {
        [Value::String(s)] => Ok(Value::Int(s.len() as i32)),
        _ => Err(arity(1, args)),
    })
    .unwrap();
    host.bind_method("string", "isEmpty", 0, |args| match args {
        [Value::String(s)] => Ok(Value::Bool(s.is_empty())),
        _ => Err(arity(1, args)),
    })
    .unwrap();
    host.bind_method("string", "compareTo", 1, |args| match args {
        [Value::String(a), Value::String(b)] => Ok(Value::Int(a.cmp(b) as i32)),
        _ => Err(arity(2, args)),
    })
    .unwrap();
    host.bind_method("string", "applyToLength", 1, |args| match args {
        [Value::String(s), Value::Function(f)] => f.call(&[Value::Long(s.len() as i64)]),
        _ => Err(arity(2, args)),
    })
    .unwrap();

    let store = Arc::clone(&lists);
    host.bind_constructor("List", 0, move |_| {
        let mut lists = store.lock().map_err(|_| LinkError::LockPoisoned)?;
        lists.push(Vec::new());
        Ok(Value::Object(ObjectHandle::new("List", lists.len() as u64 - 1)))
    })
    .unwrap();
    let store = Arc::clone(&lists);
    host.bind_method("List", "add", 1, move |args| match args {
        [Value::Object(list), item] => {
            let mut lists = store.lock().map_err(|_| LinkError::LockPoisoned)?;
            lists[list.id as usize].push(item.clone());
            Ok(Value::Bool(true))
        }
        _ => Err(arity(2, args)),
    })
    .unwrap();
    let store = Arc::clone(&lists);
    host.bind_method("List", "size", 0, move |args| match args {
        [Value::Object(list)] => {
            let lists = store.lock().map_err(|_| LinkError::LockPoisoned)?;
            Ok(Value::Int(lists[list.id as usize].len() as i32))
        }
        _ => Err(arity(1, args)),
    })
    .unwrap();

    host
}

/// Why a script stopped.
#[derive(Debug, PartialEq)]
pub enum RunError {
    Link(LinkError),
    Malformed(String),
}

impl From<LinkError> for RunError {
    fn from(err: LinkError) -> Self {
        RunError::Link(err)
    }
}

/// Execute `script` and return its result (`Value::Void` for `return;`).
pub fn run(script: &CompiledScript, host: &NativeHost) -> Result<Value, RunError> {
    let sites = CallSiteTable::from_chunk(&script.chunk);
    run_with(script, host, &sites)
}

/// Execute `script` with an existing call-site table, so caches persist
/// across runs.
pub fn run_with(
    script: &CompiledScript,
    host: &NativeHost,
    sites: &CallSiteTable,
) -> Result<Value, RunError> {
    let chunk = &script.chunk;
    let mut stack: Vec<Value> = Vec::new();
    let mut locals = vec![Value::Void; script.locals as usize];
    let mut ip = 0;

    while ip < chunk.len() {
        let op = chunk.read_op(ip).ok_or_else(|| malformed("bad opcode", ip))?;
        let operand = match op.operand_size() {
            1 => chunk.read_byte(ip + 1).map(u16::from),
            2 => chunk.read_u16(ip + 1),
            _ => Some(0),
        }
        .ok_or_else(|| malformed("truncated operand", ip))?;
        let at = ip;
        ip += 1 + op.operand_size();

        match op {
            OpCode::Constant | OpCode::ConstantWide => {
                let value = match script.constants.get(u32::from(operand)) {
                    Some(Constant::Int(v)) => Value::Long(*v),
                    Some(Constant::Float32(v)) => Value::Float(*v),
                    Some(Constant::Float64(v)) => Value::Double(*v),
                    Some(Constant::StringData(bytes)) => {
                        Value::String(String::from_utf8_lossy(bytes).into_owned())
                    }
                    _ => return Err(malformed("bad constant", at)),
                };
                stack.push(value);
            }
            OpCode::PushTrue => stack.push(Value::Bool(true)),
            OpCode::PushFalse => stack.push(Value::Bool(false)),
            OpCode::PushZero => stack.push(Value::Long(0)),
            OpCode::PushOne => stack.push(Value::Long(1)),
            OpCode::Pop => {
                pop(&mut stack, at)?;
            }
            OpCode::GetLocal | OpCode::GetLocalWide => {
                stack.push(locals[operand as usize].clone());
            }
            OpCode::SetLocal | OpCode::SetLocalWide => {
                locals[operand as usize] = pop(&mut stack, at)?;
            }
            OpCode::I32toI64 | OpCode::ToDef => {}
            OpCode::I32toF32 | OpCode::I64toF32 => {
                let value = pop(&mut stack, at)?.convert_to(&DataType::Primitive(PrimitiveKind::Float))?;
                stack.push(value);
            }
            OpCode::I32toF64 | OpCode::I64toF64 | OpCode::F32toF64 => {
                let value = pop(&mut stack, at)?.convert_to(&DataType::Primitive(PrimitiveKind::Double))?;
                stack.push(value);
            }
            OpCode::FromDef => {
                let value = pop(&mut stack, at)?;
                let target = match script.constants.get(u32::from(operand)) {
                    Some(Constant::TypeHash(hash)) => *hash,
                    _ => return Err(malformed("bad type constant", at)),
                };
                if DataType::object(value.type_name()).type_hash() != target {
                    return Err(RunError::Link(LinkError::Conversion {
                        from: value.type_name().to_string(),
                        to: format!("{target:?}"),
                    }));
                }
                stack.push(value);
            }
            OpCode::InvokeDynamic => {
                let site = sites
                    .get(operand)
                    .ok_or_else(|| malformed("unknown call site", at))?;
                let count = site.descriptor().param_count();
                if stack.len() < count {
                    return Err(malformed("stack underflow", at));
                }
                let mut args = stack.split_off(stack.len() - count);
                let result = match site.descriptor().bootstrap {
                    Bootstrap::LambdaFactory => Value::Function(site.instantiate(host)?),
                    Bootstrap::DefCall => {
                        let receiver = args.remove(0);
                        site.invoke(host, receiver, args)?
                    }
                };
                stack.push(result);
            }
            OpCode::Return => return pop(&mut stack, at),
            OpCode::ReturnVoid => return Ok(Value::Void),
        }
    }

    Err(malformed("fell off the end", chunk.len()))
}

fn malformed(what: &str, offset: usize) -> RunError {
    RunError::Malformed(format!("{what} at {offset}"))
}

fn pop(stack: &mut Vec<Value>, offset: usize) -> Result<Value, RunError> {
    stack.pop().ok_or_else(|| malformed("stack underflow", offset))
}

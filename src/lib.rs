//! latebind
//!
//! Late-bound call sites for a small scripting language: function
//! references (`Type::member`) and method calls on untyped (`def`)
//! receivers compile to `InvokeDynamic` sites that are linked and cached at
//! runtime.
//!
//! ```
//! use latebind::{Compiler, Expr, NativeHost, Script, Span, Stmt, TypeRegistry, Value};
//! use latebind::{CallSiteTable, LinkError};
//!
//! let mut host = NativeHost::new(TypeRegistry::with_standard_types());
//! host.bind_method("string", "length", 0, |args| match args {
//!     [Value::String(s)] => Ok(Value::Int(s.len() as i32)),
//!     _ => Err(LinkError::ArityMismatch { expected: 1, found: args.len() }),
//! })
//! .unwrap();
//!
//! let at = |line| Span::new(line, 1, 1);
//! let mut script = Script::new(vec![
//!     Stmt::local("s", "def", Expr::string("hello", at(1)), at(1)),
//!     Stmt::expr(Expr::def_call(Expr::var("s", at(2)), "length", vec![], at(2))),
//! ]);
//! let compiled = latebind::compile(host.registry(), &mut script).unwrap();
//!
//! let sites = CallSiteTable::from_chunk(&compiled.chunk);
//! let length = sites.get(0).unwrap();
//! assert_eq!(length.invoke(&host, Value::String("hello".into()), vec![]), Ok(Value::Int(5)));
//! ```

mod error;
mod host;

pub use error::{Error, Result};
pub use host::NativeHost;

pub use latebind_compiler::{
    Bootstrap, BytecodeChunk, CallSiteDescriptor, CompileOptions, CompiledScript, Compiler,
    Constant, ConstantPool, Expr, ExprKind, FactoryFlags, OpCode, Script, StaticArg, Stmt,
};
pub use latebind_core::{
    ArgRecipe, CompilationError, DataType, DescriptorError, HandleKind, MethodHandle,
    MethodType, PrimitiveKind, RegistrationError, Span, TypeHash,
};
pub use latebind_registry::{FunctionRef, TypeRegistry};
pub use latebind_runtime::{
    CallSite, CallSiteTable, FunctionObject, LinkError, LinkedTarget, ObjectHandle, Resolver,
    Target, Value,
};

/// Compile `script` against `registry` with default options.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(registry: &TypeRegistry, script: &mut Script) -> Result<CompiledScript> {
    Ok(Compiler::new(registry).compile(script)?)
}

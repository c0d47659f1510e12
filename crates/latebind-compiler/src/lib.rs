//! latebind compiler
//!
//! Compiles scripts whose calls may be bound late: function references
//! (`Type::member`) and method calls on untyped (`def`) receivers become
//! `InvokeDynamic` call sites that a runtime links and caches per site.
//!
//! ## Architecture
//!
//! - **Analysis**: walk every statement top-down, resolving static types,
//!   building function reference descriptors and dynamic call recipes.
//!   Errors are collected per statement.
//! - **Emission**: only when analysis succeeded, generate bytecode, the
//!   call-site table and debug positions.
//!
//! ## Modules
//!
//! - [`ast`]: expression and statement trees
//! - [`bytecode`]: opcodes, chunks, constants and call-site descriptors
//! - [`context`]: locals and type resolution during analysis
//! - [`conversion`]: implicit conversions
//! - [`emit`]: bytecode emitter
//! - [`expr`]: expression analysis and emission
//! - [`stmt`]: statement analysis and emission

pub mod ast;
pub mod bytecode;
pub mod context;
pub mod conversion;
pub mod emit;
pub mod expr;
pub mod stmt;

pub use ast::{Expr, ExprKind, Script, Stmt};
pub use bytecode::{
    Bootstrap, BytecodeChunk, CallSiteDescriptor, Constant, ConstantPool, FactoryFlags, OpCode,
    StaticArg,
};
pub use context::{AnalysisContext, LocalVar};
pub use emit::{BytecodeEmitter, EmitError};

// Re-export CompilationError from core for convenience
pub use latebind_core::CompilationError;

use latebind_registry::TypeRegistry;

/// Compiler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Record a source position before every late-bound call site.
    pub debug_info: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { debug_info: true }
    }
}

/// A compiled script.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub chunk: BytecodeChunk,
    pub constants: ConstantPool,
    /// Number of local slots the script uses.
    pub locals: u32,
}

/// The main compiler entry point.
pub struct Compiler<'r> {
    registry: &'r TypeRegistry,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile a script.
    ///
    /// Analysis continues past a failing statement so every diagnostic is
    /// reported; any error means no script is produced.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, script: &mut Script) -> Result<CompiledScript, Vec<CompilationError>> {
        let mut ctx = AnalysisContext::new(self.registry);
        let errors: Vec<CompilationError> = script
            .stmts
            .iter_mut()
            .filter_map(|stmt| stmt::analyze(&mut ctx, stmt).err())
            .collect();
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut constants = ConstantPool::new();
        let mut emitter =
            BytecodeEmitter::new(&mut constants).with_debug_info(self.options.debug_info);
        for stmt in &script.stmts {
            stmt::emit(&mut emitter, stmt).map_err(|err| vec![err])?;
        }
        if !script.ends_with_return() {
            emitter.emit_return_void();
        }
        let chunk = emitter.finish();

        Ok(CompiledScript {
            chunk,
            constants,
            locals: ctx.local_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_core::Span;

    fn at(line: u32, col: u32) -> Span {
        Span::new(line, col, 1)
    }

    #[test]
    fn empty_script_returns() {
        let registry = TypeRegistry::new();
        let compiled = Compiler::new(&registry).compile(&mut Script::default()).unwrap();
        compiled.chunk.assert_opcodes(&[OpCode::ReturnVoid]);
        assert_eq!(compiled.locals, 0);
    }

    #[test]
    fn explicit_return_is_not_doubled() {
        let registry = TypeRegistry::new();
        let mut script = Script::new(vec![Stmt::ret(None, at(1, 1))]);
        let compiled = Compiler::new(&registry).compile(&mut script).unwrap();
        compiled.chunk.assert_opcodes(&[OpCode::ReturnVoid]);
    }

    #[test]
    fn errors_are_collected_across_statements() {
        let registry = TypeRegistry::with_standard_types();
        let mut script = Script::new(vec![
            Stmt::local("f", "Function", Expr::function_ref("Bogus", "nope", at(1, 14)), at(1, 1)),
            Stmt::expr(Expr::int(3, at(2, 1))),
            Stmt::expr(Expr::def_call(Expr::var("missing", at(3, 1)), "go", vec![], at(3, 8))),
        ]);
        let errors = Compiler::new(&registry).compile(&mut script).unwrap_err();

        let spans: Vec<_> = errors.iter().map(CompilationError::span).collect();
        assert_eq!(spans, vec![at(1, 14), at(2, 1), at(3, 1)]);
        assert!(matches!(errors[0], CompilationError::InvalidFunctionRef { .. }));
        assert!(matches!(errors[1], CompilationError::NotAStatement { .. }));
        assert!(matches!(errors[2], CompilationError::UnknownVariable { .. }));
    }

    #[test]
    fn debug_info_can_be_disabled() {
        let registry = TypeRegistry::with_standard_types();
        let build = || {
            Script::new(vec![
                Stmt::local("x", "def", Expr::string("s", at(1, 9)), at(1, 1)),
                Stmt::expr(Expr::def_call(Expr::var("x", at(2, 1)), "length", vec![], at(2, 2))),
            ])
        };

        let with = Compiler::new(&registry).compile(&mut build()).unwrap();
        let without = Compiler::new(&registry)
            .with_options(CompileOptions { debug_info: false })
            .compile(&mut build())
            .unwrap();

        assert_eq!(with.chunk.positions().len(), 1);
        assert!(without.chunk.positions().is_empty());
        assert_eq!(with.chunk.code(), without.chunk.code());
        assert_eq!(with.chunk.lines(), without.chunk.lines());
    }

    #[test]
    fn call_site_overflow_is_a_located_error() {
        let registry = TypeRegistry::with_standard_types();
        let sites = usize::from(u16::MAX) + 2;
        let mut stmts = vec![Stmt::local("x", "def", Expr::string("s", at(1, 9)), at(1, 1))];
        stmts.extend((0..sites).map(|i| {
            let line = i as u32 + 2;
            Stmt::expr(Expr::def_call(Expr::var("x", at(line, 1)), "size", vec![], at(line, 2)))
        }));
        let last = at(sites as u32 + 1, 2);

        let errors = Compiler::new(&registry)
            .compile(&mut Script::new(stmts))
            .unwrap_err();
        assert_eq!(
            errors,
            vec![CompilationError::Unsupported {
                message: "more than 65536 call sites in one script".into(),
                span: last,
            }]
        );
    }
}

//! Expression analysis and emission.
//!
//! Compilation of an expression happens in two passes over the same node:
//!
//! - [`analyze`] runs top-down with the node's `expected` type already set by
//!   its parent. It fills `actual`, builds descriptors and recipes, and picks
//!   the implicit conversion to `expected`.
//! - [`Expr::load`] emits code leaving the node's value on the stack.
//!   [`Expr::write`] is the statement form and [`Expr::store`] the assignment
//!   target form.
//!
//! # Example
//!
//! ```
//! use latebind_compiler::ast::Expr;
//! use latebind_compiler::bytecode::{ConstantPool, OpCode};
//! use latebind_compiler::context::AnalysisContext;
//! use latebind_compiler::emit::BytecodeEmitter;
//! use latebind_compiler::expr;
//! use latebind_core::{DataType, Span};
//! use latebind_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::with_standard_types();
//! let mut ctx = AnalysisContext::new(&registry);
//! let mut node = Expr::function_ref("Math", "abs", Span::new(1, 1, 9))
//!     .with_expected(DataType::object("LongUnaryOperator"));
//! expr::analyze(&mut ctx, &mut node).unwrap();
//!
//! let mut constants = ConstantPool::new();
//! let mut emitter = BytecodeEmitter::new(&mut constants);
//! node.load(&mut emitter).unwrap();
//! emitter.finish().assert_opcodes(&[OpCode::InvokeDynamic]);
//! ```

mod def_call;
mod function_ref;
mod literals;
mod variables;

use latebind_core::{CompilationError, DataType, Span};

use crate::ast::{Expr, ExprKind};
use crate::context::AnalysisContext;
use crate::conversion::require_conversion;
use crate::emit::BytecodeEmitter;

pub use def_call::{MAX_DYNAMIC_ARGS, def_call_signature};
pub use function_ref::factory_static_args;

pub(crate) type Result<T> = std::result::Result<T, CompilationError>;

/// Analyze `expr` against its `expected` type.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze(ctx: &mut AnalysisContext<'_>, expr: &mut Expr) -> Result<()> {
    let span = expr.span;
    let actual = match &mut expr.kind {
        ExprKind::Literal(literal) => literals::analyze(literal),
        ExprKind::Variable(node) => variables::analyze(ctx, node, span)?,
        ExprKind::FunctionRef(node) => {
            function_ref::analyze(ctx, node, expr.expected.as_ref(), span)?
        }
        ExprKind::DynamicCall(node) => def_call::analyze(ctx, node, span)?,
    };

    if expr.internal {
        expr.expected = Some(actual.clone());
    }
    expr.conversion = match &expr.expected {
        Some(expected) if *expected != actual => {
            Some(require_conversion(&actual, expected, span)?)
        }
        _ => None,
    };
    expr.actual = Some(actual);
    Ok(())
}

/// Point an analyzed node at `target`, replacing its conversion.
pub(crate) fn convert_to(expr: &mut Expr, target: DataType) -> Result<()> {
    let actual = expr.actual.as_ref().ok_or_else(|| not_analyzed(expr.span))?;
    expr.conversion = if *actual == target {
        None
    } else {
        Some(require_conversion(actual, &target, expr.span)?)
    };
    expr.expected = Some(target);
    Ok(())
}

impl Expr {
    /// Emit code that leaves this node's value on the stack.
    pub fn load(&self, emitter: &mut BytecodeEmitter<'_>) -> Result<()> {
        match &self.kind {
            ExprKind::Literal(literal) => {
                literals::load(emitter, literal).map_err(|err| err.at(self.span))?
            }
            ExprKind::Variable(node) => variables::load(emitter, node, self.span)?,
            ExprKind::FunctionRef(node) => function_ref::load(emitter, node, self.span)?,
            ExprKind::DynamicCall(node) => def_call::load(emitter, node, self.span)?,
        }
        if let Some(conversion) = &self.conversion {
            conversion.emit(emitter).map_err(|err| err.at(self.span))?;
        }
        Ok(())
    }

    /// Emit the statement form of this node.
    ///
    /// The caller has already loaded the value and discards it afterwards.
    pub fn write(&self, emitter: &mut BytecodeEmitter<'_>) -> Result<()> {
        match &self.kind {
            ExprKind::DynamicCall(node) => def_call::write(emitter, node),
            _ => Err(illegal_tree(self.span)),
        }
    }

    /// Emit a store of the value on top of the stack into this node.
    pub fn store(&self, emitter: &mut BytecodeEmitter<'_>) -> Result<()> {
        match &self.kind {
            ExprKind::Variable(node) => variables::store(emitter, node, self.span),
            ExprKind::DynamicCall(node) => def_call::store(emitter, node, self.span),
            ExprKind::Literal(_) | ExprKind::FunctionRef(_) => Err(illegal_tree(self.span)),
        }
    }
}

pub(crate) fn illegal_tree(span: Span) -> CompilationError {
    CompilationError::Internal {
        message: "illegal tree structure".to_string(),
        span,
    }
}

pub(crate) fn not_analyzed(span: Span) -> CompilationError {
    CompilationError::Internal {
        message: "expression emitted before analysis".to_string(),
        span,
    }
}

//! Statement analysis and emission.
//!
//! Statements are flat: local declarations, assignments to locals,
//! expression statements and returns. A script returns `def`, so a returned
//! value is converted to `def` like any other typed context.

use latebind_core::{CompilationError, DataType};

use crate::ast::{AssignStmt, Expr, ExprKind, LocalStmt, ReturnStmt, Stmt};
use crate::context::AnalysisContext;
use crate::emit::BytecodeEmitter;
use crate::expr::{self, not_analyzed};

type Result<T> = std::result::Result<T, CompilationError>;

/// Analyze one statement.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze(ctx: &mut AnalysisContext<'_>, stmt: &mut Stmt) -> Result<()> {
    match stmt {
        Stmt::Local(local) => analyze_local(ctx, local),
        Stmt::Assign(assign) => analyze_assign(ctx, assign),
        Stmt::Expr(expr) => analyze_expr_stmt(ctx, expr),
        Stmt::Return(ret) => analyze_return(ctx, ret),
    }
}

/// Emit one analyzed statement.
pub fn emit(emitter: &mut BytecodeEmitter<'_>, stmt: &Stmt) -> Result<()> {
    emitter.set_line(stmt.span().line);
    match stmt {
        Stmt::Local(local) => {
            let slot = local.slot.ok_or_else(|| not_analyzed(local.span))?;
            local.init.load(emitter)?;
            emitter
                .emit_set_local(slot)
                .map_err(|err| err.at(local.span))?;
        }
        Stmt::Assign(assign) => {
            assign.value.load(emitter)?;
            assign.target.store(emitter)?;
        }
        Stmt::Expr(expr) => {
            expr.load(emitter)?;
            expr.write(emitter)?;
            emitter.emit_pop();
        }
        Stmt::Return(ReturnStmt { value: Some(value), .. }) => {
            value.load(emitter)?;
            emitter.emit_return();
        }
        Stmt::Return(ReturnStmt { value: None, .. }) => emitter.emit_return_void(),
    }
    Ok(())
}

fn analyze_local(ctx: &mut AnalysisContext<'_>, local: &mut LocalStmt) -> Result<()> {
    let declared = ctx.resolve_type(&local.ty, local.span)?;

    local.init.expected = Some(declared.clone());
    let init = expr::analyze(ctx, &mut local.init);

    // Declare even when the initializer failed so later uses don't cascade.
    local.slot = Some(ctx.declare_local(&local.name, declared, local.span)?);
    init
}

fn analyze_assign(ctx: &mut AnalysisContext<'_>, assign: &mut AssignStmt) -> Result<()> {
    if !matches!(assign.target.kind, ExprKind::Variable(_)) {
        return Err(CompilationError::NotAnLvalue {
            span: assign.target.span,
        });
    }
    assign.target.expected = None;
    expr::analyze(ctx, &mut assign.target)?;

    assign.value.expected = assign.target.actual.clone();
    expr::analyze(ctx, &mut assign.value)
}

fn analyze_expr_stmt(ctx: &mut AnalysisContext<'_>, expr: &mut Expr) -> Result<()> {
    expr.expected = None;
    expr::analyze(ctx, expr)?;
    if !expr.is_statement() {
        return Err(CompilationError::NotAStatement { span: expr.span });
    }
    Ok(())
}

fn analyze_return(ctx: &mut AnalysisContext<'_>, ret: &mut ReturnStmt) -> Result<()> {
    match &mut ret.value {
        Some(value) => {
            value.expected = Some(DataType::Def);
            expr::analyze(ctx, value)
        }
        None => Ok(()),
    }
}

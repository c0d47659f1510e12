//! Method calls on untyped (`def`) receivers.
//!
//! The call compiles to one `DefCall` site whose signature is the receiver
//! and argument descriptors with a `def` result. Function-reference
//! arguments are compiled untyped (to their `"Type.member"` string) and
//! flagged in the site's [`ArgRecipe`] so the runtime can convert them once
//! the target method is known.

use latebind_core::{ArgRecipe, CompilationError, DataType, Span};

use super::{Result, illegal_tree, not_analyzed};
use crate::ast::{DynamicCallNode, ExprKind};
use crate::bytecode::{Bootstrap, StaticArg, site_kind};
use crate::context::AnalysisContext;
use crate::emit::BytecodeEmitter;

/// Largest argument count a dynamic call accepts.
pub const MAX_DYNAMIC_ARGS: usize = ArgRecipe::MAX_ARGS;

pub(super) fn analyze(
    ctx: &mut AnalysisContext<'_>,
    node: &mut DynamicCallNode,
    span: Span,
) -> Result<DataType> {
    if node.args.len() > MAX_DYNAMIC_ARGS {
        return Err(CompilationError::Unsupported {
            message: format!(
                "methods with > {} arguments are currently not supported",
                MAX_DYNAMIC_ARGS
            ),
            span,
        });
    }

    node.receiver.expected = None;
    super::analyze(ctx, &mut node.receiver)?;
    super::convert_to(&mut node.receiver, DataType::Def)?;

    let mut recipe = ArgRecipe::empty();
    for (i, arg) in node.args.iter_mut().enumerate() {
        if matches!(arg.kind, ExprKind::FunctionRef(_)) {
            recipe.mark(i);
        }
        arg.internal = true;
        arg.expected = None;
        super::analyze(ctx, arg)?;
    }

    node.recipe = recipe;
    node.statement = true;
    Ok(DataType::Def)
}

pub(super) fn load(
    emitter: &mut BytecodeEmitter<'_>,
    node: &DynamicCallNode,
    span: Span,
) -> Result<()> {
    emitter.record_position(span);

    let arg_types = node
        .args
        .iter()
        .map(|arg| arg.actual.as_ref().ok_or_else(|| not_analyzed(arg.span)))
        .collect::<Result<Vec<_>>>()?;
    let signature = def_call_signature(arg_types);

    node.receiver.load(emitter)?;
    for arg in &node.args {
        arg.load(emitter)?;
    }

    emitter
        .emit_dynamic_call(
            &node.method,
            &signature,
            Bootstrap::DefCall,
            vec![
                StaticArg::Int(site_kind::METHOD_CALL),
                StaticArg::Recipe(node.recipe),
            ],
        )
        .map_err(|err| err.at(span))?;
    Ok(())
}

pub(super) fn write(_emitter: &mut BytecodeEmitter<'_>, _node: &DynamicCallNode) -> Result<()> {
    Ok(())
}

pub(super) fn store(
    _emitter: &mut BytecodeEmitter<'_>,
    _node: &DynamicCallNode,
    span: Span,
) -> Result<()> {
    Err(illegal_tree(span))
}

/// Signature of a dynamic call site: `def` receiver, the given arguments,
/// `def` result.
pub fn def_call_signature<'a>(args: impl IntoIterator<Item = &'a DataType>) -> String {
    let mut signature = String::from("(");
    signature.push_str(&DataType::Def.descriptor());
    for arg in args {
        signature.push_str(&arg.descriptor());
    }
    signature.push(')');
    signature.push_str(&DataType::Def.descriptor());
    signature
}

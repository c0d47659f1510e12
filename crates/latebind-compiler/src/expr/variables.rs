//! Local variable reads and stores.

use latebind_core::{CompilationError, DataType, Span};

use super::{Result, not_analyzed};
use crate::ast::VariableNode;
use crate::context::AnalysisContext;
use crate::emit::BytecodeEmitter;

pub(super) fn analyze(
    ctx: &AnalysisContext<'_>,
    node: &mut VariableNode,
    span: Span,
) -> Result<DataType> {
    let local = ctx
        .get_local(&node.name)
        .ok_or_else(|| CompilationError::UnknownVariable {
            name: node.name.clone(),
            span,
        })?;
    node.slot = Some(local.slot);
    Ok(local.data_type.clone())
}

pub(super) fn load(emitter: &mut BytecodeEmitter<'_>, node: &VariableNode, span: Span) -> Result<()> {
    let slot = node.slot.ok_or_else(|| not_analyzed(span))?;
    emitter.emit_get_local(slot).map_err(|err| err.at(span))?;
    Ok(())
}

pub(super) fn store(emitter: &mut BytecodeEmitter<'_>, node: &VariableNode, span: Span) -> Result<()> {
    let slot = node.slot.ok_or_else(|| not_analyzed(span))?;
    emitter.emit_set_local(slot).map_err(|err| err.at(span))?;
    Ok(())
}

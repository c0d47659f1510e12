//! Function references (`Type::member`).
//!
//! Without an expected type the reference compiles to the plain string
//! `"Type.member"`; dynamic call sites later turn that string into an
//! interface instance once the target parameter type is known (see the
//! recipe on [`DynamicCallNode`](crate::ast::DynamicCallNode)).
//!
//! With an expected type the registry derives a [`FunctionRef`] descriptor
//! during analysis and emission produces a lambda factory call site.

use latebind_core::{CompilationError, DataType, Span};
use latebind_registry::FunctionRef;

use super::Result;
use crate::ast::FunctionRefNode;
use crate::bytecode::{Bootstrap, FactoryFlags, StaticArg};
use crate::context::AnalysisContext;
use crate::emit::BytecodeEmitter;

pub(super) fn analyze(
    ctx: &AnalysisContext<'_>,
    node: &mut FunctionRefNode,
    expected: Option<&DataType>,
    span: Span,
) -> Result<DataType> {
    node.descriptor = None;
    let Some(expected) = expected else {
        return Ok(DataType::String);
    };

    let descriptor = ctx
        .registry()
        .describe_functional_interface(expected, &node.owner, &node.member)
        .map_err(|error| CompilationError::InvalidFunctionRef { error, span })?;
    node.descriptor = Some(descriptor);
    Ok(expected.clone())
}

pub(super) fn load(
    emitter: &mut BytecodeEmitter<'_>,
    node: &FunctionRefNode,
    span: Span,
) -> Result<()> {
    let emitted = match &node.descriptor {
        None => emitter.emit_string(&node.qualified_name()),
        Some(descriptor) => {
            emitter.record_position(span);
            emitter
                .emit_dynamic_call(
                    &descriptor.invoked_name,
                    &descriptor.invoked_type.descriptor(),
                    Bootstrap::LambdaFactory,
                    factory_static_args(descriptor),
                )
                .map(|_| ())
        }
    };
    emitted.map_err(|err| err.at(span))
}

/// Static arguments of the lambda factory site for `descriptor`.
///
/// `[sam, impl, sam, flags]`, plus `[1, interface]` when a bridge is needed.
pub fn factory_static_args(descriptor: &FunctionRef) -> Vec<StaticArg> {
    let sam = StaticArg::MethodType(descriptor.sam_method_type.clone());
    let mut args = vec![
        sam.clone(),
        StaticArg::MethodHandle(descriptor.impl_method.clone()),
        sam,
    ];

    if descriptor.requires_bridge() {
        args.push(StaticArg::Int(FactoryFlags::BRIDGES.bits()));
        args.push(StaticArg::Int(1));
        args.push(StaticArg::MethodType(
            descriptor.interface_method_type.clone(),
        ));
    } else {
        args.push(StaticArg::Int(0));
    }
    args
}
